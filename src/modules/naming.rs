use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Candidate file name for the given collision counter.
///
/// Counter 0 is the plain `stem.ext`; every later attempt appends `_N`
/// before the extension.
pub fn candidate_name(stem: &OsStr, extension: &str, counter: u32) -> OsString {
    let mut name = stem.to_os_string();
    if counter > 0 {
        name.push(format!("_{counter}"));
    }
    name.push(".");
    name.push(extension);
    name
}

/// Create the first free candidate in `dir` with exclusive-create semantics.
///
/// The existence check and the creation are a single `open` call, so two
/// writers can never end up sharing a name.
pub fn claim(dir: &Path, stem: &OsStr, extension: &str) -> io::Result<(PathBuf, File)> {
    let mut counter = 0;
    loop {
        let path = dir.join(candidate_name(stem, extension, counter));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("{} already exists, trying next suffix", path.display());
                counter += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn suffix_goes_before_extension() {
        let stem = OsStr::new("photo");
        assert_eq!(candidate_name(stem, "png", 0), "photo.png");
        assert_eq!(candidate_name(stem, "png", 1), "photo_1.png");
        assert_eq!(candidate_name(stem, "png", 12), "photo_12.png");
    }

    #[test]
    fn claim_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        let stem = OsStr::new("photo");

        let (first, _) = claim(dir.path(), stem, "jpg").unwrap();
        let (second, _) = claim(dir.path(), stem, "jpg").unwrap();
        let (third, _) = claim(dir.path(), stem, "jpg").unwrap();

        assert_eq!(first, dir.path().join("photo.jpg"));
        assert_eq!(second, dir.path().join("photo_1.jpg"));
        assert_eq!(third, dir.path().join("photo_2.jpg"));
    }

    #[test]
    fn claim_never_touches_existing_files() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("photo.png");
        std::fs::write(&existing, b"keep me").unwrap();

        let (path, _) = claim(dir.path(), OsStr::new("photo"), "png").unwrap();

        assert_eq!(path, dir.path().join("photo_1.png"));
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
    }

    #[test]
    fn claim_in_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = claim(&missing, OsStr::new("a"), "png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
