use std::collections::HashSet;
use std::path::Path;

/// Lowercase extension of `path`, or an empty string when it has none.
///
/// Leading dots belong to the name, so `.png` and `..png` have no extension.
pub fn extension_of(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    match name.to_string_lossy().trim_start_matches('.').rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// The first path whose extension is not in `supported`, with that extension.
pub fn first_unacceptable<'a, P: AsRef<Path>>(
    paths: &'a [P],
    supported: &HashSet<&str>,
) -> Option<(&'a P, String)> {
    paths.iter().find_map(|path| {
        let extension = extension_of(path.as_ref());
        if supported.contains(extension.as_str()) {
            None
        } else {
            Some((path, extension))
        }
    })
}

/// True when every path carries a supported extension.
///
/// Only the name is inspected; file contents are never read.
pub fn acceptable<P: AsRef<Path>>(paths: &[P], supported: &HashSet<&str>) -> bool {
    match first_unacceptable(paths, supported) {
        Some((path, extension)) => {
            log::info!(
                "File {} is not acceptable, extension: {:?}",
                path.as_ref().display(),
                extension
            );
            false
        }
        None => true,
    }
}
