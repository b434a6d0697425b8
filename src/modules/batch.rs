use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::converter::Converter;
use super::formats::{SUPPORTED_INPUTS, TargetFormat};
use super::validator;
use crate::error::{ConvertError, Result};

/// What happened to one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<PathBuf>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Per-file results of a batch, in the order the files were given.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded(), self.failed())
    }
}

/// A validated batch that converts one file per [`Batch::step`].
///
/// Stepping lets a caller interleave conversions with its own work (a GUI
/// redraws between files) while everything still runs on one thread.
#[derive(Debug)]
pub struct Batch {
    converter: Converter,
    target: TargetFormat,
    pending: VecDeque<PathBuf>,
    total: usize,
    report: BatchReport,
}

impl Batch {
    /// Validate every path up front; nothing is converted if one is rejected.
    pub fn new<P: AsRef<Path>>(converter: Converter, paths: &[P], target: TargetFormat) -> Result<Self> {
        if let Some((path, extension)) = validator::first_unacceptable(paths, &SUPPORTED_INPUTS) {
            log::info!(
                "File {} is not acceptable, extension: {:?}",
                path.as_ref().display(),
                extension
            );
            return Err(ConvertError::Unacceptable {
                path: path.as_ref().to_path_buf(),
                extension,
            });
        }

        let pending: VecDeque<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        Ok(Self {
            converter,
            target,
            total: pending.len(),
            pending,
            report: BatchReport::default(),
        })
    }

    pub fn target(&self) -> &TargetFormat {
        &self.target
    }

    /// Convert the next file. Returns `None` once the batch is exhausted.
    pub fn step(&mut self) -> Option<&FileOutcome> {
        let source = self.pending.pop_front()?;
        let result = self.converter.convert(&source, &self.target);
        self.report.outcomes.push(FileOutcome { source, result });
        self.report.outcomes.last()
    }

    /// `(processed, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.report.outcomes.len(), self.total)
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    pub fn into_report(self) -> BatchReport {
        self.report
    }
}

/// Validate and convert `paths` sequentially, calling `on_progress` after
/// every file with `(processed, total, outcome)`.
pub fn run<P, F>(converter: Converter, paths: &[P], target: TargetFormat, mut on_progress: F) -> Result<BatchReport>
where
    P: AsRef<Path>,
    F: FnMut(usize, usize, &FileOutcome),
{
    let mut batch = Batch::new(converter, paths, target)?;
    let total = batch.total;
    while !batch.is_finished() {
        let done = batch.report.outcomes.len() + 1;
        if let Some(outcome) = batch.step() {
            on_progress(done, total, outcome);
        }
    }
    let report = batch.into_report();
    log::info!("Batch finished: {}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(name: &str, ok: bool) -> FileOutcome {
        let result = if ok {
            Ok(PathBuf::from("converted_png").join(name))
        } else {
            Err(ConvertError::UnsupportedTarget { format: "heic".to_string() })
        };
        FileOutcome { source: PathBuf::from("in").join(name), result }
    }

    #[test]
    fn report_counts_outcomes() {
        let report = BatchReport {
            outcomes: vec![outcome("a.png", true), outcome("b.png", false), outcome("c.png", true)],
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
        assert_eq!(report.summary(), "2 succeeded, 1 failed");
        assert_eq!(report.outcomes[1].file_name(), "b.png");
    }

    #[test]
    fn rejected_batch_converts_nothing() {
        let dir = TempDir::new().unwrap();
        let target = TargetFormat::parse("png").unwrap();

        let err = Batch::new(Converter::new(dir.path()), &["a.txt", "b.png"], target).unwrap_err();

        match err {
            ConvertError::Unacceptable { path, extension } => {
                assert_eq!(path, PathBuf::from("a.txt"));
                assert_eq!(extension, "txt");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("converted_png").exists());
    }

    #[test]
    fn empty_batch_finishes_immediately() {
        let paths: Vec<PathBuf> = Vec::new();
        let mut calls = 0;
        let report = run(Converter::default(), &paths, TargetFormat::parse("jpg").unwrap(), |_, _, _| {
            calls += 1;
        })
        .unwrap();

        assert_eq!(calls, 0);
        assert!(report.outcomes.is_empty());
        assert!(report.all_succeeded());
    }

    #[test]
    fn step_records_failures_and_continues() {
        let dir = TempDir::new().unwrap();
        let missing = [dir.path().join("one.png"), dir.path().join("two.png")];
        let mut batch = Batch::new(Converter::new(dir.path()), &missing, TargetFormat::parse("png").unwrap()).unwrap();

        assert_eq!(batch.progress(), (0, 2));
        assert!(!batch.step().unwrap().is_success());
        assert_eq!(batch.progress(), (1, 2));
        assert!(!batch.step().unwrap().is_success());
        assert!(batch.step().is_none());
        assert!(batch.is_finished());
        assert_eq!(batch.report().failed(), 2);
    }
}
