//! Batch image conversion core.
//!
//! Two entry points are meant for front ends: [`acceptable`] gates a batch
//! by file extension and [`convert`] turns one file into a metadata-free
//! copy in `converted_<target>/`. [`modules::batch`] sequences both and
//! reports per-file results.

pub mod error;
pub mod modules;
pub mod settings;

pub use error::{ConvertError, FailureKind, Result};
pub use modules::batch::{Batch, BatchReport, FileOutcome};
pub use modules::converter::{Converter, convert};
pub use modules::formats::{OutputFormat, SUPPORTED_INPUTS, SUPPORTED_OUTPUTS, TargetFormat};
pub use modules::validator::acceptable;
pub use settings::{Settings, ThemePreference};
