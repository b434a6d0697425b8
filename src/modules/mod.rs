pub mod batch;
pub mod converter;
pub mod decoders;
pub mod formats;
#[cfg(feature = "heif")]
pub mod heif;
pub mod naming;
pub mod pdf;
pub mod validator;
