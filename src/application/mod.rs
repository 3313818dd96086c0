//! Application layer containing the validation pipeline.
//!
//! `CardValidator` runs the institute, checksum and external checks over a
//! normalized `ValidationConfig`. `ValidatorOptions` turns a loosely shaped
//! options document into that configuration.

pub mod options;
pub mod validator;
