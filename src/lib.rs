pub mod application;
pub mod domain;
pub mod error;
pub mod interfaces;

pub use application::options::{InstituteSelection, ServiceRegistry, ValidatorOptions};
pub use application::validator::{CardValidator, ValidationConfig};
pub use domain::institute::{Institute, InstituteRule, PrefixRange, Registry};
pub use domain::luhn::luhn_valid;
pub use domain::outcome::{FailureReason, ReasonCode, ValidationResult};
pub use domain::ports::CardVerifier;
pub use error::{CardError, Result};
