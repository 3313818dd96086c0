//! Domain layer: the institute rule table, the Luhn checksum, validation
//! outcomes and the port for external verification.

pub mod institute;
pub mod luhn;
pub mod outcome;
pub mod ports;
