use super::institute::Institute;
use serde::Serialize;
use std::fmt;

/// Why a card number was rejected.
///
/// Variants are declared in the order the pipeline reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReasonCode {
    /// The input was not a string at all.
    InvalidType,
    /// The input was empty or contained a non-digit character.
    Content,
    Prefix,
    Length,
    Checksum,
    Service,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::InvalidType => "invalidType",
            ReasonCode::Content => "content",
            ReasonCode::Prefix => "prefix",
            ReasonCode::Length => "length",
            ReasonCode::Checksum => "checksum",
            ReasonCode::Service => "service",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReasonCode::InvalidType => "not a numeric string: invalid type given, string expected",
            ReasonCode::Content => "not a numeric string: must contain only digits",
            ReasonCode::Prefix => "not from an allowed institute",
            ReasonCode::Length => "contains an invalid amount of digits",
            ReasonCode::Checksum => "checksum failed",
            ReasonCode::Service => "failed external verification",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub code: ReasonCode,
    pub message: &'static str,
}

impl From<ReasonCode> for FailureReason {
    fn from(code: ReasonCode) -> Self {
        Self {
            code,
            message: code.message(),
        }
    }
}

/// Outcome of a single validation call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// First selected institute whose pattern matched, if any.
    pub institute: Option<Institute>,
    pub failure_reasons: Vec<FailureReason>,
}

impl ValidationResult {
    pub fn push(&mut self, code: ReasonCode) {
        self.failure_reasons.push(code.into());
    }

    pub fn has_reason(&self, code: ReasonCode) -> bool {
        self.failure_reasons.iter().any(|reason| reason.code == code)
    }

    pub fn codes(&self) -> impl Iterator<Item = ReasonCode> + '_ {
        self.failure_reasons.iter().map(|reason| reason.code)
    }
}
