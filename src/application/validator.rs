use crate::application::options::{InstituteSelection, ServiceRegistry};
use crate::domain::institute::{Institute, Registry};
use crate::domain::luhn::luhn_valid;
use crate::domain::outcome::{FailureReason, ReasonCode, ValidationResult};
use crate::domain::ports::{CardVerifier, CardVerifierRef};
use crate::error::{CardError, Result};
use std::fmt;
use std::sync::Arc;

/// The normalized configuration a [`CardValidator`] runs against.
///
/// `institutes` is never empty and holds no duplicates.
#[derive(Clone)]
pub struct ValidationConfig {
    institutes: Vec<Institute>,
    verifier: Option<CardVerifierRef>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            institutes: Institute::ALL.to_vec(),
            verifier: None,
        }
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("institutes", &self.institutes)
            .field("verifier", &self.verifier.is_some())
            .finish()
    }
}

impl ValidationConfig {
    pub fn new(institutes: Vec<Institute>, verifier: Option<CardVerifierRef>) -> Result<Self> {
        Ok(Self {
            institutes: dedup(institutes)?,
            verifier,
        })
    }

    pub fn institutes(&self) -> &[Institute] {
        &self.institutes
    }

    pub fn verifier(&self) -> Option<&CardVerifierRef> {
        self.verifier.as_ref()
    }
}

fn dedup(institutes: Vec<Institute>) -> Result<Vec<Institute>> {
    let mut unique = Vec::with_capacity(institutes.len());
    for institute in institutes {
        if !unique.contains(&institute) {
            unique.push(institute);
        }
    }
    if unique.is_empty() {
        return Err(CardError::EmptySelection);
    }
    Ok(unique)
}

/// Validates card numbers against a selection of institutes, the Luhn
/// checksum and an optional external verifier.
///
/// The reasons of the most recent [`CardValidator::is_valid`] call are kept
/// and can be read back with [`CardValidator::messages`].
#[derive(Debug, Default, Clone)]
pub struct CardValidator {
    config: ValidationConfig,
    last: ValidationResult,
}

impl CardValidator {
    /// A validator accepting every known institute, with no verifier.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            last: ValidationResult::default(),
        }
    }

    /// A validator restricted to the given institute ids.
    ///
    /// # Errors
    ///
    /// Fails on an unknown id or an empty selection.
    pub fn for_institutes(selection: impl Into<InstituteSelection>) -> Result<Self> {
        let mut validator = Self::new();
        validator.set_institutes(selection)?;
        Ok(validator)
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn institutes(&self) -> &[Institute] {
        &self.config.institutes
    }

    /// Replaces the institute selection. On error the previous selection is kept.
    pub fn set_institutes(&mut self, selection: impl Into<InstituteSelection>) -> Result<()> {
        let institutes = dedup(selection.into().resolve()?)?;
        tracing::debug!(count = institutes.len(), "institute selection replaced");
        self.config.institutes = institutes;
        Ok(())
    }

    /// Appends institutes to the selection, skipping ones already selected.
    /// On error nothing is appended.
    pub fn add_institutes(&mut self, selection: impl Into<InstituteSelection>) -> Result<()> {
        let added = selection.into().resolve()?;
        for institute in added {
            if !self.config.institutes.contains(&institute) {
                tracing::debug!(%institute, "institute added to selection");
                self.config.institutes.push(institute);
            }
        }
        Ok(())
    }

    pub fn service(&self) -> Option<&CardVerifierRef> {
        self.config.verifier.as_ref()
    }

    pub fn set_service(&mut self, verifier: impl CardVerifier + 'static) {
        self.config.verifier = Some(Arc::new(verifier));
    }

    pub fn set_service_ref(&mut self, verifier: CardVerifierRef) {
        self.config.verifier = Some(verifier);
    }

    /// Resolves `name` in `services` and installs it as the verifier.
    ///
    /// # Errors
    ///
    /// [`CardError::UnknownService`] when nothing is registered under `name`;
    /// the current verifier is left untouched.
    pub fn set_service_by_name(&mut self, name: &str, services: &ServiceRegistry) -> Result<()> {
        let verifier = services.resolve(name)?;
        tracing::debug!(service = name, "external verifier installed");
        self.config.verifier = Some(verifier);
        Ok(())
    }

    pub fn clear_service(&mut self) {
        self.config.verifier = None;
    }

    /// Validates `input` and records the failure reasons for [`Self::messages`].
    pub fn is_valid(&mut self, input: &str) -> bool {
        self.last = self.validate(input);
        self.last.is_valid
    }

    /// Like [`Self::is_valid`], for loosely typed input.
    pub fn is_valid_value(&mut self, input: &serde_json::Value) -> bool {
        self.last = self.validate_value(input);
        self.last.is_valid
    }

    /// Failure reasons of the most recent `is_valid` call.
    pub fn messages(&self) -> &[FailureReason] {
        &self.last.failure_reasons
    }

    pub fn last_result(&self) -> &ValidationResult {
        &self.last
    }

    pub fn validate(&self, input: &str) -> ValidationResult {
        self.evaluate(Some(input), input)
    }

    /// Validates a JSON value. Anything but a JSON string fails with
    /// [`ReasonCode::InvalidType`]; the verifier, if any, still sees its
    /// serialized form.
    pub fn validate_value(&self, input: &serde_json::Value) -> ValidationResult {
        match input {
            serde_json::Value::String(number) => self.evaluate(Some(number), number),
            other => self.evaluate(None, &other.to_string()),
        }
    }

    fn evaluate(&self, number: Option<&str>, raw: &str) -> ValidationResult {
        let mut result = ValidationResult::default();

        match number {
            None => result.push(ReasonCode::InvalidType),
            Some(number) if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) => {
                result.push(ReasonCode::Content)
            }
            Some(number) => self.check_digits(number, &mut result),
        }
        result.is_valid = result.failure_reasons.is_empty();

        if let Some(verifier) = &self.config.verifier {
            let verdict = verifier.verify(raw);
            tracing::debug!(
                local = result.is_valid,
                external = verdict,
                "external verifier consulted"
            );
            if !verdict {
                result.push(ReasonCode::Service);
            }
            result.is_valid = verdict;
        }

        tracing::trace!(
            valid = result.is_valid,
            reasons = ?result.codes().collect::<Vec<_>>(),
            "card number validated"
        );
        result
    }

    fn check_digits(&self, number: &str, result: &mut ValidationResult) {
        let institutes = &self.config.institutes;

        result.institute = Registry::identify(number, institutes);
        if result.institute.is_none() {
            let prefix_known = institutes
                .iter()
                .any(|institute| institute.rule().accepts_prefix(number));
            if prefix_known {
                result.push(ReasonCode::Length);
            } else {
                result.push(ReasonCode::Prefix);
            }
        }

        if !luhn_valid(number) {
            result.push(ReasonCode::Checksum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_selects_all_institutes() {
        let validator = CardValidator::new();
        assert_eq!(validator.institutes(), &Institute::ALL);
        assert!(validator.service().is_none());
    }

    #[test]
    fn test_valid_visa() {
        let mut validator = CardValidator::new();
        assert!(validator.is_valid("4111111111111111"));
        assert!(validator.messages().is_empty());
        assert_eq!(validator.last_result().institute, Some(Institute::Visa));
    }

    #[test]
    fn test_checksum_failure() {
        let validator = CardValidator::new();
        let result = validator.validate("4444555566667777");
        assert!(!result.is_valid);
        assert_eq!(result.codes().collect::<Vec<_>>(), vec![ReasonCode::Checksum]);
        assert_eq!(result.institute, Some(Institute::Visa));
    }

    #[test]
    fn test_non_numeric_skips_local_checks() {
        let validator = CardValidator::new();
        for input in ["", "4111 1111 1111 1111", "abc", "4111111111111111\n"] {
            let result = validator.validate(input);
            assert!(!result.is_valid);
            assert_eq!(result.codes().collect::<Vec<_>>(), vec![ReasonCode::Content]);
        }
    }

    #[test]
    fn test_prefix_and_checksum_are_both_reported() {
        let validator = CardValidator::for_institutes("Visa").unwrap();
        let result = validator.validate("374200000000005");
        assert_eq!(
            result.codes().collect::<Vec<_>>(),
            vec![ReasonCode::Prefix, ReasonCode::Checksum]
        );
    }

    #[test]
    fn test_length_reason_when_prefix_matches() {
        let validator = CardValidator::new();
        // Visa prefix, 15 digits, Luhn-valid
        let result = validator.validate("411111111111116");
        assert_eq!(result.codes().collect::<Vec<_>>(), vec![ReasonCode::Length]);
    }

    #[test]
    fn test_set_institutes_keeps_previous_on_error() {
        let mut validator = CardValidator::for_institutes("Visa").unwrap();
        let err = validator.set_institutes(vec!["JCB", "Bankcard"]).unwrap_err();
        assert!(matches!(err, CardError::UnknownInstitute(id) if id == "Bankcard"));
        assert_eq!(validator.institutes(), &[Institute::Visa]);
    }

    #[test]
    fn test_set_institutes_rejects_empty_selection() {
        let mut validator = CardValidator::new();
        let err = validator.set_institutes(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CardError::EmptySelection));
        assert_eq!(validator.institutes(), &Institute::ALL);
    }

    #[test]
    fn test_add_institutes_deduplicates() {
        let mut validator = CardValidator::for_institutes("Visa").unwrap();
        validator.add_institutes(vec!["JCB", "Visa"]).unwrap();
        assert_eq!(validator.institutes(), &[Institute::Visa, Institute::JCB]);

        assert!(validator.add_institutes("Bankcard").is_err());
        assert_eq!(validator.institutes(), &[Institute::Visa, Institute::JCB]);
    }

    #[test]
    fn test_verifier_called_once_per_validation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut validator = CardValidator::new();
        validator.set_service(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        validator.is_valid("4111111111111111");
        validator.is_valid("not a number");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_verifier_promotes_but_keeps_local_reasons() {
        let mut validator = CardValidator::new();
        validator.set_service(|_: &str| true);

        assert!(validator.is_valid("4444555566667777"));
        assert_eq!(validator.messages().len(), 1);
        assert_eq!(validator.messages()[0].code, ReasonCode::Checksum);
    }

    #[test]
    fn test_verifier_demotes() {
        let mut validator = CardValidator::new();
        validator.set_service(|_: &str| false);

        assert!(!validator.is_valid("4111111111111111"));
        assert_eq!(validator.messages().len(), 1);
        assert_eq!(validator.messages()[0].code, ReasonCode::Service);
    }

    #[test]
    fn test_clear_service_restores_local_verdict() {
        let mut validator = CardValidator::new();
        validator.set_service(|_: &str| false);
        validator.clear_service();
        assert!(validator.is_valid("4111111111111111"));
    }

    #[test]
    fn test_validate_value_rejects_non_strings() {
        let validator = CardValidator::new();
        for value in [
            serde_json::json!(4111111111111111u64),
            serde_json::json!(null),
            serde_json::json!(["4111111111111111"]),
        ] {
            let result = validator.validate_value(&value);
            assert!(!result.is_valid);
            assert_eq!(result.codes().collect::<Vec<_>>(), vec![ReasonCode::InvalidType]);
        }

        assert!(
            validator
                .validate_value(&serde_json::json!("4111111111111111"))
                .is_valid
        );
    }

    #[test]
    fn test_messages_are_cleared_between_calls() {
        let mut validator = CardValidator::new();
        assert!(!validator.is_valid("abc"));
        assert!(!validator.messages().is_empty());
        assert!(validator.is_valid("4111111111111111"));
        assert!(validator.messages().is_empty());
    }
}
