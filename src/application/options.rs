use crate::application::validator::{CardValidator, ValidationConfig};
use crate::domain::institute::Institute;
use crate::domain::ports::{CardVerifier, CardVerifierRef};
use crate::error::{CardError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

/// Institute ids as supplied by a caller: a single id or a list of ids.
///
/// Nothing is checked until [`InstituteSelection::resolve`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InstituteSelection {
    One(String),
    Many(Vec<String>),
}

impl InstituteSelection {
    /// Parses every id, in order. Fails on the first unknown id.
    pub fn resolve(&self) -> Result<Vec<Institute>> {
        match self {
            InstituteSelection::One(id) => Ok(vec![id.parse()?]),
            InstituteSelection::Many(ids) => ids.iter().map(|id| id.parse()).collect(),
        }
    }
}

impl From<&str> for InstituteSelection {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

impl From<String> for InstituteSelection {
    fn from(id: String) -> Self {
        Self::One(id)
    }
}

impl From<Vec<&str>> for InstituteSelection {
    fn from(ids: Vec<&str>) -> Self {
        Self::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for InstituteSelection {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<Institute> for InstituteSelection {
    fn from(institute: Institute) -> Self {
        Self::One(institute.id().to_string())
    }
}

impl From<&[Institute]> for InstituteSelection {
    fn from(institutes: &[Institute]) -> Self {
        Self::Many(institutes.iter().map(|i| i.id().to_string()).collect())
    }
}

impl From<Vec<Institute>> for InstituteSelection {
    fn from(institutes: Vec<Institute>) -> Self {
        Self::from(institutes.as_slice())
    }
}

/// Named external verifiers that options documents can refer to.
#[derive(Default, Clone)]
pub struct ServiceRegistry {
    services: HashMap<String, CardVerifierRef>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, verifier: impl CardVerifier + 'static) {
        self.services.insert(name.into(), Arc::new(verifier));
    }

    pub fn resolve(&self, name: &str) -> Result<CardVerifierRef> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| CardError::UnknownService(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// Construction options for a [`CardValidator`].
///
/// Mirrors the options document format:
///
/// ```json
/// { "type": ["Visa", "MasterCard"], "service": "issuer-lookup" }
/// ```
///
/// Both fields are optional. A missing `type` selects every institute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorOptions {
    #[serde(rename = "type", default)]
    pub institutes: Option<InstituteSelection>,
    #[serde(default)]
    pub service: Option<String>,
}

impl ValidatorOptions {
    pub fn with_type(selection: impl Into<InstituteSelection>) -> Self {
        Self {
            institutes: Some(selection.into()),
            service: None,
        }
    }

    pub fn service(mut self, name: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Normalizes the options into a [`ValidationConfig`].
    pub fn to_config(&self, services: &ServiceRegistry) -> Result<ValidationConfig> {
        let institutes = match &self.institutes {
            Some(selection) => selection.resolve()?,
            None => Institute::ALL.to_vec(),
        };
        let verifier = self
            .service
            .as_deref()
            .map(|name| services.resolve(name))
            .transpose()?;
        ValidationConfig::new(institutes, verifier)
    }

    pub fn build(&self, services: &ServiceRegistry) -> Result<CardValidator> {
        let config = self.to_config(services)?;
        tracing::debug!(
            institutes = config.institutes().len(),
            service = self.service.as_deref(),
            "validator configured"
        );
        Ok(CardValidator::with_config(config))
    }
}
