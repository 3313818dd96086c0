use std::sync::Arc;

/// External check consulted after the local pattern and checksum checks.
///
/// Its verdict replaces the local one. Implementations own any I/O, retry or
/// timeout policy; the validator calls `verify` exactly once per validation.
pub trait CardVerifier: Send + Sync {
    fn verify(&self, number: &str) -> bool;
}

impl<F> CardVerifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn verify(&self, number: &str) -> bool {
        self(number)
    }
}

pub type CardVerifierRef = Arc<dyn CardVerifier>;
