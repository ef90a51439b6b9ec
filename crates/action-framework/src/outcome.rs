//! # Result Envelope
//!
//! [`Outcome`] is the `(value, warnings, error)` triple every remote call and
//! every action returns. It is a plain `Result` paired with the [`Warnings`]
//! gathered while producing it, so warnings travel with failures as well as
//! successes and can never be dropped by an early `?`.

use crate::warnings::Warnings;

/// A `Result` plus the advisory warnings collected while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T, E> {
    pub result: Result<T, E>,
    pub warnings: Warnings,
}

impl<T, E> Outcome<T, E> {
    pub fn new(result: Result<T, E>, warnings: Warnings) -> Self {
        Self { result, warnings }
    }

    pub fn ok(value: T, warnings: impl Into<Warnings>) -> Self {
        Self::new(Ok(value), warnings.into())
    }

    pub fn err(error: E, warnings: impl Into<Warnings>) -> Self {
        Self::new(Err(error), warnings.into())
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }

    pub fn into_parts(self) -> (Result<T, E>, Warnings) {
        (self.result, self.warnings)
    }

    /// Converts the error while keeping every warning.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        Outcome::new(self.result.map_err(f), self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_err_keeps_warnings() {
        let outcome: Outcome<(), &str> = Outcome::err("raw", vec!["w1", "w2"]);

        let mapped = outcome.map_err(|e| format!("translated: {e}"));

        assert_eq!(mapped.error().map(String::as_str), Some("translated: raw"));
        assert_eq!(mapped.warnings, vec!["w1", "w2"]);
    }

    #[test]
    fn ok_exposes_value() {
        let outcome: Outcome<u8, ()> = Outcome::ok(7, Warnings::new());
        assert!(outcome.is_ok());
        assert_eq!(outcome.value(), Some(&7));
        assert!(outcome.error().is_none());
    }
}
