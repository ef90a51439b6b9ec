//! # Warnings
//!
//! Advisory messages returned by the remote API alongside a response. Every
//! remote call hands back its own [`Warnings`]; an action flattens them, in call
//! order, into the single sequence it returns to the caller.
//!
//! Order is meaningful (it mirrors the order the calls were issued) and nothing
//! is ever deduplicated: two calls emitting the same text produce two entries.

use crate::outcome::Outcome;
use std::fmt;

/// Ordered, append-only list of advisory strings belonging to one action invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, warning: impl Into<String>) {
        self.0.push(warning.into());
    }

    /// Appends every warning from `other`, keeping its order.
    pub fn extend(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }

    /// Moves the warnings of a remote call into this accumulator and hands back
    /// the call's result.
    ///
    /// This is the building block of every multi-step action:
    ///
    /// ```rust
    /// use action_framework::{Outcome, Warnings};
    ///
    /// let mut warnings = Warnings::new();
    /// let first: Outcome<u32, String> = Outcome::ok(1, Warnings::from(vec!["w1"]));
    /// let second: Outcome<u32, String> =
    ///     Outcome::err("boom".to_string(), Warnings::from(vec!["w2"]));
    ///
    /// assert_eq!(warnings.absorb(first), Ok(1));
    /// assert!(warnings.absorb(second).is_err());
    /// assert_eq!(warnings, vec!["w1", "w2"]);
    /// ```
    pub fn absorb<T, E>(&mut self, outcome: Outcome<T, E>) -> Result<T, E> {
        let (result, warnings) = outcome.into_parts();
        self.extend(warnings);
        result
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

impl From<Vec<String>> for Warnings {
    fn from(warnings: Vec<String>) -> Self {
        Self(warnings)
    }
}

impl From<Vec<&str>> for Warnings {
    fn from(warnings: Vec<&str>) -> Self {
        Self(warnings.into_iter().map(str::to_owned).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Warnings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Warnings {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<Vec<&str>> for Warnings {
    fn eq(&self, other: &Vec<&str>) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl PartialEq<[&str]> for Warnings {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_keeps_call_order_and_duplicates() {
        let mut warnings = Warnings::new();
        warnings.extend(Warnings::from(vec!["deprecated", "slow"]));
        warnings.extend(Warnings::from(vec!["deprecated"]));

        assert_eq!(warnings, vec!["deprecated", "slow", "deprecated"]);
    }

    #[test]
    fn absorb_keeps_warnings_from_failed_calls() {
        let mut warnings = Warnings::new();
        let failed: Outcome<(), &str> =
            Outcome::err("kaboom", Warnings::from(vec!["before-failure"]));

        let result = warnings.absorb(failed);

        assert_eq!(result, Err("kaboom"));
        assert_eq!(warnings, vec!["before-failure"]);
    }

    #[test]
    fn display_joins_one_per_line() {
        let warnings: Warnings = ["a", "b"].into_iter().collect();
        assert_eq!(warnings.to_string(), "a\nb");
    }
}
