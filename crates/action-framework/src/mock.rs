//! # Mock Framework & Testing Guide
//!
//! In-memory test doubles for the two collaborators every action talks to:
//!
//! - [`Stub`] stands in for one operation of a typed remote client. Responses
//!   are scripted up front with a fluent builder, arguments are recorded for
//!   later assertions, and [`Stub::verify`] fails the test when a scripted
//!   response was never consumed.
//! - [`FakeProgressReporter`] stands in for the upload progress collaborator
//!   and counts `initialize` / `terminate` calls.
//!
//! ## Scripting a client call
//!
//! ```rust
//! use action_framework::mock::Stub;
//!
//! let create: Stub<String, u32, String> = Stub::new("create");
//! create.expect().with_warnings(["w1"]).return_ok(7);
//!
//! let outcome = create.call("demo".to_string());
//! assert_eq!(outcome.value(), Some(&7));
//! assert_eq!(outcome.warnings, vec!["w1"]);
//! assert_eq!(create.calls(), vec!["demo".to_string()]);
//! create.verify();
//! ```
//!
//! ## Error injection
//!
//! ```rust
//! use action_framework::mock::Stub;
//!
//! let list: Stub<(), Vec<u32>, String> = Stub::new("list");
//! list.expect().return_err("kaboom".to_string());
//!
//! assert_eq!(list.call(()).error().map(String::as_str), Some("kaboom"));
//! ```
//!
//! ## Responses that apply to every call
//!
//! [`Stub::always`] installs a fallback used once the queued expectations run
//! out, which keeps tests of multi-call actions short:
//!
//! ```rust
//! use action_framework::mock::Stub;
//!
//! let routes: Stub<String, Vec<String>, String> = Stub::new("routes");
//! routes.always().return_ok(vec![]);
//!
//! assert!(routes.call("a".into()).is_ok());
//! assert!(routes.call("b".into()).is_ok());
//! assert_eq!(routes.call_count(), 2);
//! ```

use crate::error::FrameworkError;
use crate::outcome::Outcome;
use crate::progress::{Payload, ProgressReporter};
use crate::warnings::Warnings;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// =============================================================================
// STUBBED CLIENT OPERATIONS
// =============================================================================

struct StubState<A, T, E> {
    operation: &'static str,
    queued: VecDeque<Outcome<T, E>>,
    fallback: Option<Outcome<T, E>>,
    calls: Vec<A>,
}

/// One scripted operation of a fake client.
///
/// Cloning a `Stub` shares its state, so a test can keep a handle while the
/// code under test owns another.
pub struct Stub<A, T, E> {
    state: Arc<Mutex<StubState<A, T, E>>>,
}

impl<A, T, E> Clone for Stub<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, T, E> Stub<A, T, E> {
    /// Creates a stub with no scripted responses.
    pub fn new(operation: &'static str) -> Self {
        Self {
            state: Arc::new(Mutex::new(StubState {
                operation,
                queued: VecDeque::new(),
                fallback: None,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState<A, T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scripts the response for the next unanswered call.
    pub fn expect(&self) -> ResponseBuilder<A, T, E> {
        ResponseBuilder {
            state: Arc::clone(&self.state),
            warnings: Warnings::new(),
            fallback: false,
        }
    }

    /// Scripts the response for every call after the queued ones are used up.
    pub fn always(&self) -> ResponseBuilder<A, T, E> {
        ResponseBuilder {
            state: Arc::clone(&self.state),
            warnings: Warnings::new(),
            fallback: true,
        }
    }

    /// Number of times the operation was invoked.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Panics if a queued response was never consumed.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.queued.is_empty() {
            panic!(
                "{}: not all expectations were met. {} remaining",
                state.operation,
                state.queued.len()
            );
        }
    }
}

impl<A, T: Clone, E: Clone> Stub<A, T, E> {
    /// Records `args` and returns the next scripted response.
    ///
    /// Panics when nothing was scripted: an unscripted call is a test bug.
    pub fn call(&self, args: A) -> Outcome<T, E> {
        let mut state = self.lock();
        state.calls.push(args);
        if let Some(outcome) = state.queued.pop_front() {
            return outcome;
        }
        match &state.fallback {
            Some(outcome) => outcome.clone(),
            None => panic!("{}: unexpected call, no response scripted", state.operation),
        }
    }
}

impl<A: Clone, T, E> Stub<A, T, E> {
    /// Arguments of every call, in call order.
    pub fn calls(&self) -> Vec<A> {
        self.lock().calls.clone()
    }

    /// Arguments of the `index`-th call.
    pub fn args_for_call(&self, index: usize) -> Option<A> {
        self.lock().calls.get(index).cloned()
    }
}

/// Fluent builder returned by [`Stub::expect`] and [`Stub::always`].
pub struct ResponseBuilder<A, T, E> {
    state: Arc<Mutex<StubState<A, T, E>>>,
    warnings: Warnings,
    fallback: bool,
}

impl<A, T, E> ResponseBuilder<A, T, E> {
    /// Warnings the scripted response carries.
    pub fn with_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings = warnings.into_iter().collect();
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Outcome::new(Ok(value), self.warnings.clone()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: E) {
        self.push(Outcome::new(Err(error), self.warnings.clone()));
    }

    fn push(&self, outcome: Outcome<T, E>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.fallback {
            state.fallback = Some(outcome);
        } else {
            state.queued.push_back(outcome);
        }
    }
}

// =============================================================================
// PROGRESS REPORTER
// =============================================================================

/// In-memory [`ProgressReporter`] with call counting.
pub struct FakeProgressReporter {
    payload: Result<Vec<u8>, String>,
    declared_length: Option<u64>,
    initialized: Vec<PathBuf>,
    terminated: usize,
}

impl FakeProgressReporter {
    /// Reporter whose `initialize` yields `bytes` and declares their length.
    pub fn with_payload(bytes: Vec<u8>) -> Self {
        Self {
            payload: Ok(bytes),
            declared_length: None,
            initialized: Vec::new(),
            terminated: 0,
        }
    }

    /// Reporter whose `initialize` fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            payload: Err(reason.into()),
            declared_length: None,
            initialized: Vec::new(),
            terminated: 0,
        }
    }

    /// Overrides the declared length independent of the payload bytes.
    pub fn declaring_length(mut self, length: u64) -> Self {
        self.declared_length = Some(length);
        self
    }

    pub fn initialize_count(&self) -> usize {
        self.initialized.len()
    }

    pub fn initialized_paths(&self) -> &[PathBuf] {
        &self.initialized
    }

    pub fn terminate_count(&self) -> usize {
        self.terminated
    }
}

impl ProgressReporter for FakeProgressReporter {
    fn initialize(&mut self, path: &Path) -> Result<(Payload, u64), FrameworkError> {
        self.initialized.push(path.to_path_buf());
        match &self.payload {
            Ok(bytes) => {
                let length = self.declared_length.unwrap_or(bytes.len() as u64);
                Ok((Box::new(std::io::Cursor::new(bytes.clone())), length))
            }
            Err(reason) => Err(FrameworkError::ProgressInitialize(reason.clone())),
        }
    }

    fn terminate(&mut self) {
        self.terminated += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_responses_are_used_before_fallback() {
        let stub: Stub<u8, &str, ()> = Stub::new("lookup");
        stub.expect().with_warnings(["first"]).return_ok("queued");
        stub.always().return_ok("fallback");

        let first = stub.call(1);
        let second = stub.call(2);

        assert_eq!(first.value(), Some(&"queued"));
        assert_eq!(first.warnings, vec!["first"]);
        assert_eq!(second.value(), Some(&"fallback"));
        assert!(second.warnings.is_empty());
        assert_eq!(stub.calls(), vec![1, 2]);
        stub.verify();
    }

    #[test]
    #[should_panic(expected = "unexpected call")]
    fn unscripted_call_panics() {
        let stub: Stub<(), (), ()> = Stub::new("nothing");
        stub.call(());
    }

    #[test]
    #[should_panic(expected = "1 remaining")]
    fn verify_reports_unused_expectations() {
        let stub: Stub<(), (), ()> = Stub::new("unused");
        stub.expect().return_ok(());
        stub.verify();
    }

    #[test]
    fn clones_share_recorded_calls() {
        let stub: Stub<&str, (), ()> = Stub::new("shared");
        stub.always().return_ok(());
        let handle = stub.clone();

        stub.call("a");

        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.args_for_call(0), Some("a"));
    }
}
