//! Assertions for test validation.
//!
//! Locator assertions (`expect`) poll the live page until they hold. Value
//! assertions check an already-observed value once.

mod expect;
mod retry;

pub use expect::{expect, AssertionKind, Expect, ExpectAssertion};
pub use retry::{poll_until, AssertionCheckResult, RetryConfig, RetryError};

use crate::result::{E2eError, E2eResult};
use std::fmt::Debug;

/// Assert two numbers are equal within `tolerance`
///
/// # Errors
///
/// Returns [`E2eError::ValueAssertion`] when `|actual - expected| > tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) -> E2eResult<()> {
    if (actual - expected).abs() <= tolerance {
        Ok(())
    } else {
        Err(E2eError::value(format!(
            "expected {expected} (±{tolerance}), got {actual}"
        )))
    }
}

/// Assert two values are equal
///
/// # Errors
///
/// Returns [`E2eError::ValueAssertion`] when the values differ
pub fn assert_equals<T: PartialEq + Debug>(actual: &T, expected: &T) -> E2eResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(E2eError::value(format!(
            "expected {expected:?}, got {actual:?}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_assert_close_within_tolerance() {
            assert!(assert_close(270.0, 270.0, 0.01).is_ok());
            assert!(assert_close(269.995, 270.0, 0.01).is_ok());
        }

        #[test]
        fn test_assert_close_outside_tolerance() {
            let err = assert_close(260.0, 270.0, 0.01).unwrap_err();
            assert!(!err.aborts_scenario());
            assert!(err.to_string().contains("got 260"));
        }

        #[test]
        fn test_assert_equals() {
            assert!(assert_equals(&3, &3).is_ok());
            let err = assert_equals(&"a", &"b").unwrap_err();
            assert_eq!(err.to_string(), "Assertion failed: expected \"b\", got \"a\"");
        }
    }
}
