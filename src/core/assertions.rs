use crate::utils::error::{ApiTestError, Result};
use std::fmt::Debug;

/// Collects every mismatch of a verification block and reports them together.
#[derive(Debug, Default)]
pub struct SoftAssert {
    failures: Vec<String>,
}

impl SoftAssert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert_eq<T: PartialEq + Debug>(&mut self, actual: T, expected: T, message: &str) {
        if actual != expected {
            self.failures.push(mismatch(message, &actual, &expected));
        }
    }

    pub fn assert_true(&mut self, condition: bool, message: &str) {
        if !condition {
            self.failures.push(message.to_string());
        }
    }

    pub fn assert_some<T>(&mut self, value: &Option<T>, message: &str) {
        if value.is_none() {
            self.failures.push(message.to_string());
        }
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn assert_all(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ApiTestError::AssertionFailed {
                failures: self.failures,
            })
        }
    }
}

fn mismatch<T: Debug>(message: &str, actual: &T, expected: &T) -> String {
    format!("{} expected [{:?}] but found [{:?}]", message, expected, actual)
}

pub fn ensure_eq<T: PartialEq + Debug>(actual: T, expected: T, message: &str) -> Result<()> {
    if actual != expected {
        return Err(ApiTestError::assertion(mismatch(message, &actual, &expected)));
    }
    Ok(())
}

pub fn ensure(condition: bool, message: &str) -> Result<()> {
    if !condition {
        return Err(ApiTestError::assertion(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_assert_collects_all_failures() {
        let mut soft = SoftAssert::new();
        soft.assert_eq(1, 1, "equal values");
        soft.assert_eq("a", "b", "Login should match");
        soft.assert_true(false, "Players list should not be empty");
        soft.assert_some(&None::<i64>, "ID should not be null");

        assert_eq!(soft.failures().len(), 3);
        assert_eq!(
            soft.failures()[0],
            r#"Login should match expected ["b"] but found ["a"]"#
        );

        match soft.assert_all() {
            Err(ApiTestError::AssertionFailed { failures }) => assert_eq!(failures.len(), 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_soft_assert_passes_when_clean() {
        let mut soft = SoftAssert::new();
        soft.assert_eq(Some(5), Some(5), "Age should match");
        assert!(soft.assert_all().is_ok());
    }

    #[test]
    fn test_hard_asserts() {
        assert!(ensure_eq(404, 404, "not found").is_ok());
        let err = ensure_eq(200, 404, "Get should return not found after delete").unwrap_err();
        assert!(err.to_string().contains("expected [404] but found [200]"));
        assert!(ensure(true, "ok").is_ok());
        assert!(ensure(false, "Newly created player should be present").is_err());
    }
}
