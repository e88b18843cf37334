use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "python";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snippet {
    pub id: i64,
    pub code: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTestCase {
    pub id: i64,
    pub snippet_id: i64,
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Result of an idempotent insert: the row id plus whether the row was new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Inserted {
    New(i64),
    Existing(i64),
}

impl Inserted {
    pub fn id(&self) -> i64 {
        match self {
            Inserted::New(id) | Inserted::Existing(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Inserted::New(_))
    }
}

/// Seed record for a snippet and the test cases that belong to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnippetSeed {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCaseSeed {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
        }
    }
}

/// One executed test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseReport {
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    /// Failures including cases that errored.
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn errors(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.status == TestStatus::Error)
            .count()
    }

    /// Fraction of passing cases; 0.0 for an empty suite.
    pub fn pass_rate(&self) -> f64 {
        if self.cases.is_empty() {
            return 0.0;
        }
        self.passed() as f64 / self.total() as f64
    }

    pub fn all_passed(&self) -> bool {
        !self.cases.is_empty() && self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(status: TestStatus) -> CaseReport {
        CaseReport {
            input: "1".into(),
            expected: "1".into(),
            actual: "1".into(),
            status,
            description: None,
        }
    }

    #[test]
    fn empty_suite_has_zero_pass_rate() {
        let report = SuiteReport::default();
        assert_eq!(report.total(), 0);
        assert_eq!(report.pass_rate(), 0.0);
        assert!(!report.all_passed());
    }

    #[test]
    fn errors_count_as_failures() {
        let report = SuiteReport {
            cases: vec![
                case(TestStatus::Pass),
                case(TestStatus::Fail),
                case(TestStatus::Error),
                case(TestStatus::Pass),
            ],
        };
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.errors(), 1);
        assert!((report.pass_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn seed_defaults_language() -> anyhow::Result<()> {
        let seed: SnippetSeed = serde_yaml::from_str("code: \"def f(): return 1\"\n")?;
        assert_eq!(seed.language, "python");
        assert!(seed.test_cases.is_empty());
        Ok(())
    }
}
