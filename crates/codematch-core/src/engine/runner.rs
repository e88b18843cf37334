use crate::literal::{parse_args, parse_or_raw};
use crate::model::{CaseReport, StoredTestCase, SuiteReport, TestStatus};
use crate::sandbox::{invoke_with_deadline, SandboxError};
use std::time::{Duration, Instant};

/// Outcome of one test case: whether it passed and the `str()` of the result
/// (or the failure message).
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub passed: bool,
    pub actual: String,
    pub status: TestStatus,
}

impl CaseOutcome {
    pub(crate) fn error(message: String) -> Self {
        Self {
            passed: false,
            actual: message,
            status: TestStatus::Error,
        }
    }

    pub(crate) fn timed_out(limit: Duration) -> Self {
        Self::error(format!("Error: timed out after {}s", limit.as_secs_f64()))
    }
}

/// Runs `source`'s first function on `input_repr` and compares the result to
/// `expected_repr`. Never fails: every error becomes a failed outcome.
pub fn run_test_case(source: &str, input_repr: &str, expected_repr: &str) -> CaseOutcome {
    run_test_case_within(source, input_repr, expected_repr, None)
}

/// [`run_test_case`] with evaluation stopped once `limit` has elapsed.
pub fn run_test_case_within(
    source: &str,
    input_repr: &str,
    expected_repr: &str,
    limit: Option<Duration>,
) -> CaseOutcome {
    let args = parse_args(input_repr);
    let expected = parse_or_raw(expected_repr);
    let deadline = limit.map(|l| Instant::now() + l);

    match invoke_with_deadline(source, &args, deadline) {
        Ok(invocation) => {
            let passed = invocation.result == expected;
            CaseOutcome {
                passed,
                actual: invocation.result.to_string(),
                status: if passed {
                    TestStatus::Pass
                } else {
                    TestStatus::Fail
                },
            }
        }
        Err(SandboxError::NoFunction) => CaseOutcome::error(SandboxError::NoFunction.to_string()),
        Err(SandboxError::Timeout) => CaseOutcome::timed_out(limit.unwrap_or_default()),
        Err(e) => CaseOutcome::error(format!("Error: {}", e)),
    }
}

/// Runs every case in order against `source`.
pub fn run_suite(source: &str, cases: &[StoredTestCase]) -> SuiteReport {
    let cases = cases
        .iter()
        .map(|tc| case_report(tc, run_test_case(source, &tc.input, &tc.expected_output)))
        .collect();
    SuiteReport { cases }
}

pub(crate) fn case_report(tc: &StoredTestCase, outcome: CaseOutcome) -> CaseReport {
    tracing::debug!(
        snippet_id = tc.snippet_id,
        test_case_id = tc.id,
        status = outcome.status.as_str(),
        "test case executed"
    );
    CaseReport {
        input: tc.input.clone(),
        expected: tc.expected_output.clone(),
        actual: outcome.actual,
        status: outcome.status,
        description: tc.description.clone(),
    }
}
