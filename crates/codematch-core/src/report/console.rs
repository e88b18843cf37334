use crate::engine::pipeline::{IngestSummary, SearchOutcome};
use crate::model::{SuiteReport, TestStatus};
use crate::storage::{StoreSample, StoreStats};

pub fn print_suite(report: &SuiteReport) {
    eprintln!("\nRunning {} test cases...", report.total());
    for (i, case) in report.cases.iter().enumerate() {
        eprintln!("\nTest case {}:", i + 1);
        if let Some(desc) = &case.description {
            eprintln!("Description: {}", desc);
        }
        eprintln!("Input: {}", case.input);
        eprintln!("Expected Output: {}", case.expected);
        eprintln!("Actual Output: {}", case.actual);
        let label = match case.status {
            TestStatus::Pass => "✓ Pass",
            TestStatus::Fail => "✗ Fail",
            TestStatus::Error => "✗ Error",
        };
        eprintln!("Result: {}", label);
    }
    eprintln!(
        "\nSummary: {}/{} test cases passed ({:.1}%)",
        report.passed(),
        report.total(),
        report.pass_rate() * 100.0
    );
}

pub fn print_search(outcome: &SearchOutcome) {
    eprintln!("Candidate code:\n{}\n", outcome.candidate);

    if outcome.matches.is_empty() {
        eprintln!("No similar code found (no stored snippets carry an embedding).");
        return;
    }

    eprintln!("Top {} similar snippets:", outcome.matches.len());
    for (rank, m) in outcome.matches.iter().enumerate() {
        eprintln!("  {}. snippet #{:<6} similarity {:.4}", rank + 1, m.id, m.score);
    }

    if let Some(best) = &outcome.best {
        eprintln!(
            "\nBest match: snippet #{} (similarity {:.4})",
            best.snippet.id, best.score
        );
        if let Some(desc) = &best.snippet.description {
            eprintln!("Description: {}", desc);
        }
        eprintln!("{}", best.snippet.code);
        if best.report.total() == 0 {
            eprintln!("\nThe best match has no stored test cases.");
        } else {
            print_suite(&best.report);
        }
    }
}

pub fn print_ingest(summary: &IngestSummary) {
    eprintln!(
        "ingested {} seeds: {} new, {} already stored, {} embedded, {} test cases added",
        summary.seeds,
        summary.new_snippets,
        summary.existing_snippets,
        summary.embedded,
        summary.test_cases_added
    );
    if summary.failures > 0 {
        eprintln!(
            "⚠️  {} step(s) failed; see log output for details",
            summary.failures
        );
    }
}

pub fn print_stats(stats: &StoreStats, sample: &StoreSample) {
    eprintln!("Stored snippets:   {}", stats.snippets);
    eprintln!("  with embedding:  {}", stats.embedded);
    eprintln!("Stored test cases: {}", stats.test_cases);

    if let Some(snippet) = &sample.snippet {
        eprintln!("\nSample snippet #{} ({}):", snippet.id, snippet.language);
        eprintln!("{}", preview(&snippet.code, 100));
        match &snippet.embedding {
            Some(v) => eprintln!("Embedding: {} dims", v.len()),
            None => eprintln!("Embedding: none"),
        }
    }
    if let Some(tc) = &sample.test_case {
        eprintln!("\nSample test case #{} (snippet #{}):", tc.id, tc.snippet_id);
        eprintln!("Input: {}", tc.input);
        eprintln!("Expected Output: {}", tc.expected_output);
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("short", 10), "short");
    }
}
