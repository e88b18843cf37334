use crate::config::SearchConfig;
use crate::engine::runner::{case_report, run_test_case_within, CaseOutcome};
use crate::model::{Inserted, Snippet, SnippetSeed, StoredTestCase, SuiteReport};
use crate::providers::embedder::Embedder;
use crate::providers::llm::{generate_code, LlmClient};
use crate::ranker::{rank, RankedMatch};
use crate::storage::Store;
use anyhow::Context;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};

/// Extra wait past the in-interpreter deadline before a case thread is abandoned.
const CASE_GRACE: Duration = Duration::from_millis(500);
const CASE_STACK_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub top_n: usize,
    pub timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for PipelineSettings {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            top_n: cfg.top_n.max(1),
            timeout: Duration::from_secs(cfg.timeout_seconds.max(1)),
        }
    }
}

pub struct Pipeline {
    pub store: Store,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Option<Arc<dyn LlmClient>>,
    pub settings: PipelineSettings,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    pub snippet: Option<Inserted>,
    pub embedded: bool,
    pub test_cases_added: usize,
    pub test_cases_existing: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub seeds: usize,
    pub new_snippets: usize,
    pub existing_snippets: usize,
    pub embedded: usize,
    pub test_cases_added: usize,
    pub failures: usize,
}

impl IngestSummary {
    fn record(&mut self, outcome: &IngestOutcome) {
        self.seeds += 1;
        match outcome.snippet {
            Some(Inserted::New(_)) => self.new_snippets += 1,
            Some(Inserted::Existing(_)) => self.existing_snippets += 1,
            None => {}
        }
        if outcome.embedded {
            self.embedded += 1;
        }
        self.test_cases_added += outcome.test_cases_added;
        self.failures += outcome.errors.len();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BestMatch {
    pub snippet: Snippet,
    pub score: f64,
    pub report: SuiteReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub candidate: String,
    pub matches: Vec<RankedMatch<i64>>,
    pub best: Option<BestMatch>,
}

impl Pipeline {
    pub fn new(store: Store, embedder: Arc<dyn Embedder>, settings: PipelineSettings) -> Self {
        Self {
            store,
            embedder,
            generator: None,
            settings,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn LlmClient>) -> Self {
        self.generator = Some(generator);
        self
    }

    async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        match timeout(self.settings.timeout, fut).await {
            Ok(res) => res,
            Err(_) => anyhow::bail!(
                "{} timed out after {}s",
                what,
                self.settings.timeout.as_secs()
            ),
        }
    }

    /// Registers one snippet with its embedding and test cases. Failures are
    /// logged and recorded; later steps still run where they can.
    pub async fn ingest(&self, seed: &SnippetSeed) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        let inserted = match self.store.insert_snippet(
            &seed.code,
            &seed.language,
            seed.description.as_deref(),
        ) {
            Ok(i) => i,
            Err(e) => {
                tracing::warn!(event = "snippet_insert_failed", error = %e, "skipping seed");
                outcome.errors.push(format!("insert snippet: {}", e));
                return outcome;
            }
        };
        outcome.snippet = Some(inserted);
        let id = inserted.id();

        match self.bounded("embedding", self.embedder.embed(&seed.code)).await {
            Ok(vector) => match self.store.attach_embedding(id, &vector) {
                Ok(true) => {
                    outcome.embedded = true;
                    tracing::info!(snippet_id = id, dims = vector.len(), "embedding attached");
                }
                Ok(false) => outcome
                    .errors
                    .push(format!("attach embedding: snippet {} vanished", id)),
                Err(e) => {
                    tracing::warn!(event = "embedding_store_failed", snippet_id = id, error = %e);
                    outcome.errors.push(format!("attach embedding: {}", e));
                }
            },
            Err(e) => {
                tracing::warn!(
                    event = "embedding_failed",
                    snippet_id = id,
                    model = %self.embedder.model_id(),
                    error = %e,
                    "snippet stored without embedding"
                );
                outcome.errors.push(format!("embed: {}", e));
            }
        }

        for tc in &seed.test_cases {
            match self.store.insert_test_case(
                id,
                &tc.input,
                &tc.expected_output,
                tc.description.as_deref(),
            ) {
                Ok(Inserted::New(_)) => outcome.test_cases_added += 1,
                Ok(Inserted::Existing(_)) => outcome.test_cases_existing += 1,
                Err(e) => {
                    tracing::warn!(event = "test_case_insert_failed", snippet_id = id, error = %e);
                    outcome.errors.push(format!("insert test case: {}", e));
                }
            }
        }

        outcome
    }

    pub async fn ingest_all(&self, seeds: &[SnippetSeed]) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for seed in seeds {
            let outcome = self.ingest(seed).await;
            summary.record(&outcome);
        }
        summary
    }

    /// Asks the configured generator for a candidate implementation.
    pub async fn generate_candidate(&self, prompt: &str) -> anyhow::Result<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("config error: no generator configured"))?;
        self.bounded("code generation", generate_code(generator.as_ref(), prompt))
            .await
    }

    /// Ranks stored snippets against `code`, best first.
    pub async fn find_similar(&self, code: &str) -> anyhow::Result<Vec<RankedMatch<i64>>> {
        let query = self
            .bounded("embedding", self.embedder.embed(code))
            .await
            .context("failed to embed candidate code")?;
        let candidates = self.store.get_embeddings()?;
        let matches = rank(&query, &candidates, self.settings.top_n).with_context(|| {
            format!(
                "stored embeddings do not match {} output",
                self.embedder.model_id()
            )
        })?;
        tracing::info!(
            candidates = candidates.len(),
            returned = matches.len(),
            "similarity ranking done"
        );
        Ok(matches)
    }

    /// Ranks stored snippets against `candidate` and runs the best match's
    /// test cases against the candidate code.
    pub async fn search(&self, candidate: &str) -> anyhow::Result<SearchOutcome> {
        let matches = self.find_similar(candidate).await?;

        let best = match matches.first() {
            Some(top) => {
                let mut snippet = self
                    .store
                    .get_snippet(top.id)?
                    .ok_or_else(|| anyhow::anyhow!("snippet {} disappeared", top.id))?;
                snippet.embedding = None;
                let cases = self.store.get_test_cases(top.id)?;
                let report = run_suite_bounded(candidate, cases, self.settings.timeout).await;
                Some(BestMatch {
                    snippet,
                    score: top.score,
                    report,
                })
            }
            None => None,
        };

        Ok(SearchOutcome {
            candidate: candidate.to_string(),
            matches,
            best,
        })
    }
}

/// Runs `cases` against `source` in order, each bounded by `limit`. A case
/// that runs out of time becomes an error row; the remaining cases still run.
pub async fn run_suite_bounded(
    source: &str,
    cases: Vec<StoredTestCase>,
    limit: Duration,
) -> SuiteReport {
    let source: Arc<str> = Arc::from(source);
    let mut reports = Vec::with_capacity(cases.len());
    for tc in &cases {
        let outcome = run_case_bounded(Arc::clone(&source), tc, limit).await;
        reports.push(case_report(tc, outcome));
    }
    SuiteReport { cases: reports }
}

/// Runs one case on its own thread. The interpreter stops itself at `limit`;
/// a thread still busy after the grace period is left behind, not joined.
async fn run_case_bounded(source: Arc<str>, tc: &StoredTestCase, limit: Duration) -> CaseOutcome {
    let (tx, rx) = oneshot::channel();
    let (input, expected) = (tc.input.clone(), tc.expected_output.clone());
    let spawned = std::thread::Builder::new()
        .name(format!("codematch-case-{}", tc.id))
        .stack_size(CASE_STACK_BYTES)
        .spawn(move || {
            let _ = tx.send(run_test_case_within(&source, &input, &expected, Some(limit)));
        });
    if let Err(e) = spawned {
        return CaseOutcome::error(format!("Error: could not start test thread: {}", e));
    }

    match timeout(limit + CASE_GRACE, rx).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => CaseOutcome::error("Error: test execution aborted".to_string()),
        Err(_) => {
            tracing::warn!(
                event = "case_abandoned",
                snippet_id = tc.snippet_id,
                test_case_id = tc.id,
                limit_ms = limit.as_millis() as u64,
                "test case did not stop at its deadline"
            );
            CaseOutcome::timed_out(limit)
        }
    }
}

/// Runs snippet `snippet_id`'s stored test cases against `code`, or against
/// the snippet itself when `code` is `None`.
pub async fn check_snippet(
    store: &Store,
    snippet_id: i64,
    code: Option<&str>,
    limit: Duration,
) -> anyhow::Result<(Snippet, SuiteReport)> {
    let mut snippet = store
        .get_snippet(snippet_id)?
        .ok_or_else(|| anyhow::anyhow!("no snippet with id {}", snippet_id))?;
    snippet.embedding = None;
    let cases = store.get_test_cases(snippet_id)?;
    let source = code.unwrap_or(snippet.code.as_str()).to_string();
    let report = run_suite_bounded(&source, cases, limit).await;
    Ok((snippet, report))
}
