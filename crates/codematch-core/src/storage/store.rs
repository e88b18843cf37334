use crate::embeddings::util::{decode_vec_json, encode_vec_json};
use crate::model::{Inserted, Snippet, StoredTestCase};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub snippets: u64,
    pub embedded: u64,
    pub test_cases: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StoreSample {
    pub snippet: Option<Snippet>,
    pub test_case: Option<StoredTestCase>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection lock poisoned"))
    }

    /// Runs `f` inside one transaction: committed on `Ok`, rolled back when
    /// `f` fails or panics.
    pub fn with_tx<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Creates tables, applies column migrations, collapses duplicate test
    /// cases and adds the unique index, all in one transaction.
    pub fn init_schema(&self) -> anyhow::Result<()> {
        self.with_tx(|tx| {
            tx.execute_batch(crate::storage::schema::DDL)?;
            migrate_descriptions(tx)?;
            dedupe_test_cases(tx)?;
            tx.execute(crate::storage::schema::TEST_CASE_TRIPLE_INDEX, [])?;
            Ok(())
        })
        .context("failed to initialize store schema")
    }

    /// Inserts a snippet unless identical text is already stored.
    pub fn insert_snippet(
        &self,
        code: &str,
        language: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Inserted> {
        let inserted = self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row("SELECT id FROM codes WHERE code = ?1", params![code], |r| {
                    r.get(0)
                })
                .optional()?;
            if let Some(id) = existing {
                return Ok(Inserted::Existing(id));
            }
            tx.execute(
                "INSERT INTO codes(code, language, description) VALUES (?1, ?2, ?3)",
                params![code, language, description],
            )?;
            Ok(Inserted::New(tx.last_insert_rowid()))
        })?;

        match inserted {
            Inserted::New(id) => tracing::info!(snippet_id = id, "snippet inserted"),
            Inserted::Existing(id) => tracing::debug!(snippet_id = id, "snippet already stored"),
        }
        Ok(inserted)
    }

    /// Stores `vector` on snippet `id`. Returns false when the snippet does not
    /// exist.
    pub fn attach_embedding(&self, id: i64, vector: &[f32]) -> anyhow::Result<bool> {
        if vector.is_empty() {
            anyhow::bail!("refusing to store an empty embedding for snippet {}", id);
        }
        let encoded = encode_vec_json(vector)?;

        self.with_tx(|tx| {
            let other: Option<String> = tx
                .query_row(
                    "SELECT embedding FROM codes WHERE embedding IS NOT NULL AND id != ?1 LIMIT 1",
                    params![id],
                    |r| r.get(0),
                )
                .optional()?;
            if let Some(dims) = other.and_then(|text| decode_vec_json(&text).ok()).map(|v| v.len())
            {
                if dims != vector.len() {
                    anyhow::bail!(
                        "embedding dims mismatch for snippet {} (stored={}, new={})",
                        id,
                        dims,
                        vector.len()
                    );
                }
            }

            let changed = tx.execute(
                "UPDATE codes SET embedding = ?1 WHERE id = ?2",
                params![encoded, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// All snippets that carry an embedding. Rows whose stored vector cannot be
    /// decoded are skipped.
    pub fn get_embeddings(&self) -> anyhow::Result<Vec<(i64, Vec<f32>)>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id, embedding FROM codes WHERE embedding IS NOT NULL ORDER BY id",
            )?;
            let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;

            let mut out = Vec::new();
            for row in rows {
                let (id, text) = row?;
                match decode_vec_json(&text) {
                    Ok(v) => out.push((id, v)),
                    Err(e) => tracing::warn!(
                        event = "embedding_decode_failed",
                        snippet_id = id,
                        error = %e,
                        "skipping snippet with unreadable embedding"
                    ),
                }
            }
            Ok(out)
        })
    }

    /// Inserts a test case unless the same (snippet, input, expected) triple
    /// exists.
    pub fn insert_test_case(
        &self,
        snippet_id: i64,
        input: &str,
        expected_output: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Inserted> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM test_cases WHERE code_id = ?1 AND input = ?2 AND expected_output = ?3",
                    params![snippet_id, input, expected_output],
                    |r| r.get(0),
                )
                .optional()?;
            if let Some(id) = existing {
                return Ok(Inserted::Existing(id));
            }
            tx.execute(
                "INSERT INTO test_cases(code_id, input, expected_output, description) VALUES (?1, ?2, ?3, ?4)",
                params![snippet_id, input, expected_output, description],
            )
            .with_context(|| format!("failed to insert test case for snippet {}", snippet_id))?;
            Ok(Inserted::New(tx.last_insert_rowid()))
        })
    }

    pub fn get_test_cases(&self, snippet_id: i64) -> anyhow::Result<Vec<StoredTestCase>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id, code_id, input, expected_output, description
                 FROM test_cases WHERE code_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![snippet_id], test_case_from_row)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
    }

    pub fn get_snippet(&self, id: i64) -> anyhow::Result<Option<Snippet>> {
        self.with_tx(|tx| {
            let snippet = tx
                .query_row(
                    "SELECT id, code, language, embedding, description FROM codes WHERE id = ?1",
                    params![id],
                    snippet_from_row,
                )
                .optional()?;
            Ok(snippet)
        })
    }

    pub fn stats(&self) -> anyhow::Result<StoreStats> {
        self.with_tx(|tx| {
            let count = |sql: &str| -> anyhow::Result<u64> {
                let n: i64 = tx.query_row(sql, [], |r| r.get(0))?;
                Ok(n as u64)
            };
            Ok(StoreStats {
                snippets: count("SELECT COUNT(*) FROM codes")?,
                embedded: count("SELECT COUNT(*) FROM codes WHERE embedding IS NOT NULL")?,
                test_cases: count("SELECT COUNT(*) FROM test_cases")?,
            })
        })
    }

    /// First stored snippet and first stored test case, for eyeballing a database.
    pub fn sample(&self) -> anyhow::Result<StoreSample> {
        self.with_tx(|tx| {
            let snippet = tx
                .query_row(
                    "SELECT id, code, language, embedding, description FROM codes ORDER BY id LIMIT 1",
                    [],
                    snippet_from_row,
                )
                .optional()?;
            let test_case = tx
                .query_row(
                    "SELECT id, code_id, input, expected_output, description
                     FROM test_cases ORDER BY id LIMIT 1",
                    [],
                    test_case_from_row,
                )
                .optional()?;
            Ok(StoreSample { snippet, test_case })
        })
    }
}

fn snippet_from_row(row: &Row<'_>) -> rusqlite::Result<Snippet> {
    let id: i64 = row.get(0)?;
    let embedding: Option<String> = row.get(3)?;
    let embedding = embedding.and_then(|text| match decode_vec_json(&text) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(event = "embedding_decode_failed", snippet_id = id, error = %e);
            None
        }
    });
    Ok(Snippet {
        id,
        code: row.get(1)?,
        language: row.get(2)?,
        embedding,
        description: row.get(4)?,
    })
}

fn test_case_from_row(row: &Row<'_>) -> rusqlite::Result<StoredTestCase> {
    Ok(StoredTestCase {
        id: row.get(0)?,
        snippet_id: row.get(1)?,
        input: row.get(2)?,
        expected_output: row.get(3)?,
        description: row.get(4)?,
    })
}

fn migrate_descriptions(conn: &Connection) -> anyhow::Result<()> {
    let cols = get_columns(conn, "codes")?;
    add_column_if_missing(conn, &cols, "codes", "description", "TEXT")?;
    let cols = get_columns(conn, "test_cases")?;
    add_column_if_missing(conn, &cols, "test_cases", "description", "TEXT")?;
    Ok(())
}

/// Older databases allowed repeated test-case triples; keep the earliest row.
fn dedupe_test_cases(conn: &Connection) -> anyhow::Result<()> {
    let removed = conn.execute(
        "DELETE FROM test_cases WHERE id NOT IN (
             SELECT MIN(id) FROM test_cases GROUP BY code_id, input, expected_output
         )",
        [],
    )?;
    if removed > 0 {
        tracing::warn!(event = "test_cases_deduplicated", removed, "collapsed duplicate test cases");
    }
    Ok(())
}

fn get_columns(conn: &Connection, table: &str) -> anyhow::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn add_column_if_missing(
    conn: &Connection,
    cols: &HashSet<String>,
    table: &str,
    col: &str,
    ty: &str,
) -> anyhow::Result<()> {
    if !cols.contains(col) {
        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col, ty);
        conn.execute(&sql, [])?;
    }
    Ok(())
}
