pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS codes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  code TEXT NOT NULL UNIQUE,
  language TEXT NOT NULL DEFAULT 'python',
  embedding TEXT,
  description TEXT
);

CREATE TABLE IF NOT EXISTS test_cases (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  code_id INTEGER NOT NULL REFERENCES codes(id),
  input TEXT NOT NULL,
  expected_output TEXT NOT NULL,
  description TEXT
);
"#;

/// Created after migrations so older databases with duplicate triples can be
/// collapsed first.
pub const TEST_CASE_TRIPLE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS idx_test_cases_triple
   ON test_cases(code_id, input, expected_output)";
