use codematch_core::model::Inserted;
use codematch_core::storage::Store;
use tempfile::tempdir;

#[test]
fn test_storage_smoke_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("code_comparison.db");

    let store = Store::open(&db_path)?;
    store.init_schema()?;

    // 1. Snippet insert is idempotent on the exact text
    let code = "def add(a, b):\n    return a + b";
    let first = store.insert_snippet(code, "python", Some("Add two numbers"))?;
    let second = store.insert_snippet(code, "python", Some("Add two numbers"))?;
    assert!(first.is_new());
    assert_eq!(second, Inserted::Existing(first.id()));
    assert_eq!(store.stats()?.snippets, 1);

    // 2. Embeddings: only attached rows are returned
    let other = store.insert_snippet("def sub(a, b):\n    return a - b", "python", None)?;
    assert!(store.attach_embedding(first.id(), &[0.25, 0.5, -1.0])?);
    assert!(!store.attach_embedding(9999, &[0.25, 0.5, -1.0])?);
    let embeddings = store.get_embeddings()?;
    assert_eq!(embeddings, vec![(first.id(), vec![0.25, 0.5, -1.0])]);
    assert!(store.get_snippet(other.id())?.is_some_and(|s| s.embedding.is_none()));

    // 3. Test cases are idempotent on (snippet, input, expected) and ordered
    let t1 = store.insert_test_case(first.id(), "1, 2", "3", None)?;
    let t2 = store.insert_test_case(first.id(), "-1, 1", "0", Some("opposites"))?;
    let again = store.insert_test_case(first.id(), "1, 2", "3", None)?;
    assert_eq!(again, Inserted::Existing(t1.id()));
    assert!(store.insert_test_case(first.id(), "1, 2", "4", None)?.is_new());

    let cases = store.get_test_cases(first.id())?;
    let ids: Vec<i64> = cases.iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[..2], [t1.id(), t2.id()]);
    assert_eq!(cases[1].description.as_deref(), Some("opposites"));
    assert!(store.get_test_cases(other.id())?.is_empty());

    // 4. Stats and sample survive a reopen
    drop(store);
    let store = Store::open(&db_path)?;
    store.init_schema()?;
    let stats = store.stats()?;
    assert_eq!((stats.snippets, stats.embedded, stats.test_cases), (2, 1, 3));
    let sample = store.sample()?;
    assert_eq!(sample.snippet.map(|s| s.id), Some(first.id()));
    assert_eq!(sample.test_case.map(|t| t.input), Some("1, 2".to_string()));

    Ok(())
}

#[test]
fn test_case_for_unknown_snippet_is_rejected() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;
    assert!(store.insert_test_case(42, "1", "1", None).is_err());
    assert_eq!(store.stats()?.test_cases, 0);
    Ok(())
}

#[test]
fn undecodable_embeddings_are_skipped() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("broken.db");
    let store = Store::open(&db_path)?;
    store.init_schema()?;
    let good = store.insert_snippet("def a(): return 1", "python", None)?.id();
    let bad = store.insert_snippet("def b(): return 2", "python", None)?.id();
    store.attach_embedding(good, &[1.0, 0.0])?;

    let raw = rusqlite::Connection::open(&db_path)?;
    raw.execute(
        "UPDATE codes SET embedding = '[1.0, oops' WHERE id = ?1",
        rusqlite::params![bad],
    )?;
    drop(raw);

    let embeddings = store.get_embeddings()?;
    assert_eq!(embeddings.len(), 1);
    assert_eq!(embeddings[0].0, good);
    Ok(())
}
