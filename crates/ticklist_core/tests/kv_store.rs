use ticklist_core::db::{open_db, open_db_in_memory};
use ticklist_core::{KvStore, SqliteKvStore};

#[test]
fn read_of_never_written_key_returns_none() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());

    assert_eq!(kv.read("tasks").unwrap(), None);
}

#[test]
fn write_then_read_returns_stored_value() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());

    kv.write("tasks", "[]").unwrap();
    assert_eq!(kv.read("tasks").unwrap().as_deref(), Some("[]"));
}

#[test]
fn write_overwrites_prior_value() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());

    kv.write("tasks", "first").unwrap();
    kv.write("tasks", "second").unwrap();

    assert_eq!(kv.read("tasks").unwrap().as_deref(), Some("second"));
}

#[test]
fn keys_are_independent() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());

    kv.write("tasks", "[1]").unwrap();
    kv.write("settings", "{}").unwrap();

    assert_eq!(kv.read("tasks").unwrap().as_deref(), Some("[1]"));
    assert_eq!(kv.read("settings").unwrap().as_deref(), Some("{}"));
}

#[test]
fn values_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticklist.sqlite3");

    {
        let kv = SqliteKvStore::new(open_db(&path).unwrap());
        kv.write("tasks", r#"[{"id":"1","text":"a","completed":false}]"#)
            .unwrap();
    }

    let kv = SqliteKvStore::new(open_db(&path).unwrap());
    assert_eq!(
        kv.read("tasks").unwrap().as_deref(),
        Some(r#"[{"id":"1","text":"a","completed":false}]"#)
    );
}
