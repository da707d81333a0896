use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use ticklist_core::db::{open_db, open_db_in_memory, DbError};
use ticklist_core::{
    KvError, KvResult, KvStore, SqliteKvStore, StoreError, TaskStore, TASKS_KEY,
};

fn memory_store() -> TaskStore<SqliteKvStore> {
    let mut store = TaskStore::new(SqliteKvStore::new(open_db_in_memory().unwrap()));
    store.load().unwrap();
    store
}

#[test]
fn load_with_no_persisted_state_starts_empty() {
    let store = memory_store();
    assert!(store.tasks().is_empty());
    assert!(store.pending_edit().is_none());
}

#[test]
fn adds_append_in_order_with_pairwise_distinct_ids() {
    let mut store = memory_store();

    for label in ["a", "b", "c", "d"] {
        store.add(label).unwrap().expect("non-empty add should create a task");
    }

    assert_eq!(store.tasks().len(), 4);
    let texts: Vec<&str> = store.tasks().iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["a", "b", "c", "d"]);

    let ids: HashSet<_> = store.tasks().iter().map(|task| task.id.clone()).collect();
    assert_eq!(ids.len(), 4);
}

#[test]
fn whitespace_only_add_is_a_noop_in_memory_and_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticklist.sqlite3");

    {
        let mut store = TaskStore::new(SqliteKvStore::new(open_db(&path).unwrap()));
        store.load().unwrap();
        store.add("keep").unwrap();
        assert_eq!(store.add("").unwrap(), None);
        assert_eq!(store.add("   ").unwrap(), None);
        assert_eq!(store.tasks().len(), 1);
    }

    let mut reloaded = TaskStore::new(SqliteKvStore::new(open_db(&path).unwrap()));
    reloaded.load().unwrap();
    assert_eq!(reloaded.tasks().len(), 1);
    assert_eq!(reloaded.tasks()[0].text, "keep");
}

#[test]
fn toggle_twice_restores_original_completion() {
    let mut store = memory_store();
    let id = store.add("water plants").unwrap().unwrap();

    assert!(store.toggle_completion(&id).unwrap());
    assert!(store.tasks()[0].completed);

    assert!(store.toggle_completion(&id).unwrap());
    assert!(!store.tasks()[0].completed);
}

#[test]
fn toggle_of_unknown_id_is_a_noop() {
    let mut store = memory_store();
    store.add("only task").unwrap();

    assert!(!store.toggle_completion(&"missing".into()).unwrap());
    assert!(!store.tasks()[0].completed);
}

#[test]
fn second_delete_of_same_id_is_a_noop() {
    let mut store = memory_store();
    let id = store.add("ephemeral").unwrap().unwrap();

    assert!(store.delete(&id).unwrap());
    assert!(!store.delete(&id).unwrap());
    assert!(store.tasks().is_empty());
}

#[test]
fn reload_after_mutations_preserves_elements_order_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticklist.sqlite3");

    let original = {
        let mut store = TaskStore::new(SqliteKvStore::new(open_db(&path).unwrap()));
        store.load().unwrap();
        let first = store.add("first").unwrap().unwrap();
        store.add("second").unwrap();
        store.add("third").unwrap();
        store.toggle_completion(&first).unwrap();
        store.tasks().to_vec()
    };

    let mut reloaded = TaskStore::new(SqliteKvStore::new(open_db(&path).unwrap()));
    reloaded.load().unwrap();
    assert_eq!(reloaded.tasks(), original.as_slice());
}

#[test]
fn full_lifecycle_scenario() {
    let mut store = memory_store();

    let id = store.add("Buy milk").unwrap().unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].text, "Buy milk");
    assert!(!store.tasks()[0].completed);

    store.toggle_completion(&id).unwrap();
    assert!(store.tasks()[0].completed);

    assert!(store.begin_edit(&id));
    assert_eq!(store.pending_edit().unwrap().buffer, "Buy milk");
    assert!(store.commit_edit("Buy oat milk").unwrap());

    assert_eq!(store.tasks()[0].text, "Buy oat milk");
    assert_eq!(store.tasks()[0].id, id);
    assert!(store.tasks()[0].completed, "edit must preserve completion");
    assert!(store.pending_edit().is_none());

    store.delete(&id).unwrap();
    assert!(store.tasks().is_empty());
}

#[test]
fn insertion_order_survives_unrelated_mutations() {
    let mut store = memory_store();
    let id_a = store.add("A").unwrap().unwrap();
    let id_b = store.add("B").unwrap().unwrap();

    store.toggle_completion(&id_a).unwrap();
    store.begin_edit(&id_b);
    store.commit_edit("B edited").unwrap();

    let texts: Vec<&str> = store.tasks().iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["A", "B edited"]);
    assert_eq!(store.tasks()[0].id, id_a);
    assert_eq!(store.tasks()[1].id, id_b);
}

#[test]
fn begin_edit_of_unknown_id_leaves_state_idle() {
    let mut store = memory_store();
    store.add("present").unwrap();

    assert!(!store.begin_edit(&"absent".into()));
    assert!(store.pending_edit().is_none());
}

#[test]
fn empty_commit_keeps_edit_active() {
    let mut store = memory_store();
    let id = store.add("draft").unwrap().unwrap();

    store.begin_edit(&id);
    assert!(!store.commit_edit("   ").unwrap());

    let edit = store.pending_edit().expect("edit should remain active");
    assert_eq!(edit.task_id, id);
    assert_eq!(store.tasks()[0].text, "draft");
}

#[test]
fn commit_without_active_edit_is_rejected() {
    let mut store = memory_store();
    store.add("untouched").unwrap();

    assert!(!store.commit_edit("new text").unwrap());
    assert_eq!(store.tasks()[0].text, "untouched");
}

#[test]
fn cancel_edit_clears_state_without_mutation() {
    let mut store = memory_store();
    let id = store.add("stable").unwrap().unwrap();

    store.begin_edit(&id);
    store.cancel_edit();

    assert!(store.pending_edit().is_none());
    assert_eq!(store.tasks()[0].text, "stable");
}

#[test]
fn deleting_the_active_edit_target_prunes_edit_state() {
    let mut store = memory_store();
    let id = store.add("doomed").unwrap().unwrap();

    store.begin_edit(&id);
    store.delete(&id).unwrap();

    assert!(store.pending_edit().is_none());
    assert!(!store.commit_edit("resurrected?").unwrap());
    assert!(store.tasks().is_empty());
}

#[test]
fn malformed_persisted_payload_fails_load() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());
    kv.write(TASKS_KEY, "not json at all").unwrap();

    let mut store = TaskStore::new(kv);
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Deserialization(_)));
}

#[test]
fn persisted_task_with_blank_text_fails_load() {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());
    kv.write(TASKS_KEY, r#"[{"id":"1","text":"  ","completed":false}]"#)
        .unwrap();

    let mut store = TaskStore::new(kv);
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

/// Adapter double whose writes start failing on demand.
#[derive(Default)]
struct FlakyState {
    values: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

struct FlakyKv(Rc<FlakyState>);

impl KvStore for FlakyKv {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.0.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> KvResult<()> {
        if self.0.fail_writes.get() {
            return Err(KvError::Unavailable(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        self.0
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[test]
fn failed_write_surfaces_error_but_keeps_in_memory_mutation() {
    let state = Rc::new(FlakyState::default());
    let mut store = TaskStore::new(FlakyKv(Rc::clone(&state)));
    store.load().unwrap();

    store.add("durable").unwrap();

    // From here on the in-memory state advances past what storage holds.
    state.fail_writes.set(true);
    let err = store.add("volatile").unwrap_err();
    assert!(matches!(err, StoreError::Storage(KvError::Unavailable(_))));

    let texts: Vec<&str> = store.tasks().iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["durable", "volatile"]);
}
