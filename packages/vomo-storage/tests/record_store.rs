use std::sync::Arc;

use tempfile::TempDir;

use vomo_storage::FileRecordStore;

fn store_in(dir: &TempDir) -> FileRecordStore {
	FileRecordStore::new(dir.path()).unwrap()
}

#[tokio::test]
async fn store_get_delete_round_trip() {
	let dir = TempDir::new().unwrap();
	let store = store_in(&dir);
	let id = store.store("alice", "buy milk", "Shopping reminder").await.unwrap();
	let memo = store.get("alice", &id).await.unwrap().unwrap();

	assert_eq!(memo.id, id);
	assert_eq!(memo.user_id, "alice");
	assert_eq!(memo.text, "buy milk");
	assert_eq!(memo.title, "Shopping reminder");
	assert!(memo.embedding.is_none());

	// Reads do not mutate: a second get returns an identical record.
	let reread = store.get("alice", &id).await.unwrap().unwrap();

	assert_eq!(memo, reread);

	let deleted = store.delete("alice", &id).await.unwrap().unwrap();

	assert_eq!(deleted.id, id);
	assert!(store.get("alice", &id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_unknown_returns_none() {
	let dir = TempDir::new().unwrap();
	let store = store_in(&dir);

	assert!(store.get("alice", "missing").await.unwrap().is_none());
	assert!(store.get("nobody", "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_unknown_returns_none() {
	let dir = TempDir::new().unwrap();
	let store = store_in(&dir);

	assert!(store.delete("alice", "missing").await.unwrap().is_none());

	let id = store.store("alice", "note", "Note").await.unwrap();

	// Another user's id must not resolve.
	assert!(store.delete("bob", &id).await.unwrap().is_none());
	assert!(store.get("alice", &id).await.unwrap().is_some());
}

#[tokio::test]
async fn repeated_stores_get_distinct_ids() {
	let dir = TempDir::new().unwrap();
	let store = store_in(&dir);
	let a = store.store("alice", "first", "First").await.unwrap();
	let b = store.store("alice", "second", "Second").await.unwrap();

	assert_ne!(a, b);
	assert!(store.get("alice", &a).await.unwrap().is_some());
	assert!(store.get("alice", &b).await.unwrap().is_some());
}

#[tokio::test]
async fn memos_survive_reopen() {
	let dir = TempDir::new().unwrap();
	let id = {
		let store = store_in(&dir);

		store.store("alice", "persists", "Persists").await.unwrap()
	};
	let reopened = store_in(&dir);
	let memo = reopened.get("alice", &id).await.unwrap().unwrap();

	assert_eq!(memo.text, "persists");
}

#[tokio::test]
async fn concurrent_stores_lose_nothing() {
	let dir = TempDir::new().unwrap();
	let store = Arc::new(store_in(&dir));
	let mut handles = Vec::new();

	for i in 0..8 {
		let store = store.clone();

		handles.push(tokio::spawn(async move {
			store.store("alice", &format!("memo {i}"), "Memo").await.unwrap()
		}));
	}

	let mut ids = Vec::new();

	for handle in handles {
		ids.push(handle.await.unwrap());
	}

	for id in &ids {
		assert!(store.get("alice", id).await.unwrap().is_some());
	}
}
