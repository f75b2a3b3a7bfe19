use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::Result;
use vomo_domain::{MemoRecord, memo_id};

const DB_FILE: &str = "db.json";

type Db = BTreeMap<String, BTreeMap<String, StoredMemo>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredMemo {
	text: String,
	title: String,
	#[serde(with = "vomo_domain::time_serde")]
	date: OffsetDateTime,
}

/// Record store backed by a single JSON file under the data directory,
/// keyed `user_id -> memo_id -> memo`.
pub struct FileRecordStore {
	path: PathBuf,
	// The backing file has no atomic keyed upsert; every operation is a full
	// read-modify-write, so writers must be serialized globally.
	lock: Mutex<()>,
}
impl FileRecordStore {
	pub fn new(data_dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(data_dir)?;

		let path = data_dir.join(DB_FILE);

		if !path.exists() {
			std::fs::write(&path, "{}")?;
		}

		tracing::info!(path = %path.display(), "Initialized record store.");

		Ok(Self { path, lock: Mutex::new(()) })
	}

	/// Persists a new memo and returns its freshly assigned id.
	pub async fn store(&self, user_id: &str, text: &str, title: &str) -> Result<String> {
		let _guard = self.lock.lock().await;
		let mut db = self.read_db().await?;
		let date = OffsetDateTime::now_utc();
		let id = memo_id(user_id, date, text);

		db.entry(user_id.to_string()).or_default().insert(
			id.clone(),
			StoredMemo { text: text.to_string(), title: title.to_string(), date },
		);

		self.write_db(&db).await?;

		Ok(id)
	}

	pub async fn get(&self, user_id: &str, memo_id: &str) -> Result<Option<MemoRecord>> {
		let _guard = self.lock.lock().await;
		let db = self.read_db().await?;

		Ok(db
			.get(user_id)
			.and_then(|memos| memos.get(memo_id))
			.map(|stored| to_record(user_id, memo_id, stored)))
	}

	/// Removes a memo and returns it, or `None` if it was never there.
	pub async fn delete(&self, user_id: &str, memo_id: &str) -> Result<Option<MemoRecord>> {
		let _guard = self.lock.lock().await;
		let mut db = self.read_db().await?;
		let Some(stored) = db.get_mut(user_id).and_then(|memos| memos.remove(memo_id)) else {
			return Ok(None);
		};

		self.write_db(&db).await?;

		Ok(Some(to_record(user_id, memo_id, &stored)))
	}

	async fn read_db(&self) -> Result<Db> {
		let raw = tokio::fs::read(&self.path).await?;

		Ok(serde_json::from_slice(&raw)?)
	}

	async fn write_db(&self, db: &Db) -> Result<()> {
		let raw = serde_json::to_vec_pretty(db)?;

		tokio::fs::write(&self.path, raw).await?;

		Ok(())
	}
}

fn to_record(user_id: &str, memo_id: &str, stored: &StoredMemo) -> MemoRecord {
	MemoRecord {
		id: memo_id.to_string(),
		user_id: user_id.to_string(),
		text: stored.text.clone(),
		title: stored.title.clone(),
		date: stored.date,
		embedding: None,
	}
}
