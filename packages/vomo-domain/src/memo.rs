use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

pub const MAX_TITLE_CHARS: usize = 200;

/// A transcription plus the short title generated for it.
#[derive(Clone, Debug)]
pub struct Summary {
	pub text: String,
	pub title: String,
}
impl Summary {
	/// Titles longer than [`MAX_TITLE_CHARS`] are truncated at a character
	/// boundary rather than rejected.
	pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
		let title: String = title.into();
		let title = title.trim().chars().take(MAX_TITLE_CHARS).collect();

		Self { text: text.into(), title }
	}
}

/// A fixed-length embedding together with the text it was computed from.
#[derive(Clone, Debug)]
pub struct Embedding {
	pub vector: Vec<f32>,
	pub text: String,
	pub metadata: Map<String, Value>,
}

/// The durable memo entity. Immutable after creation; only deletion mutates
/// state afterwards. The embedding is a denormalized copy, not authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoRecord {
	pub id: String,
	pub user_id: String,
	pub text: String,
	pub title: String,
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
}

/// One search hit: the hydrated record plus its relevance score.
#[derive(Clone, Debug)]
pub struct SearchResult {
	pub memo: MemoRecord,
	pub score: f32,
	pub metadata: Map<String, Value>,
}
impl SearchResult {
	/// Scores are clamped into `[0, 1]`; cosine similarity can dip below zero
	/// and index backends are free to report raw values.
	pub fn new(memo: MemoRecord, score: f32, metadata: Map<String, Value>) -> Self {
		Self { memo, score: score.clamp(0.0, 1.0), metadata }
	}
}

/// Derives a memo id from a checksum of user, creation time, and content.
///
/// Collision-resistant within a user's namespace: two creates for the same
/// user differ in timestamp or content, so they hash to different ids. The
/// first 16 bytes of the digest are rendered as a UUID so the id doubles as
/// a vector-index point id.
pub fn memo_id(user_id: &str, created_at: OffsetDateTime, text: &str) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(user_id.as_bytes());
	hasher.update(&created_at.unix_timestamp_nanos().to_le_bytes());
	hasher.update(text.as_bytes());

	let digest = hasher.finalize();
	let mut bytes = [0_u8; 16];

	bytes.copy_from_slice(&digest.as_bytes()[..16]);

	Uuid::from_bytes(bytes).to_string()
}
