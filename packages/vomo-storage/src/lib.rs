mod error;
pub mod qdrant;
pub mod record;

pub use error::{Error, Result};
pub use qdrant::QdrantIndex;
pub use record::FileRecordStore;

use serde_json::{Map, Value};

/// One nearest-neighbor hit from the vector index, in descending-score order.
#[derive(Clone, Debug)]
pub struct IndexMatch {
	pub id: String,
	pub score: f32,
	pub metadata: Map<String, Value>,
}
