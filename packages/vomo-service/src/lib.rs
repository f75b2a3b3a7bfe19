pub mod create;
pub mod delete;
pub mod search;

use std::{future::Future, pin::Pin, sync::Arc};

use vomo_config::{
	Config, EmbeddingProviderConfig, ProviderConfig, Retry, SummarizationProviderConfig,
};
use vomo_domain::{AudioInput, Embedding, MemoRecord};
use vomo_providers::{embedding, summarization, transcription};
use vomo_storage::{FileRecordStore, IndexMatch, QdrantIndex};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Transcription failed: {source}")]
	Transcription { source: vomo_providers::Error },
	#[error("Summarization failed: {source}")]
	Summarization { source: vomo_providers::Error },
	#[error("Vectorization failed: {source}")]
	Vectorization { source: vomo_providers::Error },
	#[error("Storage error: {source}")]
	Storage {
		#[from]
		source: vomo_storage::Error,
	},
	#[error("Index error: {source}")]
	Index { source: vomo_storage::Error },
}

pub trait Transcriber
where
	Self: Send + Sync,
{
	fn transcribe<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		retry: &'a Retry,
		audio: &'a AudioInput,
	) -> BoxFuture<'a, vomo_providers::Result<String>>;
}

pub trait Summarizer
where
	Self: Send + Sync,
{
	fn summarize<'a>(
		&'a self,
		cfg: &'a SummarizationProviderConfig,
		retry: &'a Retry,
		text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<String>>;
}

pub trait Vectorizer
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		retry: &'a Retry,
		text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<Vec<f32>>>;
}

/// Durable keyed memo storage, the authoritative side of the two stores.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn store<'a>(
		&'a self,
		user_id: &'a str,
		text: &'a str,
		title: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<String>>;

	fn get<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>>;

	fn delete<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>>;
}

/// Approximate nearest-neighbor index keyed by memo id.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(
		&'a self,
		id: &'a str,
		embedding: &'a Embedding,
		user_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<()>>;

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		user_id: &'a str,
		limit: u32,
	) -> BoxFuture<'a, vomo_storage::Result<Vec<IndexMatch>>>;

	fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, vomo_storage::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub transcriber: Arc<dyn Transcriber>,
	pub summarizer: Arc<dyn Summarizer>,
	pub vectorizer: Arc<dyn Vectorizer>,
}

pub struct MemoService {
	pub cfg: Config,
	pub records: Arc<dyn RecordStore>,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
}

struct DefaultProviders;

impl Transcriber for DefaultProviders {
	fn transcribe<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		retry: &'a Retry,
		audio: &'a AudioInput,
	) -> BoxFuture<'a, vomo_providers::Result<String>> {
		Box::pin(transcription::transcribe(cfg, retry, audio))
	}
}

impl Summarizer for DefaultProviders {
	fn summarize<'a>(
		&'a self,
		cfg: &'a SummarizationProviderConfig,
		retry: &'a Retry,
		text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<String>> {
		Box::pin(summarization::summarize(cfg, retry, text))
	}
}

impl Vectorizer for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		retry: &'a Retry,
		text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, retry, text))
	}
}

impl RecordStore for FileRecordStore {
	fn store<'a>(
		&'a self,
		user_id: &'a str,
		text: &'a str,
		title: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<String>> {
		Box::pin(FileRecordStore::store(self, user_id, text, title))
	}

	fn get<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>> {
		Box::pin(FileRecordStore::get(self, user_id, memo_id))
	}

	fn delete<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>> {
		Box::pin(FileRecordStore::delete(self, user_id, memo_id))
	}
}

impl VectorIndex for QdrantIndex {
	fn upsert<'a>(
		&'a self,
		id: &'a str,
		embedding: &'a Embedding,
		user_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<()>> {
		Box::pin(QdrantIndex::upsert(self, id, embedding, user_id))
	}

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		user_id: &'a str,
		limit: u32,
	) -> BoxFuture<'a, vomo_storage::Result<Vec<IndexMatch>>> {
		Box::pin(QdrantIndex::query(self, vector, user_id, limit))
	}

	fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, vomo_storage::Result<()>> {
		Box::pin(QdrantIndex::delete(self, id))
	}
}

impl Providers {
	pub fn new(
		transcriber: Arc<dyn Transcriber>,
		summarizer: Arc<dyn Summarizer>,
		vectorizer: Arc<dyn Vectorizer>,
	) -> Self {
		Self { transcriber, summarizer, vectorizer }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { transcriber: provider.clone(), summarizer: provider.clone(), vectorizer: provider }
	}
}

impl MemoService {
	pub fn new(cfg: Config, records: Arc<dyn RecordStore>, index: Arc<dyn VectorIndex>) -> Self {
		Self { cfg, records, index, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		records: Arc<dyn RecordStore>,
		index: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Self {
		Self { cfg, records, index, providers }
	}
}

pub(crate) fn require_user_id(user_id: &str) -> Result<&str> {
	let user_id = user_id.trim();

	if user_id.is_empty() {
		return Err(Error::InvalidRequest { message: "user_id must not be blank.".to_string() });
	}

	Ok(user_id)
}
