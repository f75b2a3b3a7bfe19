//! In-memory fakes for exercising the memo pipeline without network or disk.

use std::{
	collections::BTreeMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Map;

use vomo_config::{
	Config, EmbeddingProviderConfig, ProviderConfig, Providers as ProvidersConfig, Qdrant, Retry,
	Search, Service, Storage, SummarizationProviderConfig,
};
use vomo_domain::{AudioInput, Embedding, MemoRecord};
use vomo_service::{BoxFuture, RecordStore, Summarizer, Transcriber, VectorIndex, Vectorizer};
use vomo_storage::IndexMatch;

/// Shared record of every capability and store call, in invocation order.
#[derive(Clone, Default)]
pub struct CallLog {
	calls: Arc<Mutex<Vec<String>>>,
}
impl CallLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&self, call: &str) {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(call.to_string());
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

fn provider_failure() -> vomo_providers::Error {
	vomo_providers::Error::Status { status: 500, message: "boom".to_string() }
}

pub struct FakeTranscriber {
	pub log: CallLog,
	pub text: String,
	pub fail: bool,
}
impl Transcriber for FakeTranscriber {
	fn transcribe<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_retry: &'a Retry,
		_audio: &'a AudioInput,
	) -> BoxFuture<'a, vomo_providers::Result<String>> {
		self.log.record("transcribe");

		Box::pin(async move {
			if self.fail {
				return Err(provider_failure());
			}

			Ok(self.text.clone())
		})
	}
}

pub struct FakeSummarizer {
	pub log: CallLog,
	pub title: String,
	pub fail: bool,
}
impl Summarizer for FakeSummarizer {
	fn summarize<'a>(
		&'a self,
		_cfg: &'a SummarizationProviderConfig,
		_retry: &'a Retry,
		_text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<String>> {
		self.log.record("summarize");

		Box::pin(async move {
			if self.fail {
				return Err(provider_failure());
			}

			Ok(self.title.clone())
		})
	}
}

pub struct FakeVectorizer {
	pub log: CallLog,
	pub vector: Vec<f32>,
	pub fail: bool,
}
impl Vectorizer for FakeVectorizer {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_retry: &'a Retry,
		_text: &'a str,
	) -> BoxFuture<'a, vomo_providers::Result<Vec<f32>>> {
		self.log.record("embed");

		Box::pin(async move {
			if self.fail {
				return Err(provider_failure());
			}

			Ok(self.vector.clone())
		})
	}
}

/// Record store over a plain map. Ids are sequential (`memo-1`, `memo-2`) so
/// tests can predict them.
#[derive(Default)]
pub struct MemoryRecordStore {
	pub log: CallLog,
	pub fail_store: bool,
	memos: Mutex<BTreeMap<String, BTreeMap<String, MemoRecord>>>,
	next_id: AtomicUsize,
}
impl MemoryRecordStore {
	pub fn new(log: CallLog) -> Self {
		Self { log, ..Self::default() }
	}

	/// Seeds a memo under a caller-chosen id, bypassing the call log.
	pub fn seed(&self, memo: MemoRecord) {
		self.memos
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.entry(memo.user_id.clone())
			.or_default()
			.insert(memo.id.clone(), memo);
	}
}
impl RecordStore for MemoryRecordStore {
	fn store<'a>(
		&'a self,
		user_id: &'a str,
		text: &'a str,
		title: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<String>> {
		self.log.record("store");

		Box::pin(async move {
			if self.fail_store {
				return Err(vomo_storage::Error::Message("store failed".to_string()));
			}

			let id = format!("memo-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
			let memo = MemoRecord {
				id: id.clone(),
				user_id: user_id.to_string(),
				text: text.to_string(),
				title: title.to_string(),
				date: time::OffsetDateTime::now_utc(),
				embedding: None,
			};

			self.seed(memo);

			Ok(id)
		})
	}

	fn get<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>> {
		self.log.record("get");

		Box::pin(async move {
			Ok(self
				.memos
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get(user_id)
				.and_then(|memos| memos.get(memo_id))
				.cloned())
		})
	}

	fn delete<'a>(
		&'a self,
		user_id: &'a str,
		memo_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<Option<MemoRecord>>> {
		self.log.record("delete_record");

		Box::pin(async move {
			Ok(self
				.memos
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.get_mut(user_id)
				.and_then(|memos| memos.remove(memo_id)))
		})
	}
}

/// Vector index that hands back canned matches and records every mutation.
#[derive(Default)]
pub struct MemoryVectorIndex {
	pub log: CallLog,
	pub fail_upsert: bool,
	pub fail_query: bool,
	matches: Mutex<Vec<IndexMatch>>,
	upserts: Mutex<Vec<(String, String)>>,
	deletes: Mutex<Vec<String>>,
}
impl MemoryVectorIndex {
	pub fn new(log: CallLog) -> Self {
		Self { log, ..Self::default() }
	}

	/// Sets the matches every subsequent `query` returns, pre-truncation.
	pub fn set_matches(&self, matches: Vec<IndexMatch>) {
		*self.matches.lock().unwrap_or_else(|err| err.into_inner()) = matches;
	}

	/// `(memo_id, user_id)` pairs upserted so far.
	pub fn upserts(&self) -> Vec<(String, String)> {
		self.upserts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn deletes(&self) -> Vec<String> {
		self.deletes.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl VectorIndex for MemoryVectorIndex {
	fn upsert<'a>(
		&'a self,
		id: &'a str,
		_embedding: &'a Embedding,
		user_id: &'a str,
	) -> BoxFuture<'a, vomo_storage::Result<()>> {
		self.log.record("upsert");

		Box::pin(async move {
			if self.fail_upsert {
				return Err(vomo_storage::Error::Message("upsert failed".to_string()));
			}

			self.upserts
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push((id.to_string(), user_id.to_string()));

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		_vector: &'a [f32],
		_user_id: &'a str,
		limit: u32,
	) -> BoxFuture<'a, vomo_storage::Result<Vec<IndexMatch>>> {
		self.log.record("query");

		Box::pin(async move {
			if self.fail_query {
				return Err(vomo_storage::Error::Message("query failed".to_string()));
			}

			let matches = self.matches.lock().unwrap_or_else(|err| err.into_inner());

			Ok(matches.iter().take(limit as usize).cloned().collect())
		})
	}

	fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, vomo_storage::Result<()>> {
		self.log.record("delete_index");

		Box::pin(async move {
			self.deletes.lock().unwrap_or_else(|err| err.into_inner()).push(id.to_string());

			Ok(())
		})
	}
}

pub fn memo(user_id: &str, id: &str, text: &str, title: &str) -> MemoRecord {
	MemoRecord {
		id: id.to_string(),
		user_id: user_id.to_string(),
		text: text.to_string(),
		title: title.to_string(),
		date: time::OffsetDateTime::now_utc(),
		embedding: None,
	}
}

pub fn index_match(id: &str, score: f32) -> IndexMatch {
	IndexMatch { id: id.to_string(), score, metadata: Map::new() }
}

/// A config with inert provider endpoints and single-attempt retries, so no
/// test ever sleeps or dials out.
pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			data_dir: "target/testdata".to_string(),
			qdrant: Qdrant {
				url: "http://localhost:6334".to_string(),
				collection: "memos_test".to_string(),
				vector_dim: 3,
			},
		},
		providers: ProvidersConfig {
			transcription: ProviderConfig {
				provider_id: "openai".to_string(),
				api_base: "http://localhost:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/audio/transcriptions".to_string(),
				model: "whisper-1".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			summarization: SummarizationProviderConfig {
				provider_id: "anthropic".to_string(),
				api_base: "http://localhost:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/messages".to_string(),
				model: "claude-3-5-haiku-latest".to_string(),
				max_tokens: 100,
				system_prompt: None,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			embedding: EmbeddingProviderConfig {
				provider_id: "openai".to_string(),
				api_base: "http://localhost:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "text-embedding-3-small".to_string(),
				dimensions: 3,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		retry: Retry { max_attempts: 1, base_delay_ms: 1 },
		search: Search { default_limit: 5, max_limit: 100 },
	}
}
