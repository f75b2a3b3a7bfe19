use serde_json::Map;

use crate::{Error, MemoService, Result};
use vomo_domain::{AudioInput, Embedding, MemoRecord, Summary};

impl MemoService {
	/// Runs the full memo pipeline: transcribe, title, embed, persist the
	/// record, then index the vector.
	///
	/// A provider failure aborts before anything is written. An index failure
	/// after the record write is returned as-is; the record stays readable and
	/// the stores reconcile at search time.
	pub async fn create_memo(&self, audio: AudioInput, user_id: &str) -> Result<MemoRecord> {
		let user_id = crate::require_user_id(user_id)?;

		tracing::info!(user_id, format = %audio.format(), bytes = audio.len(), "Creating memo.");

		let text = self
			.providers
			.transcriber
			.transcribe(&self.cfg.providers.transcription, &self.cfg.retry, &audio)
			.await
			.map_err(|source| Error::Transcription { source })?;
		let title = self
			.providers
			.summarizer
			.summarize(&self.cfg.providers.summarization, &self.cfg.retry, &text)
			.await
			.map_err(|source| Error::Summarization { source })?;
		let summary = Summary::new(text, title);
		let vector = self
			.providers
			.vectorizer
			.embed(&self.cfg.providers.embedding, &self.cfg.retry, &summary.text)
			.await
			.map_err(|source| Error::Vectorization { source })?;
		let id = self.records.store(user_id, &summary.text, &summary.title).await?;
		let mut metadata = Map::new();

		metadata.insert("text".to_string(), summary.text.clone().into());
		metadata.insert("title".to_string(), summary.title.clone().into());

		let embedding = Embedding { vector, text: summary.text.clone(), metadata };

		self.index
			.upsert(&id, &embedding, user_id)
			.await
			.map_err(|source| Error::Index { source })?;

		let Some(mut memo) = self.records.get(user_id, &id).await? else {
			return Err(Error::Storage {
				source: vomo_storage::Error::Message(format!(
					"Memo {id} vanished between store and read-back."
				)),
			});
		};

		memo.embedding = Some(embedding.vector);

		tracing::info!(user_id, memo_id = %memo.id, title = %memo.title, "Memo created.");

		Ok(memo)
	}
}
