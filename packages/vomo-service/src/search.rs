use crate::{Error, MemoService, Result};
use vomo_domain::SearchResult;

impl MemoService {
	/// Semantic search over one user's memos.
	///
	/// The index decides relevance; the record store is authoritative for
	/// content. Every hit is re-read from the record store, and hits whose
	/// record is gone are dropped rather than surfaced half-hydrated.
	pub async fn search(
		&self,
		query: &str,
		user_id: &str,
		limit: u32,
	) -> Result<Vec<SearchResult>> {
		let user_id = crate::require_user_id(user_id)?;
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be blank.".to_string() });
		}
		if limit == 0 || limit > self.cfg.search.max_limit {
			return Err(Error::InvalidRequest {
				message: format!("limit must be within 1..={}.", self.cfg.search.max_limit),
			});
		}

		let vector = self
			.providers
			.vectorizer
			.embed(&self.cfg.providers.embedding, &self.cfg.retry, query)
			.await
			.map_err(|source| Error::Vectorization { source })?;
		let matches = self
			.index
			.query(&vector, user_id, limit)
			.await
			.map_err(|source| Error::Index { source })?;
		let mut results = Vec::with_capacity(matches.len());

		for hit in matches {
			let Some(memo) = self.records.get(user_id, &hit.id).await? else {
				tracing::warn!(user_id, memo_id = %hit.id, "Dropping dangling index entry.");

				continue;
			};

			results.push(SearchResult::new(memo, hit.score, hit.metadata));
		}

		tracing::info!(user_id, hits = results.len(), "Search completed.");

		Ok(results)
	}
}
