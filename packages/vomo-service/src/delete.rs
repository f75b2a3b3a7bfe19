use crate::{MemoService, Result};
use vomo_domain::MemoRecord;

impl MemoService {
	/// Deletes a memo from the record store, then purges its index entry.
	///
	/// Returns `None` without touching the index when the memo does not
	/// exist. An index-side delete failure is logged and swallowed; the
	/// dangling point is dropped during search hydration.
	pub async fn delete_memo(&self, user_id: &str, memo_id: &str) -> Result<Option<MemoRecord>> {
		let user_id = crate::require_user_id(user_id)?;
		let Some(memo) = self.records.delete(user_id, memo_id).await? else {
			return Ok(None);
		};

		if let Err(err) = self.index.delete(memo_id).await {
			tracing::warn!(user_id, memo_id, error = %err, "Failed to purge index entry.");
		}

		tracing::info!(user_id, memo_id, "Memo deleted.");

		Ok(Some(memo))
	}
}
