use std::{future::Future, time::Duration};

use crate::Result;

/// Runs `op`, retrying rate-limit-class failures with exponential backoff up
/// to `retry.max_attempts` total attempts. Any other failure is returned on
/// the spot.
pub async fn with_backoff<T, F, Fut>(retry: &vomo_config::Retry, mut op: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let max_attempts = retry.max_attempts.max(1);
	let mut delay = Duration::from_millis(retry.base_delay_ms);
	let mut attempt = 1;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if err.is_rate_limited() && attempt < max_attempts => {
				tracing::warn!(attempt, error = %err, "Provider rate limited; backing off.");

				tokio::time::sleep(delay).await;

				delay = delay.saturating_mul(2);
				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicU32, Ordering};

	use super::*;
	use crate::Error;

	fn test_retry(max_attempts: u32) -> vomo_config::Retry {
		vomo_config::Retry { max_attempts, base_delay_ms: 1 }
	}

	fn rate_limited() -> Error {
		Error::Status { status: 429, message: "slow down".to_string() }
	}

	#[tokio::test]
	async fn retries_rate_limit_failures_until_success() {
		let calls = AtomicU32::new(0);
		let result = with_backoff(&test_retry(3), || {
			let attempt = calls.fetch_add(1, Ordering::SeqCst);

			async move { if attempt < 2 { Err(rate_limited()) } else { Ok(attempt) } }
		})
		.await;

		assert_eq!(result.expect("Expected third attempt to succeed."), 2);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn gives_up_after_max_attempts() {
		let calls = AtomicU32::new(0);
		let result: Result<()> = with_backoff(&test_retry(3), || {
			calls.fetch_add(1, Ordering::SeqCst);

			async { Err(rate_limited()) }
		})
		.await;

		assert!(matches!(result, Err(Error::Status { status: 429, .. })));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn does_not_retry_permanent_failures() {
		let calls = AtomicU32::new(0);
		let result: Result<()> = with_backoff(&test_retry(3), || {
			calls.fetch_add(1, Ordering::SeqCst);

			async { Err(Error::Status { status: 400, message: "bad audio".to_string() }) }
		})
		.await;

		assert!(matches!(result, Err(Error::Status { status: 400, .. })));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
