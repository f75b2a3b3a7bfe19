pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Provider returned HTTP {status}: {message}")]
	Status { status: u16, message: String },
}
impl Error {
	/// Rate-limit-class failures are the only retryable kind; everything else
	/// surfaces immediately.
	pub fn is_rate_limited(&self) -> bool {
		match self {
			Self::Status { status, .. } => matches!(status, 429 | 503 | 529),
			Self::Reqwest(err) => err
				.status()
				.map(|status| matches!(status.as_u16(), 429 | 503 | 529))
				.unwrap_or(false),
			_ => false,
		}
	}
}
