use std::fmt;

use serde::{Deserialize, Serialize};

/// Audio container formats accepted at the request boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
	Flac,
	M4a,
	Mp3,
	Mp4,
	Mpeg,
	Mpga,
	Oga,
	Ogg,
	Wav,
	Webm,
}
impl AudioFormat {
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"flac" => Some(Self::Flac),
			"m4a" => Some(Self::M4a),
			"mp3" => Some(Self::Mp3),
			"mp4" => Some(Self::Mp4),
			"mpeg" => Some(Self::Mpeg),
			"mpga" => Some(Self::Mpga),
			"oga" => Some(Self::Oga),
			"ogg" => Some(Self::Ogg),
			"wav" => Some(Self::Wav),
			"webm" => Some(Self::Webm),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Flac => "flac",
			Self::M4a => "m4a",
			Self::Mp3 => "mp3",
			Self::Mp4 => "mp4",
			Self::Mpeg => "mpeg",
			Self::Mpga => "mpga",
			Self::Oga => "oga",
			Self::Ogg => "ogg",
			Self::Wav => "wav",
			Self::Webm => "webm",
		}
	}

	pub fn mime_type(self) -> String {
		format!("audio/{}", self.as_str())
	}
}
impl fmt::Display for AudioFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
	#[error("Audio byte stream is empty.")]
	Empty,
	#[error("Unsupported audio format: {extension:?}.")]
	UnsupportedFormat { extension: String },
}

/// Raw audio bytes plus their container format.
///
/// The byte stream is guaranteed non-empty by construction; it is consumed
/// once by the memo pipeline and never persisted.
#[derive(Clone, Debug)]
pub struct AudioInput {
	bytes: Vec<u8>,
	format: AudioFormat,
}
impl AudioInput {
	pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Result<Self, AudioError> {
		if bytes.is_empty() {
			return Err(AudioError::Empty);
		}

		Ok(Self { bytes, format })
	}

	/// Builds an input from an uploaded file, taking the format from the
	/// filename extension.
	pub fn from_filename(bytes: Vec<u8>, filename: &str) -> Result<Self, AudioError> {
		let extension = filename
			.rsplit_once('.')
			.map(|(_, extension)| extension)
			.ok_or_else(|| AudioError::UnsupportedFormat { extension: filename.to_string() })?;
		let format = AudioFormat::from_extension(extension)
			.ok_or_else(|| AudioError::UnsupportedFormat { extension: extension.to_string() })?;

		Self::new(bytes, format)
	}

	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn format(&self) -> AudioFormat {
		self.format
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}
