use time::OffsetDateTime;

use vomo_domain::{AudioError, AudioFormat, AudioInput, MemoRecord, SearchResult, Summary, memo_id};

#[test]
fn audio_format_parses_known_extensions() {
	for extension in ["flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm"] {
		let format = AudioFormat::from_extension(extension)
			.unwrap_or_else(|| panic!("Expected {extension} to be a supported format."));

		assert_eq!(format.as_str(), extension);
	}

	assert!(AudioFormat::from_extension("txt").is_none());
	assert!(AudioFormat::from_extension("WAV").is_some());
}

#[test]
fn empty_audio_is_rejected_at_construction() {
	let result = AudioInput::new(Vec::new(), AudioFormat::Wav);

	assert!(matches!(result, Err(AudioError::Empty)));
}

#[test]
fn audio_format_comes_from_filename_extension() {
	let input = AudioInput::from_filename(vec![1, 2, 3], "voice note.ogg")
		.expect("Expected a valid audio input.");

	assert_eq!(input.format(), AudioFormat::Ogg);
	assert_eq!(input.len(), 3);
}

#[test]
fn filename_without_extension_is_unsupported() {
	let result = AudioInput::from_filename(vec![1], "recording");

	assert!(matches!(result, Err(AudioError::UnsupportedFormat { .. })));
}

#[test]
fn summary_truncates_long_titles() {
	let title = "x".repeat(500);
	let summary = Summary::new("some transcript", title);

	assert_eq!(summary.title.chars().count(), 200);
}

#[test]
fn summary_trims_surrounding_whitespace() {
	let summary = Summary::new("text", "  Shopping reminder\n");

	assert_eq!(summary.title, "Shopping reminder");
}

#[test]
fn memo_ids_differ_per_user_and_content() {
	let now = OffsetDateTime::now_utc();
	let a = memo_id("u1", now, "buy milk");
	let b = memo_id("u2", now, "buy milk");
	let c = memo_id("u1", now, "buy bread");

	assert_ne!(a, b);
	assert_ne!(a, c);
	assert_eq!(a, memo_id("u1", now, "buy milk"));
}

#[test]
fn memo_id_is_a_valid_uuid() {
	let id = memo_id("u1", OffsetDateTime::now_utc(), "note");

	assert!(uuid::Uuid::parse_str(&id).is_ok());
}

#[test]
fn search_result_clamps_score_into_unit_range() {
	let memo = MemoRecord {
		id: "m1".to_string(),
		user_id: "u1".to_string(),
		text: "text".to_string(),
		title: "title".to_string(),
		date: OffsetDateTime::now_utc(),
		embedding: None,
	};
	let below = SearchResult::new(memo.clone(), -0.2, serde_json::Map::new());
	let above = SearchResult::new(memo, 1.7, serde_json::Map::new());

	assert_eq!(below.score, 0.0);
	assert_eq!(above.score, 1.0);
}

#[test]
fn memo_record_round_trips_with_rfc3339_date() {
	let memo = MemoRecord {
		id: "m1".to_string(),
		user_id: "u1".to_string(),
		text: "Remember to buy groceries tomorrow".to_string(),
		title: "Shopping reminder".to_string(),
		date: OffsetDateTime::from_unix_timestamp(1_738_424_400).expect("Valid timestamp."),
		embedding: Some(vec![0.1, 0.2]),
	};
	let json = serde_json::to_value(&memo).expect("Failed to serialize memo.");

	assert_eq!(json["date"], "2025-02-01T15:40:00Z");

	let parsed: MemoRecord = serde_json::from_value(json).expect("Failed to parse memo.");

	assert_eq!(parsed, memo);
}
