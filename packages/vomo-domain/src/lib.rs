pub mod audio;
pub mod memo;
pub mod time_serde;

pub use audio::{AudioError, AudioFormat, AudioInput};
pub use memo::{Embedding, MemoRecord, SearchResult, Summary, memo_id};
