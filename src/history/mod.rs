mod store;

pub use store::{JsonFileStore, TranscriptStore};
