//! Transcript entries and chunking.

use serde::{Deserialize, Serialize};

/// Default advisory upper bound on chunk length, in characters.
pub const DEFAULT_CHUNK_MAX_LENGTH: usize = 1000;

/// One subtitle cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Caption text as delivered by the transcript source.
    pub text: String,
    /// Start offset in seconds.
    #[serde(default)]
    pub start: f64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Greedy, append-only transcript chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptChunker {
    max_length: usize,
}

impl Default for TranscriptChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_MAX_LENGTH)
    }
}

impl TranscriptChunker {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Split entries into chunks.
    ///
    /// Lengths are counted in characters of the trimmed entry text, and the
    /// separator is not counted. An entry longer than `max_length` is never
    /// split; it becomes a chunk of its own. Blank entries are skipped.
    pub fn chunk(&self, entries: &[TranscriptEntry]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0usize;

        for entry in entries {
            let text = entry.text.trim();
            if text.is_empty() {
                continue;
            }
            let len = text.chars().count();

            if current_len + len > self.max_length && !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
                current_len = 0;
            }

            current.push(text);
            current_len += len;
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}

/// Chunk a transcript with the given advisory maximum length.
pub fn chunk_transcript(entries: &[TranscriptEntry], max_length: usize) -> Vec<String> {
    TranscriptChunker::new(max_length).chunk(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<TranscriptEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TranscriptEntry::new(*t, i as f64, 1.0))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_transcript(&[], 1000).is_empty());
    }

    #[test]
    fn test_short_transcript_is_one_chunk() {
        let chunks = chunk_transcript(&entries(&["hello", " world ", "again"]), 1000);
        assert_eq!(chunks, vec!["hello world again"]);
    }

    #[test]
    fn test_flushes_when_limit_would_be_exceeded() {
        // 4 + 4 = 8 fits, + 4 = 12 > 10 flushes
        let chunks = chunk_transcript(&entries(&["aaaa", "bbbb", "cccc", "dddd"]), 10);
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn test_exact_limit_does_not_flush() {
        let chunks = chunk_transcript(&entries(&["aaaaa", "bbbbb", "c"]), 10);
        assert_eq!(chunks, vec!["aaaaa bbbbb", "c"]);
    }

    #[test]
    fn test_oversized_entry_becomes_its_own_chunk() {
        let long = "x".repeat(25);
        let chunks = chunk_transcript(&entries(&["ab", &long, "cd"]), 10);
        assert_eq!(chunks, vec!["ab".to_string(), long, "cd".to_string()]);
    }

    #[test]
    fn test_oversized_first_entry_is_not_split() {
        let long = "y".repeat(30);
        let chunks = chunk_transcript(&entries(&[&long]), 10);
        assert_eq!(chunks, vec![long]);
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let chunks = chunk_transcript(&entries(&["  ", "one", "\n", "two"]), 1000);
        assert_eq!(chunks, vec!["one two"]);
        assert!(chunk_transcript(&entries(&["", "   "]), 1000).is_empty());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // Each entry is 4 characters but 8 bytes.
        let chunks = chunk_transcript(&entries(&["ееее", "ёёёё"]), 8);
        assert_eq!(chunks, vec!["ееее ёёёё"]);
    }

    #[test]
    fn test_chunks_reproduce_input_text_in_order() {
        let texts: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let chunks = chunk_transcript(&entries(&refs), 50);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.join(" "), refs.join(" "));
    }

    #[test]
    fn test_chunk_count_is_deterministic() {
        let input = entries(&["alpha", "beta", "gamma", "delta", "epsilon"]);
        let first = chunk_transcript(&input, 12);
        let second = chunk_transcript(&input, 12);
        assert_eq!(first, second);
        assert_eq!(first, vec!["alpha beta", "gamma delta", "epsilon"]);
    }

    #[test]
    fn test_default_chunker_limit() {
        assert_eq!(TranscriptChunker::default().max_length(), DEFAULT_CHUNK_MAX_LENGTH);
    }

    #[test]
    fn test_entry_deserializes_without_timing() {
        let entry: TranscriptEntry = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(entry, TranscriptEntry::new("hi", 0.0, 0.0));
    }
}
