//! Text chunking along sentence-like boundaries with overlap

use crate::error::{Error, Result};

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into overlapping chunks, preferring to cut at
/// the last `". "` sentence boundary inside each window.
#[derive(Debug, Clone)]
pub struct Chunker {
    /// Target chunk size in characters
    chunk_chars: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl Chunker {
    /// Create a new chunker. Fails when `chunk_chars <= overlap`: the
    /// cursor would stop making forward progress.
    pub fn new(chunk_chars: usize, overlap: usize) -> Result<Self> {
        if chunk_chars <= overlap {
            return Err(Error::Config(format!(
                "chunk_chars ({}) must be greater than overlap ({})",
                chunk_chars, overlap
            )));
        }
        Ok(Self {
            chunk_chars,
            overlap,
        })
    }

    /// Create from a validated chunking config
    pub fn from_config(config: &crate::config::ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_chars, config.overlap)
    }

    /// Split `text` into chunks in document order.
    ///
    /// The text is whitespace-normalized first. A cursor walks left to
    /// right; each step takes a window of up to `chunk_chars` bytes, cuts
    /// at the last `". "` inside the window (hard cut when none exists),
    /// then advances to `max(cut - overlap, cursor + chunk_chars - overlap)`
    /// so consecutive chunks share up to `overlap` bytes of context.
    ///
    /// Window ends shrink and the cursor bumps forward to the nearest
    /// `char` boundary; the `". "` pattern is ASCII, so a found cut point
    /// is always a valid boundary.
    pub fn split(&self, text: &str) -> Vec<String> {
        let text = normalize_whitespace(text);
        let len = text.len();
        let mut chunks = Vec::new();
        let mut i = 0usize;

        while i < len {
            let mut j = (i + self.chunk_chars).min(len);
            while !text.is_char_boundary(j) {
                j -= 1;
            }

            let k = match text[i..j].rfind(". ") {
                Some(pos) => i + pos,
                None => j,
            };

            let piece = text[i..k].trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }

            let mut next = k
                .saturating_sub(self.overlap)
                .max(i + self.chunk_chars - self.overlap);
            while next < len && !text.is_char_boundary(next) {
                next += 1;
            }
            i = next;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_runs() {
        assert_eq!(
            normalize_whitespace("  a\tb\n\n c   d  "),
            "a b c d".to_string()
        );
        assert_eq!(normalize_whitespace("   \n\t "), "");
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(matches!(Chunker::new(100, 100), Err(Error::Config(_))));
        assert!(matches!(Chunker::new(50, 100), Err(Error::Config(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn empty_and_blank_input_yield_no_chunks() {
        let chunker = Chunker::new(900, 150).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\t  ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = Chunker::new(900, 150).unwrap();
        assert_eq!(chunker.split("hello world"), vec!["hello world"]);
    }

    // Scenario pinned by the retrieval round-trip contract: "A. B. C."
    // with chunk_chars=5, overlap=2 cuts at each sentence boundary,
    // excluding the boundary period from the emitted chunk.
    #[test]
    fn sentence_boundary_round_trip_case() {
        let chunker = Chunker::new(5, 2).unwrap();
        assert_eq!(chunker.split("A. B. C."), vec!["A", "B", "C."]);
        // Deterministic on repeat
        assert_eq!(chunker.split("A. B. C."), vec!["A", "B", "C."]);
    }

    #[test]
    fn hard_cuts_when_no_sentence_boundary_exists() {
        let chunker = Chunker::new(4, 1).unwrap();
        let chunks = chunker.split(&"a".repeat(10));
        assert_eq!(chunks, vec!["aaaa", "aaaa", "aaaa", "a"]);
    }

    #[test]
    fn chunk_count_stays_within_termination_bound() {
        let chunker = Chunker::new(40, 10).unwrap();
        let text = "word ".repeat(500);
        let normalized = normalize_whitespace(&text);
        let chunks = chunker.split(&text);
        // At most ceil(L / (C - O)) cursor steps, so at most that many chunks
        let bound = normalized.len().div_ceil(40 - 10);
        assert!(!chunks.is_empty());
        assert!(chunks.len() <= bound, "{} > {}", chunks.len(), bound);
    }

    #[test]
    fn chunks_cover_every_sentence() {
        // Sentences shorter than the overlap, so every cut point lands
        // within `overlap` of its window end and no sentence can be
        // skipped between consecutive windows.
        let text: String = (0..60)
            .map(|n| format!("This is sentence number {:03}. ", n))
            .collect();

        let chunker = Chunker::new(200, 50).unwrap();
        let chunks = chunker.split(&text);
        assert!(chunks.len() > 1);

        let joined = chunks.join("\n");
        for n in 0..60 {
            let marker = format!("number {:03}", n);
            assert!(joined.contains(&marker), "sentence {} was dropped", n);
        }

        // Every chunk is a verbatim substring of the normalized input
        let normalized = normalize_whitespace(&text);
        for chunk in &chunks {
            assert!(normalized.contains(chunk.as_str()));
        }
    }

    #[test]
    fn determinism_across_invocations() {
        let chunker = Chunker::new(120, 30).unwrap();
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        assert_eq!(chunker.split(&text), chunker.split(&text));
    }

    #[test]
    fn hard_cut_chunks_share_exactly_overlap_bytes() {
        // Without sentence boundaries every window is a hard cut, so each
        // chunk starts exactly `overlap` bytes before the previous end.
        let text = "0123456789".repeat(4);
        let chunker = Chunker::new(10, 3).unwrap();
        let chunks = chunker.split(&text);
        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let tail = &pair[0][pair[0].len() - 3..];
            assert!(
                pair[1].starts_with(tail),
                "expected {:?} to start with {:?}",
                pair[1],
                tail
            );
        }
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let chunker = Chunker::new(10, 3).unwrap();
        let text = "é".repeat(50);
        let chunks = chunker.split(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().all(|c| c == 'é'));
        }
    }
}
