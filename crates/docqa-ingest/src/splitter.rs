//! Recursive character text splitter.
//!
//! Text is split on the first separator (in priority order) that occurs in it,
//! pieces shorter than `chunk_size` are greedily merged back together with up
//! to `chunk_overlap` characters carried into the next chunk, and pieces that
//! are still too long are split again with the remaining separators. Lengths
//! are counted in characters. Separators stay attached to the start of the
//! piece that follows them, and every emitted chunk is whitespace-trimmed.

use std::collections::VecDeque;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl RecursiveCharacterSplitter {
    /// `chunk_overlap` is capped below `chunk_size`, and `chunk_size` is at least 1.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, s) in separators.iter().enumerate() {
            if s.is_empty() {
                separator = "";
                break;
            }
            if text.contains(s.as_str()) {
                separator = s;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        for &piece in splits {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                if let Some(doc) = join_trimmed(&current) {
                    docs.push(doc);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(first) => total -= char_len(first),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        if let Some(doc) = join_trimmed(&current) {
            docs.push(doc);
        }
        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split at every occurrence of `separator`, keeping it at the start of the next piece.
/// An empty separator splits into single characters. Empty pieces are dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_stays_with_following_piece() {
        assert_eq!(split_keep_separator("a\n\nb\n\nc", "\n\n"), vec!["a", "\n\nb", "\n\nc"]);
        assert_eq!(split_keep_separator("\n\nlead", "\n\n"), vec!["\n\nlead"]);
        assert_eq!(split_keep_separator("héllo", ""), vec!["h", "é", "l", "l", "o"]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200);
        assert_eq!(splitter.split_text("  Short text\n"), vec!["Short text"]);
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn unbroken_text_splits_with_overlap() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200);
        let text = "a".repeat(2500);
        let chunks = splitter.split_text(&text);
        let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lens, vec![1000, 1000, 900]);
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200);
        let paragraphs = ["p".repeat(600), "q".repeat(600), "r".repeat(600)];
        let chunks = splitter.split_text(&paragraphs.join("\n\n"));
        assert_eq!(chunks, paragraphs.to_vec());
    }

    #[test]
    fn words_overlap_between_chunks() {
        let splitter = RecursiveCharacterSplitter::new(20, 8);
        let chunks = splitter.split_text("one two three four five six seven eight");
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 20, "{c:?} exceeds chunk size");
        }
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap_or_default();
            assert!(
                pair[1].starts_with(last_word),
                "{:?} should carry over from {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn overlap_is_capped_below_chunk_size() {
        let splitter = RecursiveCharacterSplitter::new(10, 50);
        assert_eq!(splitter.chunk_overlap(), 9);
        let chunks = splitter.split_text(&"x".repeat(30));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
