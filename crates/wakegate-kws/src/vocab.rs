use std::collections::{HashSet, VecDeque};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Vocabulary is empty")]
    Empty,

    #[error("Start and end vocabularies overlap: {0:?}")]
    Overlap(Vec<String>),
}

/// The two disjoint trigger vocabularies, loaded once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    start_words: HashSet<String>,
    end_words: HashSet<String>,
}

impl Vocabulary {
    pub fn new<I, J>(start_words: I, end_words: J) -> Result<Self, VocabError>
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        let start_words: HashSet<String> = start_words.into_iter().collect();
        let end_words: HashSet<String> = end_words.into_iter().collect();

        if start_words.is_empty() || end_words.is_empty() {
            return Err(VocabError::Empty);
        }

        let mut overlap: Vec<String> = start_words.intersection(&end_words).cloned().collect();
        if !overlap.is_empty() {
            overlap.sort();
            return Err(VocabError::Overlap(overlap));
        }

        Ok(Self {
            start_words,
            end_words,
        })
    }

    /// The vocabulary the deployed device ships with: Indonesian
    /// "mulai"/"selesai" plus the fragments the recognizer tends to produce
    /// for them.
    pub fn default_command_set() -> Self {
        let start = ["mulai", "mu", "mul", "lai"].map(String::from);
        let end = ["selesai", "sel", "se", "sai"].map(String::from);
        Self::new(start, end).expect("built-in vocabularies are disjoint")
    }

    pub fn is_start(&self, token: &str) -> bool {
        self.start_words.contains(token)
    }

    pub fn is_end(&self, token: &str) -> bool {
        self.end_words.contains(token)
    }

    /// Union of both vocabularies, sorted, for constraining the recognizer
    /// grammar.
    pub fn grammar(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .start_words
            .iter()
            .chain(self.end_words.iter())
            .cloned()
            .collect();
        words.sort();
        words
    }
}

/// Counts of window tokens found in each vocabulary. Duplicates count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowHits {
    pub start: usize,
    pub end: usize,
}

/// Bounded, ordered buffer of the most recently recognized tokens.
#[derive(Debug)]
pub struct TokenWindow {
    tokens: VecDeque<String>,
    capacity: usize,
}

impl TokenWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            tokens: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append the whitespace-split tokens of `text`, keep only the newest
    /// `capacity` entries, and score the surviving window.
    pub fn push_text(&mut self, text: &str, vocab: &Vocabulary) -> WindowHits {
        for word in text.split_whitespace() {
            self.tokens.push_back(word.to_string());
        }
        while self.tokens.len() > self.capacity {
            self.tokens.pop_front();
        }

        let mut hits = WindowHits::default();
        for token in &self.tokens {
            if vocab.is_start(token) {
                hits.start += 1;
            } else if vocab.is_end(token) {
                hits.end += 1;
            }
        }
        hits
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::default_command_set()
    }

    #[test]
    fn overlapping_vocabularies_are_rejected() {
        let err = Vocabulary::new(
            ["go", "start"].map(String::from),
            ["stop", "go"].map(String::from),
        )
        .unwrap_err();
        assert!(matches!(err, VocabError::Overlap(words) if words == vec!["go".to_string()]));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let err = Vocabulary::new([], ["stop".to_string()]).unwrap_err();
        assert!(matches!(err, VocabError::Empty));
    }

    #[test]
    fn grammar_is_the_sorted_union() {
        let g = vocab().grammar();
        assert_eq!(g.len(), 8);
        assert!(g.windows(2).all(|w| w[0] < w[1]));
        assert!(g.contains(&"mulai".to_string()));
        assert!(g.contains(&"selesai".to_string()));
    }

    #[test]
    fn window_never_exceeds_capacity_and_keeps_newest() {
        let mut window = TokenWindow::new(5);
        window.push_text("a b c d", &vocab());
        window.push_text("e f g", &vocab());
        assert_eq!(window.len(), 5);
        let tokens: Vec<&str> = window.tokens().collect();
        assert_eq!(tokens, vec!["c", "d", "e", "f", "g"]);
    }

    #[test]
    fn hits_count_duplicates() {
        let mut window = TokenWindow::new(5);
        let hits = window.push_text("mu mu lai tes", &vocab());
        assert_eq!(hits.start, 3);
        assert_eq!(hits.end, 0);
    }

    #[test]
    fn single_start_token_scores_one() {
        let mut window = TokenWindow::new(5);
        let hits = window.push_text("mulai tes", &vocab());
        assert_eq!(hits, WindowHits { start: 1, end: 0 });
    }

    #[test]
    fn old_tokens_stop_counting_once_evicted() {
        let mut window = TokenWindow::new(2);
        window.push_text("mulai mu", &vocab());
        let hits = window.push_text("tes tes", &vocab());
        assert_eq!(hits.start, 0);
    }
}
