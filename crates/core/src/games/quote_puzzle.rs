use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::scoring::quote_puzzle_score;

const PUNCTUATION: [char; 6] = [',', ';', ':', '.', '!', '?'];
/// Pieces shorter than this are merged into the next one.
const MIN_PIECE_CHARS: usize = 10;
const MIN_PIECES: usize = 3;
const MAX_WORD_GROUPS: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PuzzleError {
    #[error("quote has no words")]
    EmptyQuote,

    #[error("position {0} is out of range")]
    OutOfRange(usize),
}

/// Split a quote into the fragments the player reorders.
///
/// Splits after `, ; : . ! ?` followed by a space and merges short pieces
/// forward. Quotes that yield fewer than three pieces are cut into even
/// word groups instead.
#[must_use]
pub fn fragments(text: &str) -> Vec<String> {
    let parts = split_keeping_delimiters(text);
    let mut pieces = Vec::new();
    let mut pending = String::new();

    for (i, part) in parts.iter().enumerate() {
        pending.push_str(part);
        let is_delimiter = is_delimiter(part);
        let is_last = i + 1 == parts.len();
        if is_delimiter || is_last {
            if pending.chars().count() < MIN_PIECE_CHARS && i + 2 < parts.len() {
                continue;
            }
            push_trimmed(&mut pieces, &pending);
            pending.clear();
        }
    }
    push_trimmed(&mut pieces, &pending);

    if pieces.len() >= MIN_PIECES {
        return pieces;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let size = words.len().div_ceil(words.len().min(MAX_WORD_GROUPS)).max(1);
    words.chunks(size).map(|chunk| chunk.join(" ")).collect()
}

/// Alternating text and delimiter parts; delimiters are a punctuation mark
/// plus one space.
fn split_keeping_delimiters(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if PUNCTUATION.contains(&c) && matches!(chars.peek(), Some((_, ' '))) {
            let end = i + c.len_utf8() + 1;
            parts.push(&text[start..i]);
            parts.push(&text[i..end]);
            chars.next();
            start = end;
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_delimiter(part: &str) -> bool {
    let mut chars = part.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(p), Some(' '), None) if PUNCTUATION.contains(&p)
    )
}

fn push_trimmed(pieces: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub text: String,
    pub original_index: usize,
}

/// A quote shuffled into fragments, solved by swapping them back in order.
#[derive(Debug, Clone, Serialize)]
pub struct QuotePuzzle {
    quote_id: u64,
    slots: Vec<Fragment>,
    attempts: u32,
    hints: u32,
    score: Option<u32>,
}

impl QuotePuzzle {
    /// # Errors
    ///
    /// Returns `PuzzleError::EmptyQuote` if the quote has no words.
    pub fn new<R: Rng + ?Sized>(quote_id: u64, text: &str, rng: &mut R) -> Result<Self, PuzzleError> {
        let mut slots: Vec<Fragment> = fragments(text)
            .into_iter()
            .enumerate()
            .map(|(original_index, text)| Fragment { text, original_index })
            .collect();
        if slots.is_empty() {
            return Err(PuzzleError::EmptyQuote);
        }
        slots.shuffle(rng);
        if slots.len() > 1 && slots.iter().enumerate().all(|(i, f)| f.original_index == i) {
            slots.swap(0, 1);
        }
        Ok(Self::from_slots(quote_id, slots))
    }

    fn from_slots(quote_id: u64, slots: Vec<Fragment>) -> Self {
        let mut puzzle = Self {
            quote_id,
            slots,
            attempts: 0,
            hints: 0,
            score: None,
        };
        puzzle.finalize_if_solved();
        puzzle
    }

    #[must_use]
    pub fn quote_id(&self) -> u64 {
        self.quote_id
    }

    #[must_use]
    pub fn slots(&self) -> &[Fragment] {
        &self.slots
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn hints(&self) -> u32 {
        self.hints
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.slots
            .iter()
            .enumerate()
            .all(|(i, f)| f.original_index == i)
    }

    /// Final score, set once every fragment is back in place.
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    #[must_use]
    pub fn is_correct_at(&self, position: usize) -> bool {
        self.slots
            .get(position)
            .is_some_and(|f| f.original_index == position)
    }

    /// Swap two slots. Swapping a slot with itself is a no-op and not an
    /// attempt; moves after the puzzle is solved are ignored.
    ///
    /// # Errors
    ///
    /// Returns `PuzzleError::OutOfRange` for a position past the end.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<Option<u32>, PuzzleError> {
        for pos in [a, b] {
            if pos >= self.slots.len() {
                return Err(PuzzleError::OutOfRange(pos));
            }
        }
        if self.score.is_some() || a == b {
            return Ok(self.score);
        }
        self.attempts += 1;
        self.slots.swap(a, b);
        Ok(self.finalize_if_solved())
    }

    /// Put one random misplaced fragment back where it belongs.
    pub fn hint<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        if self.score.is_some() {
            return self.score;
        }
        let misplaced: Vec<usize> = (0..self.slots.len())
            .filter(|&i| !self.is_correct_at(i))
            .collect();
        if let Some(&from) = misplaced.choose(rng) {
            self.hints += 1;
            let to = self.slots[from].original_index;
            self.slots.swap(from, to);
        }
        self.finalize_if_solved()
    }

    /// Metadata stored with the game result.
    #[must_use]
    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "quote_id": self.quote_id,
            "attempts": self.attempts,
            "hints_used": self.hints,
        })
    }

    fn finalize_if_solved(&mut self) -> Option<u32> {
        if self.score.is_none() && self.is_solved() {
            self.score = Some(quote_puzzle_score(self.attempts, self.hints));
        }
        self.score
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn splits_after_punctuation() {
        assert_eq!(
            fragments("Можна все на світі вибирати, сину, вибрати не можна тільки Батьківщину."),
            [
                "Можна все на світі вибирати,",
                "сину,",
                "вибрати не можна тільки Батьківщину.",
            ]
        );
    }

    #[test]
    fn long_quote_keeps_punctuation_pieces() {
        let text = "Страшні слова, коли вони мовчать, коли вони зненацька причаїлись, коли не знаєш, з чого їх почать...";
        assert_eq!(
            fragments(text),
            [
                "Страшні слова,",
                "коли вони мовчать,",
                "коли вони зненацька причаїлись,",
                "коли не знаєш,",
                "з чого їх почать...",
            ]
        );
    }

    #[test]
    fn short_leading_piece_joins_the_next() {
        let text = "Ну що б, здавалося, слова... Слова та голос, більш нічого.";
        assert_eq!(
            fragments(text),
            ["Ну що б, здавалося,", "слова... Слова та голос,", "більш нічого."]
        );
    }

    #[test]
    fn short_quote_falls_back_to_word_groups() {
        assert_eq!(
            fragments("Contra spem spero! Без надії сподіваюсь!"),
            ["Contra spem", "spero! Без", "надії сподіваюсь!"]
        );
        assert_eq!(fragments("one two"), ["one", "two"]);
        assert!(fragments("   ").is_empty());
    }

    fn ordered(n: usize) -> Vec<Fragment> {
        (0..n)
            .map(|i| Fragment { text: format!("f{i}"), original_index: i })
            .collect()
    }

    #[test]
    fn swaps_count_and_solve() {
        let mut slots = ordered(4);
        slots.swap(0, 3);
        slots.swap(1, 2);
        let mut puzzle = QuotePuzzle::from_slots(3, slots);
        assert!(!puzzle.is_solved());

        assert_eq!(puzzle.swap(1, 1), Ok(None));
        assert_eq!(puzzle.attempts(), 0);
        assert_eq!(puzzle.swap(0, 3), Ok(None));
        assert_eq!(puzzle.swap(1, 2), Ok(Some(90)));
        assert_eq!(puzzle.attempts(), 2);

        // Finalized puzzles ignore further moves.
        assert_eq!(puzzle.swap(0, 1), Ok(Some(90)));
        assert_eq!(puzzle.attempts(), 2);
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.swap(0, 9), Err(PuzzleError::OutOfRange(9)));
    }

    #[test]
    fn hints_place_misplaced_fragments() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut puzzle = QuotePuzzle::new(
            1,
            "Страшні слова, коли вони мовчать, коли вони зненацька причаїлись, коли не знаєш, з чого їх почать...",
            &mut rng,
        )
        .unwrap();
        assert_eq!(puzzle.slots().len(), 5);
        assert!(!puzzle.is_solved());

        let mut score = None;
        for _ in 0..5 {
            let placed_before = (0..5).filter(|&i| puzzle.is_correct_at(i)).count();
            score = puzzle.hint(&mut rng);
            let placed_after = (0..5).filter(|&i| puzzle.is_correct_at(i)).count();
            assert!(placed_after > placed_before || score.is_some());
            if score.is_some() {
                break;
            }
        }
        let hints = puzzle.hints();
        assert!((1..=4).contains(&hints));
        assert_eq!(score, Some(100 - 10 * hints));
        assert_eq!(puzzle.metadata()["hints_used"], hints);
    }

    #[test]
    fn new_puzzles_never_start_solved() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let puzzle = QuotePuzzle::new(1, "one two three", &mut rng).unwrap();
            assert!(!puzzle.is_solved());
            assert_eq!(puzzle.score(), None);
        }
        let single = QuotePuzzle::new(2, "word", &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(single.score(), Some(100));
        assert_eq!(
            QuotePuzzle::new(3, " ", &mut StdRng::seed_from_u64(0)).unwrap_err(),
            PuzzleError::EmptyQuote
        );
    }
}
