use std::fmt;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::scoring::crossword_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Across => "across",
            Direction::Down => "down",
        })
    }
}

/// One answer placed on the grid, starting at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrosswordClue {
    pub number: u8,
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
    pub answer: &'static str,
    pub clue: &'static str,
}

impl CrosswordClue {
    #[must_use]
    pub fn len(&self) -> usize {
        self.answer.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }

    /// Grid position of every letter, in reading order.
    fn cells(&self) -> impl Iterator<Item = ((usize, usize), char)> + '_ {
        self.answer.chars().enumerate().map(move |(i, c)| {
            let at = match self.direction {
                Direction::Across => (self.row, self.col + i),
                Direction::Down => (self.row + i, self.col),
            };
            (at, normalize(c))
        })
    }
}

pub const LITERARY_CROSSWORD: &[CrosswordClue] = &[
    CrosswordClue {
        number: 1,
        direction: Direction::Across,
        row: 0,
        col: 0,
        answer: "БАЛАДА",
        clue: "Ліро-епічний твір, часто фантастичного змісту",
    },
    CrosswordClue {
        number: 1,
        direction: Direction::Down,
        row: 0,
        col: 0,
        answer: "БАЙКА",
        clue: "Алегоричний твір повчального характеру",
    },
    CrosswordClue {
        number: 2,
        direction: Direction::Down,
        row: 0,
        col: 4,
        answer: "ДРАМА",
        clue: "Літературний твір, призначений для театру",
    },
    CrosswordClue {
        number: 3,
        direction: Direction::Across,
        row: 2,
        col: 4,
        answer: "АВТОР",
        clue: "Творець художнього твору",
    },
    CrosswordClue {
        number: 4,
        direction: Direction::Down,
        row: 2,
        col: 8,
        answer: "РОМАН",
        clue: "Великий епічний твір",
    },
    CrosswordClue {
        number: 5,
        direction: Direction::Across,
        row: 4,
        col: 5,
        answer: "ПОЕМА",
        clue: "Великий віршований твір",
    },
    CrosswordClue {
        number: 6,
        direction: Direction::Down,
        row: 4,
        col: 6,
        answer: "ОБРАЗ",
        clue: "Художнє відображення людини в літературі",
    },
    CrosswordClue {
        number: 7,
        direction: Direction::Across,
        row: 8,
        col: 4,
        answer: "КАЗКА",
        clue: "Розповідний народнопоетичний твір",
    },
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CrosswordError {
    #[error("crossword has no words")]
    Empty,

    #[error("clue {0} has an empty answer")]
    EmptyAnswer(u8),

    #[error("answers disagree at row {row}, column {col}")]
    Conflict { row: usize, col: usize },

    #[error("row {row}, column {col} is not part of any word")]
    Blocked { row: usize, col: usize },

    #[error("no {direction} clue numbered {number}")]
    UnknownClue { number: u8, direction: Direction },

    #[error("clue {number} needs {expected} letters, got {got}")]
    WrongLength {
        number: u8,
        expected: usize,
        got: usize,
    },
}

fn normalize(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// A crossword being filled in. Cells are stored row-major; `None` in the
/// solution marks a blocked cell.
#[derive(Debug, Clone, Serialize)]
pub struct Crossword {
    clues: &'static [CrosswordClue],
    rows: usize,
    cols: usize,
    solution: Vec<Option<char>>,
    entries: Vec<Option<char>>,
    revealed: u32,
    score: Option<u32>,
}

impl Crossword {
    /// Lay the answers out on a grid just large enough to hold them.
    ///
    /// # Errors
    ///
    /// Returns `CrosswordError::Empty` without clues, `EmptyAnswer` for a
    /// blank answer and `Conflict` when two answers cross on different
    /// letters.
    pub fn new(clues: &'static [CrosswordClue]) -> Result<Self, CrosswordError> {
        if clues.is_empty() {
            return Err(CrosswordError::Empty);
        }
        if let Some(blank) = clues.iter().find(|c| c.is_empty()) {
            return Err(CrosswordError::EmptyAnswer(blank.number));
        }

        let (mut rows, mut cols) = (0, 0);
        for ((row, col), _) in clues.iter().flat_map(CrosswordClue::cells) {
            rows = rows.max(row + 1);
            cols = cols.max(col + 1);
        }

        let mut solution = vec![None; rows * cols];
        for ((row, col), letter) in clues.iter().flat_map(CrosswordClue::cells) {
            let cell = &mut solution[row * cols + col];
            match *cell {
                Some(existing) if existing != letter => {
                    return Err(CrosswordError::Conflict { row, col });
                }
                _ => *cell = Some(letter),
            }
        }

        Ok(Self {
            clues,
            rows,
            cols,
            entries: vec![None; rows * cols],
            solution,
            revealed: 0,
            score: None,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn clues(&self) -> &'static [CrosswordClue] {
        self.clues
    }

    #[must_use]
    pub fn clue(&self, number: u8, direction: Direction) -> Option<&'static CrosswordClue> {
        self.clues
            .iter()
            .find(|c| c.number == number && c.direction == direction)
    }

    /// Clue number printed in the cell where a word starts.
    #[must_use]
    pub fn number_at(&self, row: usize, col: usize) -> Option<u8> {
        self.clues
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(|c| c.number)
    }

    #[must_use]
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some()
    }

    /// Letter the player put in a cell.
    #[must_use]
    pub fn entry(&self, row: usize, col: usize) -> Option<char> {
        self.index(row, col).and_then(|i| self.entries[i])
    }

    #[must_use]
    pub fn revealed(&self) -> u32 {
        self.revealed
    }

    /// Final score, set once every word is correct.
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries == self.solution
    }

    #[must_use]
    pub fn is_word_solved(&self, clue: &CrosswordClue) -> bool {
        clue.cells()
            .all(|((row, col), letter)| self.entry(row, col) == Some(letter))
    }

    #[must_use]
    pub fn solved_clues(&self) -> Vec<&'static CrosswordClue> {
        self.clues.iter().filter(|c| self.is_word_solved(c)).collect()
    }

    /// Put the last character of `input` into a cell, upper-cased. Blank
    /// input clears the cell. Changes after completion are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CrosswordError::Blocked` for a cell outside every word.
    pub fn fill(&mut self, row: usize, col: usize, input: &str) -> Result<Option<u32>, CrosswordError> {
        let i = self.index(row, col).ok_or(CrosswordError::Blocked { row, col })?;
        if self.score.is_none() {
            self.entries[i] = input.trim().chars().last().map(normalize);
        }
        Ok(self.finalize_if_complete())
    }

    /// Type a whole answer into the cells of one clue.
    ///
    /// # Errors
    ///
    /// Returns `CrosswordError::UnknownClue` or `WrongLength`.
    pub fn enter_word(
        &mut self,
        number: u8,
        direction: Direction,
        answer: &str,
    ) -> Result<Option<u32>, CrosswordError> {
        let clue = self
            .clue(number, direction)
            .ok_or(CrosswordError::UnknownClue { number, direction })?;
        let letters: Vec<char> = answer.chars().filter(|c| !c.is_whitespace()).collect();
        if letters.len() != clue.len() {
            return Err(CrosswordError::WrongLength {
                number,
                expected: clue.len(),
                got: letters.len(),
            });
        }
        if self.score.is_none() {
            for (((row, col), _), letter) in clue.cells().zip(letters) {
                let i = row * self.cols + col;
                self.entries[i] = Some(normalize(letter));
            }
        }
        Ok(self.finalize_if_complete())
    }

    /// Show the right letter in one cell. A cell that already holds it costs
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `CrosswordError::Blocked` for a cell outside every word.
    pub fn reveal(&mut self, row: usize, col: usize) -> Result<Option<u32>, CrosswordError> {
        let i = self.index(row, col).ok_or(CrosswordError::Blocked { row, col })?;
        if self.score.is_none() && self.entries[i] != self.solution[i] {
            self.entries[i] = self.solution[i];
            self.revealed += 1;
        }
        Ok(self.finalize_if_complete())
    }

    /// Start over with an empty grid.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.revealed = 0;
        self.score = None;
    }

    /// Metadata stored with the game result.
    #[must_use]
    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "words": self.clues.len(),
            "revealed_cells": self.revealed,
        })
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let i = row * self.cols + col;
        self.solution[i].map(|_| i)
    }

    fn finalize_if_complete(&mut self) -> Option<u32> {
        if self.score.is_none() && self.is_complete() {
            self.score = Some(crossword_score(self.revealed));
        }
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literary() -> Crossword {
        Crossword::new(LITERARY_CROSSWORD).unwrap()
    }

    fn enter_all_but(crossword: &mut Crossword, skip: Option<(u8, Direction)>) {
        for clue in LITERARY_CROSSWORD {
            if skip == Some((clue.number, clue.direction)) {
                continue;
            }
            crossword
                .enter_word(clue.number, clue.direction, clue.answer)
                .unwrap();
        }
    }

    #[test]
    fn literary_grid_lays_out_every_word() {
        let crossword = literary();
        assert_eq!((crossword.rows(), crossword.cols()), (9, 10));
        assert_eq!(crossword.number_at(0, 0), Some(1));
        assert_eq!(crossword.number_at(8, 4), Some(7));
        assert!(crossword.is_open(4, 9));
        assert!(!crossword.is_open(1, 1));
        assert!(!crossword.is_open(20, 0));
        assert!(crossword.solved_clues().is_empty());
    }

    #[test]
    fn crossing_on_different_letters_is_rejected() {
        const CLASH: &[CrosswordClue] = &[
            CrosswordClue {
                number: 1,
                direction: Direction::Across,
                row: 0,
                col: 0,
                answer: "БАЛАДА",
                clue: "",
            },
            CrosswordClue {
                number: 2,
                direction: Direction::Down,
                row: 0,
                col: 4,
                answer: "РОМАН",
                clue: "",
            },
        ];
        assert_eq!(
            Crossword::new(CLASH).unwrap_err(),
            CrosswordError::Conflict { row: 0, col: 4 }
        );
        assert_eq!(Crossword::new(&[]).unwrap_err(), CrosswordError::Empty);
    }

    #[test]
    fn typed_letters_are_upper_cased() {
        let mut crossword = literary();
        crossword.enter_word(1, Direction::Down, "байка").unwrap();
        crossword.fill(0, 1, "xа").unwrap();

        assert_eq!(crossword.entry(0, 1), Some('А'));
        let solved: Vec<_> = crossword
            .solved_clues()
            .iter()
            .map(|c| (c.number, c.direction))
            .collect();
        assert_eq!(solved, [(1, Direction::Down)]);

        crossword.fill(0, 1, " ").unwrap();
        assert_eq!(crossword.entry(0, 1), None);
    }

    #[test]
    fn bad_moves_are_reported() {
        let mut crossword = literary();
        assert_eq!(
            crossword.fill(1, 1, "А").unwrap_err(),
            CrosswordError::Blocked { row: 1, col: 1 }
        );
        assert_eq!(
            crossword.enter_word(2, Direction::Across, "ДРАМА").unwrap_err(),
            CrosswordError::UnknownClue {
                number: 2,
                direction: Direction::Across
            }
        );
        assert_eq!(
            crossword.enter_word(7, Direction::Across, "КАЗОЧКА").unwrap_err(),
            CrosswordError::WrongLength {
                number: 7,
                expected: 5,
                got: 7
            }
        );
    }

    #[test]
    fn typing_every_answer_scores_full_marks() {
        let mut crossword = literary();
        enter_all_but(&mut crossword, Some((7, Direction::Across)));
        assert_eq!(crossword.score(), None);

        let score = crossword.enter_word(7, Direction::Across, "КАЗКА").unwrap();
        assert_eq!(score, Some(100));
        assert!(crossword.is_complete());

        crossword.fill(8, 4, "Б").unwrap();
        assert_eq!(crossword.entry(8, 4), Some('К'));
        assert_eq!(crossword.metadata()["words"], 8);
    }

    #[test]
    fn revealed_cells_cost_points() {
        let mut crossword = literary();
        enter_all_but(&mut crossword, Some((7, Direction::Across)));

        // The З is shared with ОБРАЗ and already correct.
        crossword.reveal(8, 6).unwrap();
        assert_eq!(crossword.revealed(), 0);

        for col in [4, 5, 7] {
            crossword.reveal(8, col).unwrap();
        }
        let score = crossword.reveal(8, 8).unwrap();
        assert_eq!(crossword.revealed(), 4);
        assert_eq!(score, Some(80));
    }

    #[test]
    fn clearing_starts_over() {
        let mut crossword = literary();
        crossword.reveal(0, 0).unwrap();
        enter_all_but(&mut crossword, None);
        assert_eq!(crossword.score(), Some(95));

        crossword.clear();
        assert_eq!(crossword.score(), None);
        assert_eq!(crossword.revealed(), 0);
        assert_eq!(crossword.entry(0, 0), None);
    }
}
