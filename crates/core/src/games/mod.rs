//! Word games played against the catalog.

pub mod author_quiz;
pub mod crossword;
pub mod quote_puzzle;

pub use author_quiz::{
    AnswerOutcome, AuthorQuestion, AuthorQuiz, AuthorQuizError, RoundSummary, build_questions,
    sample_round,
};
pub use crossword::{Crossword, CrosswordClue, CrosswordError, Direction, LITERARY_CROSSWORD};
pub use quote_puzzle::{Fragment, PuzzleError, QuotePuzzle, fragments};

use serde::Serialize;

use crate::model::Difficulty;

/// A quote offered by the puzzle game, independent of catalog works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PuzzleQuote {
    pub id: u64,
    pub text: &'static str,
    pub author: &'static str,
    pub source: &'static str,
    pub difficulty: Difficulty,
}

pub const PUZZLE_QUOTES: &[PuzzleQuote] = &[
    PuzzleQuote {
        id: 1,
        text: "Якби ви вчились так, як треба, то й мудрість би була своя.",
        author: "Тарас Шевченко",
        source: "І мертвим, і живим, і ненародженим...",
        difficulty: Difficulty::Easy,
    },
    PuzzleQuote {
        id: 2,
        text: "Contra spem spero! Без надії сподіваюсь!",
        author: "Леся Українка",
        source: "Contra spem spero",
        difficulty: Difficulty::Easy,
    },
    PuzzleQuote {
        id: 3,
        text: "Страшні слова, коли вони мовчать, коли вони зненацька причаїлись, коли не знаєш, з чого їх почать...",
        author: "Ліна Костенко",
        source: "Страшні слова, коли вони мовчать",
        difficulty: Difficulty::Medium,
    },
    PuzzleQuote {
        id: 4,
        text: "Книги - морська глибина: хто в них пірне аж до дна, той, хоч і труду мав досить, дивнії перли виносить.",
        author: "Іван Франко",
        source: "Ой ти, дівчино, з горіха зерня",
        difficulty: Difficulty::Hard,
    },
    PuzzleQuote {
        id: 5,
        text: "Борітеся - поборете, Вам Бог помагає! За вас правда, за вас слава І воля святая!",
        author: "Тарас Шевченко",
        source: "Кавказ",
        difficulty: Difficulty::Medium,
    },
    PuzzleQuote {
        id: 6,
        text: "Можна все на світі вибирати, сину, вибрати не можна тільки Батьківщину.",
        author: "Василь Симоненко",
        source: "Лебеді материнства",
        difficulty: Difficulty::Easy,
    },
    PuzzleQuote {
        id: 7,
        text: "Не бійтесь заглядати у словник: Це пишний яр, а не сумне провалля.",
        author: "Максим Рильський",
        source: "Мова",
        difficulty: Difficulty::Easy,
    },
];

/// Puzzle quote by id.
#[must_use]
pub fn puzzle_quote(id: u64) -> Option<&'static PuzzleQuote> {
    PUZZLE_QUOTES.iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_puzzle_quote_has_several_fragments() {
        for quote in PUZZLE_QUOTES {
            assert!(fragments(quote.text).len() >= 2, "quote {}", quote.id);
        }
        assert_eq!(puzzle_quote(6).map(|q| q.author), Some("Василь Симоненко"));
        assert!(puzzle_quote(99).is_none());
    }
}
