//! Line-oriented game loops on stdin/stdout.

use std::io::{self, BufRead, Write};

use lit_core::games::{AuthorQuizError, Crossword, Direction};
use lit_core::model::{QuizId, UserId};
use services::{AppServices, Clock};

use crate::commands::CmdResult;

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> io::Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    lines.next().transpose()
}

pub async fn author_quiz(app: &AppServices, user: u64) -> CmdResult {
    let clock = Clock::default();
    let mut rng = rand::rng();
    let mut round = app.games().author_round(&mut rng).await?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(question) = round.current().cloned() {
        let (position, total) = round.position();
        println!("\n[{position}/{total}] «{}»", question.quote);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option.name());
        }

        let seconds = round.seconds_left(clock.now());
        let Some(answer) = prompt(&mut lines, &format!("author # ({seconds}s): "))? else {
            println!("\nround abandoned");
            return Ok(());
        };
        let choice = answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.options.get(i));
        let answered_at = clock.now();
        if let Some(author) = choice {
            match round.select(author.id(), answered_at) {
                Ok(()) | Err(AuthorQuizError::Expired) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let outcome = round.submit(answered_at)?;
        if outcome.timed_out {
            println!("time is up, the author was {}", question.author.name());
        } else if outcome.correct {
            println!("correct!");
        } else {
            println!("no, it was {}", question.author.name());
        }
        round.advance(clock.now())?;
    }

    let summary = round.summary();
    println!(
        "\n{}/{} correct ({}%): {}",
        summary.correct,
        summary.total,
        summary.percentage,
        summary.feedback()
    );
    app.games()
        .finish_author_round(UserId::new(user), &round)
        .await?;
    Ok(())
}

pub async fn puzzle(app: &AppServices, user: u64, quote: Option<u64>) -> CmdResult {
    let mut rng = rand::rng();
    let mut puzzle = match quote {
        Some(id) => app.games().puzzle(id, &mut rng)?,
        None => app.games().random_puzzle(&mut rng)?,
    };
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("put the fragments back in order: `a b` swaps two slots, `h` asks for a hint");
    while puzzle.score().is_none() {
        println!();
        for (i, fragment) in puzzle.slots().iter().enumerate() {
            println!("  {}. {}", i + 1, fragment.text);
        }
        let Some(input) = prompt(&mut lines, "> ")? else {
            println!("\npuzzle abandoned");
            return Ok(());
        };
        let input = input.trim();
        if input.eq_ignore_ascii_case("h") {
            puzzle.hint(&mut rng);
            continue;
        }
        let positions: Vec<usize> = input
            .split_whitespace()
            .filter_map(|p| p.parse::<usize>().ok())
            .filter_map(|p| p.checked_sub(1))
            .collect();
        match positions.as_slice() {
            [a, b] => {
                if let Err(err) = puzzle.swap(*a, *b) {
                    println!("{err}");
                }
            }
            _ => println!("enter two slot numbers or `h`"),
        }
    }

    let text: Vec<&str> = puzzle.slots().iter().map(|f| f.text.as_str()).collect();
    println!(
        "\nsolved in {} moves with {} hints: {} points\n{}",
        puzzle.attempts(),
        puzzle.hints(),
        puzzle.score().unwrap_or_default(),
        text.join(" ")
    );
    app.games().finish_puzzle(UserId::new(user), &puzzle).await?;
    Ok(())
}

fn print_crossword(crossword: &Crossword) {
    for row in 0..crossword.rows() {
        let line: String = (0..crossword.cols())
            .map(|col| match (crossword.is_open(row, col), crossword.entry(row, col)) {
                (false, _) => " # ".to_owned(),
                (true, Some(letter)) => format!(" {letter} "),
                (true, None) => " . ".to_owned(),
            })
            .collect();
        println!("{row:>2} {line}");
    }
    for direction in [Direction::Across, Direction::Down] {
        println!("{direction}:");
        for clue in crossword.clues().iter().filter(|c| c.direction == direction) {
            let mark = if crossword.is_word_solved(clue) { " ✓" } else { "" };
            println!("  {}. {} ({}){mark}", clue.number, clue.clue, clue.len());
        }
    }
}

fn parse_direction(token: &str) -> Option<Direction> {
    match token {
        "a" | "across" => Some(Direction::Across),
        "d" | "down" => Some(Direction::Down),
        _ => None,
    }
}

pub async fn crossword(app: &AppServices, user: u64) -> CmdResult {
    let mut crossword = app.games().crossword()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("`3 a автор` fills 3 across, `r 2 5` reveals row 2 column 5 (0-based), `c` clears");
    while crossword.score().is_none() {
        println!();
        print_crossword(&crossword);
        let Some(input) = prompt(&mut lines, "> ")? else {
            println!("
crossword abandoned");
            return Ok(());
        };
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let outcome = match tokens.as_slice() {
            ["c"] => {
                crossword.clear();
                continue;
            }
            ["r", row, col] => match (row.parse(), col.parse()) {
                (Ok(row), Ok(col)) => crossword.reveal(row, col),
                _ => {
                    println!("row and column must be numbers");
                    continue;
                }
            },
            [number, direction, answer @ ..] if !answer.is_empty() => {
                match (number.parse(), parse_direction(direction)) {
                    (Ok(number), Some(direction)) => {
                        crossword.enter_word(number, direction, &answer.concat())
                    }
                    _ => {
                        println!("enter a clue number, `a` or `d`, then the word");
                        continue;
                    }
                }
            }
            _ => {
                println!("enter `<number> a|d <word>`, `r <row> <col>` or `c`");
                continue;
            }
        };
        if let Err(err) = outcome {
            println!("{err}");
        }
    }

    println!();
    print_crossword(&crossword);
    println!(
        "
solved with {} revealed cells: {} points",
        crossword.revealed(),
        crossword.score().unwrap_or_default()
    );
    app.games().finish_crossword(UserId::new(user), &crossword).await?;
    Ok(())
}

pub async fn record_quiz(app: &AppServices, user: u64, quiz: u64, score: u32) -> CmdResult {
    let result = app
        .results()
        .record_quiz(UserId::new(user), QuizId::new(quiz), score)
        .await?;
    println!(
        "saved {}: {}/{}",
        result.title.as_deref().unwrap_or("quiz"),
        result.score,
        result.max_score.unwrap_or(services::DEFAULT_QUIZ_MAX_SCORE)
    );
    Ok(())
}
