mod commands;
mod play;
mod sqlite_url;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lit_core::model::Category;
use services::{AppServices, Clock, LitConfig};
use tracing_subscriber::EnvFilter;

use crate::commands::{CmdResult, Move, Viewport};

#[derive(Parser)]
#[command(name = "lit", about = "Ukrainian literature library and reader")]
struct Cli {
    /// SQLite database URL (overrides config and LIT_DB_URL)
    #[arg(long, global = true)]
    db: Option<String>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the built-in catalog (idempotent)
    Seed,

    /// List works
    Library {
        /// zno, modern or classic
        #[arg(long)]
        category: Option<Category>,
    },

    /// Show one work with its quizzes
    Work { id: u64 },

    /// Open a work in the reader
    Read(ReadArgs),

    /// Reading progress of a user
    Progress { user: u64 },

    /// Curriculum works read by a user
    Stats { user: u64 },

    /// Quiz and game results of a user
    Results { user: u64 },

    /// Save a catalog quiz score
    Quiz { user: u64, quiz: u64, score: u32 },

    /// Play "guess the author"
    AuthorQuiz { user: u64 },

    /// Play the quote puzzle
    Puzzle {
        user: u64,
        #[arg(long)]
        quote: Option<u64>,
    },

    /// Solve the literary crossword
    Crossword { user: u64 },

    /// Ask for reading recommendations
    Recommend {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Summarize a piece of text
    Analyze {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[derive(Args)]
struct ReadArgs {
    user: u64,
    work: u64,

    #[arg(long, conflicts_with_all = ["next", "prev"])]
    page: Option<u32>,

    #[arg(long, conflicts_with = "prev")]
    next: bool,

    #[arg(long)]
    prev: bool,

    #[arg(long)]
    font_size: Option<f32>,

    #[arg(long)]
    line_height: Option<f32>,

    #[arg(long, default_value_t = 720.0)]
    width: f32,

    #[arg(long, default_value_t = 900.0)]
    height: f32,
}

impl ReadArgs {
    fn step(&self) -> Move {
        match (self.page, self.next, self.prev) {
            (Some(page), _, _) => Move::To(page),
            (None, true, _) => Move::Next,
            (None, false, true) => Move::Previous,
            (None, false, false) => Move::Stay,
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            font_size: self.font_size,
            line_height: self.line_height,
            width: self.width,
            height: self.height,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<LitConfig, Box<dyn std::error::Error>> {
    let mut config = LitConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database_url.clone_from(db);
    }
    config.database_url = sqlite_url::normalize(&config.database_url);
    sqlite_url::prepare_file(&config.database_url)?;
    Ok(config)
}

async fn run(cli: Cli) -> CmdResult {
    let config = load_config(&cli)?;
    let app = AppServices::new_sqlite(&config, Clock::default()).await?;

    match cli.command {
        Command::Seed => commands::seed(&app).await,
        Command::Library { category } => commands::library(&app, category).await,
        Command::Work { id } => commands::work(&app, id).await,
        Command::Read(args) => {
            commands::read(&app, args.user, args.work, args.step(), args.viewport()).await
        }
        Command::Progress { user } => commands::progress(&app, user).await,
        Command::Stats { user } => commands::stats(&app, user).await,
        Command::Results { user } => commands::results(&app, user).await,
        Command::Quiz { user, quiz, score } => play::record_quiz(&app, user, quiz, score).await,
        Command::AuthorQuiz { user } => play::author_quiz(&app, user).await,
        Command::Puzzle { user, quote } => play::puzzle(&app, user, quote).await,
        Command::Crossword { user } => play::crossword(&app, user).await,
        Command::Recommend { query } => commands::recommend(&app, &query.join(" ")).await,
        Command::Analyze { text } => commands::analyze(&app, &text.join(" ")).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_flags_pick_one_move() {
        let cli = Cli::try_parse_from(["lit", "read", "1", "2", "--next"]).unwrap();
        let Command::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.step(), Move::Next);

        let cli = Cli::try_parse_from(["lit", "read", "1", "2", "--page", "4"]).unwrap();
        let Command::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.step(), Move::To(4));

        assert!(Cli::try_parse_from(["lit", "read", "1", "2", "--page", "4", "--prev"]).is_err());
    }

    #[test]
    fn category_is_parsed_from_its_name() {
        let cli = Cli::try_parse_from(["lit", "--db", "sqlite::memory:", "library", "--category", "ZNO"])
            .unwrap();
        assert_eq!(cli.db.as_deref(), Some("sqlite::memory:"));
        assert!(matches!(
            cli.command,
            Command::Library {
                category: Some(Category::Zno)
            }
        ));
        assert!(Cli::try_parse_from(["lit", "library", "--category", "poetry"]).is_err());
    }
}
