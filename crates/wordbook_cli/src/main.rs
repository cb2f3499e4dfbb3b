//! Command-line front end for the Wordbook dictionary.
//!
//! # Responsibility
//! - Resolve configuration from file, environment and flags.
//! - Map subcommands onto core use-case services.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use wordbook_core::db::open_db;
use wordbook_core::{
    init_logging, DeckOptions, FlashcardService, NewWord, PartOfSpeech, SqliteWordRepository,
    Word, WordFilter, WordId, WordPatch, WordService, WordSort, WordbookConfig,
};

#[derive(Debug, Parser)]
#[command(name = "wordbook", version, about = "Vocabulary dictionary and flashcards")]
struct Cli {
    /// JSON config file.
    #[arg(long, env = "WORDBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Dictionary database file; overrides the config value.
    #[arg(long, env = "WORDBOOK_DB")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error; overrides the config value.
    #[arg(long, env = "WORDBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "WORDBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a word.
    Add(AddArgs),
    /// Show one word in full.
    Show { id: WordId },
    /// Change fields of an existing word.
    Edit(EditArgs),
    /// Browse the dictionary.
    List(ListArgs),
    /// Delete a word.
    Delete { id: WordId },
    /// Study with shuffled flashcards.
    Quiz(QuizArgs),
    /// Count words per part of speech.
    Stats,
}

#[derive(Debug, Args)]
struct AddArgs {
    text: String,
    /// Translation; repeat for several.
    #[arg(short, long = "translation", required = true)]
    translations: Vec<String>,
    /// Example sentence; repeat for several.
    #[arg(short, long = "example")]
    examples: Vec<String>,
    /// Part of speech, e.g. noun, verb, adj.
    #[arg(short, long, default_value = "other")]
    pos: PartOfSpeech,
    #[arg(short, long)]
    notes: Option<String>,
}

#[derive(Debug, Args)]
struct EditArgs {
    id: WordId,
    #[arg(long)]
    text: Option<String>,
    /// Replaces all translations.
    #[arg(short, long = "translation")]
    translations: Vec<String>,
    /// Replaces all examples.
    #[arg(short, long = "example", conflicts_with = "clear_examples")]
    examples: Vec<String>,
    #[arg(long)]
    clear_examples: bool,
    #[arg(short, long)]
    pos: Option<PartOfSpeech>,
    #[arg(short, long, conflicts_with = "clear_notes")]
    notes: Option<String>,
    #[arg(long)]
    clear_notes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSort {
    Alpha,
    Newest,
}

impl From<CliSort> for WordSort {
    fn from(value: CliSort) -> Self {
        match value {
            CliSort::Alpha => WordSort::Alphabetical,
            CliSort::Newest => WordSort::Newest,
        }
    }
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Substring of headword, translations or notes.
    #[arg(short, long)]
    query: Option<String>,
    #[arg(short, long)]
    pos: Option<PartOfSpeech>,
}

impl FilterArgs {
    fn to_filter(&self) -> WordFilter {
        WordFilter {
            query: self.query.clone(),
            part_of_speech: self.pos,
            ..WordFilter::default()
        }
    }
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, value_enum, default_value = "alpha")]
    sort: CliSort,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

#[derive(Debug, Args)]
struct QuizArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Maximum number of cards.
    #[arg(short = 'n', long)]
    size: Option<usize>,
    /// Show translations first.
    #[arg(short, long)]
    reverse: bool,
    /// Fixed shuffle seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let words = WordService::new(SqliteWordRepository::try_from_connection(&conn)?);

    match cli.command {
        Command::Add(args) => {
            let word = words.add_word(NewWord {
                text: args.text,
                translations: args.translations,
                examples: args.examples,
                part_of_speech: args.pos,
                notes: args.notes,
            })?;
            info!("event=cli_add module=cli status=ok word_id={}", word.id);
            println!("Added {}", word.id);
        }
        Command::Show { id } => {
            let word = words
                .get_word(id)?
                .ok_or_else(|| anyhow!("word not found: {id}"))?;
            print_word_detail(&word);
        }
        Command::Edit(args) => {
            let word = words.edit_word(args.id, edit_patch(args))?;
            println!("Updated {}", word.id);
        }
        Command::List(args) => {
            let filter = WordFilter {
                sort: args.sort.into(),
                limit: args.limit,
                offset: args.offset,
                ..args.filter.to_filter()
            };
            let page = words.browse(&filter)?;
            for word in &page.words {
                println!(
                    "{}  {} ({}) - {}",
                    word.id,
                    word.text,
                    word.part_of_speech,
                    word.translations_display()
                );
            }
            println!("{} of {} word(s) shown", page.words.len(), page.total);
        }
        Command::Delete { id } => {
            words.delete_word(id)?;
            println!("Deleted {id}");
        }
        Command::Quiz(args) => {
            let cards = FlashcardService::new(SqliteWordRepository::try_from_connection(&conn)?);
            let options = DeckOptions {
                filter: args.filter.to_filter(),
                reversed: args.reverse,
                size: args.size,
            };
            let deck = match args.seed {
                Some(seed) => cards.build_deck_seeded(&options, seed)?,
                None => cards.build_deck(&options)?,
            };
            run_quiz(deck)?;
        }
        Command::Stats => {
            let counts = words.part_of_speech_counts()?;
            let total: u64 = counts.iter().map(|(_, count)| count).sum();
            for (part_of_speech, count) in counts {
                println!("{part_of_speech:<14}{count}");
            }
            println!("{:<14}{total}", "total");
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<WordbookConfig> {
    let mut config = match &cli.config {
        Some(path) => WordbookConfig::load(path)?,
        None => WordbookConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn edit_patch(args: EditArgs) -> WordPatch {
    let examples = if args.clear_examples {
        Some(Vec::new())
    } else if args.examples.is_empty() {
        None
    } else {
        Some(args.examples)
    };
    let notes = if args.clear_notes {
        Some(None)
    } else {
        args.notes.map(Some)
    };

    WordPatch {
        text: args.text,
        translations: (!args.translations.is_empty()).then_some(args.translations),
        examples,
        part_of_speech: args.pos,
        notes,
    }
}

fn print_word_detail(word: &Word) {
    println!("{} ({})", word.text, word.part_of_speech);
    println!("  id: {}", word.id);
    for translation in &word.translations {
        println!("  = {translation}");
    }
    for example in &word.examples {
        println!("  e.g. {example}");
    }
    if let Some(notes) = &word.notes {
        println!("  notes: {notes}");
    }
}

fn run_quiz(deck: wordbook_core::Deck) -> Result<()> {
    if deck.is_empty() {
        println!("No words match; nothing to study.");
        return Ok(());
    }

    let total = deck.total();
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    let mut known = 0usize;

    for (index, card) in deck.enumerate() {
        print!("[{}/{}] {} ({}) ", index + 1, total, card.front, card.part_of_speech);
        stdout.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        println!("  -> {}", card.back);
        for example in &card.examples {
            println!("     {example}");
        }
        print!("  knew it? [y/N] ");
        stdout.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().eq_ignore_ascii_case("y") {
            known += 1;
        }
    }

    println!("Known {known} of {total}.");
    info!("event=quiz_done module=cli status=ok cards={total} known={known}");
    Ok(())
}
