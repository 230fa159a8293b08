use std::{
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use lazy_english::{
    core::{
        reset_local,
        wordlist::read_words,
    },
    Config,
    Pipeline,
    RunError,
};

#[derive(Parser)]
#[command(name = "lazy-english", about = "Turn a list of English words into Anki cards", version)]
struct Args {
    /// Configuration file (default: config.hjson in the app data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Forget the created model and deck and clear the word cache
    #[arg(long)]
    reset: bool,

    /// With --reset, also delete the decks this tool created, cards included
    #[arg(long, requires = "reset")]
    delete_decks: bool,

    /// Word list, one or more words per line (default: the configured word list)
    wordlist: Option<PathBuf>,
}

fn anki_online(pipeline: &Pipeline) -> bool {
    pipeline.client().wait_awake(Duration::from_secs(2), 3)
}

fn reset(config: Config, delete_decks: bool) -> Result<(), Box<dyn std::error::Error>> {
    if delete_decks {
        match Pipeline::from_config(config.clone()) {
            Ok(mut pipeline) => {
                if !anki_online(&pipeline) {
                    return Err("AnkiConnect is not reachable, is Anki running?".into());
                }
                pipeline.reset(true)?;
                return Ok(());
            }
            Err(e) => log::warn!("No decks deleted, the record of created decks is unreadable: {e}"),
        }
    }
    reset_local(&config)?;
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    if args.reset {
        return reset(config, args.delete_decks);
    }

    let wordlist = args.wordlist.unwrap_or_else(|| config.wordlist_path.clone());
    let mut pipeline = Pipeline::from_config(config)?;

    if !anki_online(&pipeline) {
        return Err("AnkiConnect is not reachable, is Anki running?".into());
    }

    let words = read_words(&wordlist)?;
    if words.is_empty() {
        log::info!("No words in {}", wordlist.display());
        return Ok(());
    }

    match pipeline.run(&words) {
        Ok(report) => {
            for failure in &report.failures {
                log::warn!("{}: {}", failure.word, failure.error);
            }
            if !report.failures.is_empty() {
                log::info!("Not added: {}", report.failed_words().join(", "));
            }
            log::info!(
                "Done: {} added to '{}', {} duplicates skipped, {} failed",
                report.added(),
                pipeline.config().deck_name,
                report.skipped(),
                report.failures.len()
            );
            Ok(())
        }
        Err(RunError::Submission { source, notes, failures }) => {
            log::error!(
                "Submitting {} notes failed ({} words had no definition)",
                notes.len(),
                failures.len()
            );
            Err(source.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
