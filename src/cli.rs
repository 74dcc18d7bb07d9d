use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use memory_match::game::storage::default_data_dir;
use memory_match::{
    Difficulty, FileStore, LEADERBOARD_LIMIT, ScoreLedger, Settings, SettingsPatch, SettingsStore,
    Theme,
};

#[derive(Parser, Debug)]
#[command(name = "memory-match", version, about = "Inspect memory-match scores and settings")]
pub struct Cli {
    /// Directory holding settings.json and highScores.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// What log level to use. RUST_LOG overrides.
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the leaderboard for one difficulty, or all of them
    Scores {
        #[arg(value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
    },
    /// Clear the leaderboard for one difficulty, or all of them
    ResetScores {
        #[arg(value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
    },
    /// Show or change user settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    Set {
        #[arg(long, value_parser = parse_theme)]
        theme: Option<Theme>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
        #[arg(long)]
        auto_flip: Option<bool>,
        #[arg(long)]
        show_timer: Option<bool>,
    },
    Reset,
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    Difficulty::from_code(raw).ok_or_else(|| format!("unknown difficulty `{raw}` (easy, medium, hard, expert)"))
}

fn parse_theme(raw: &str) -> Result<Theme, String> {
    Theme::from_code(raw).ok_or_else(|| format!("unknown theme `{raw}` (auto, light, dark)"))
}

impl Cli {
    fn store(&self) -> Result<FileStore> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()
                .ok_or_else(|| anyhow!("no data directory: pass --data-dir or set HOME"))?,
        };
        if dir.exists() && !dir.is_dir() {
            return Err(anyhow!("{} is not a directory", dir.display()));
        }
        tracing::debug!(dir = %dir.display(), "using data directory");
        Ok(FileStore::new(dir))
    }

    pub fn run(self) -> Result<()> {
        let mut store = self.store().context("resolving data directory")?;
        match self.command {
            Command::Scores { difficulty } => {
                let ledger = ScoreLedger::load(&store);
                for difficulty in selected(difficulty) {
                    print_scores(&ledger, difficulty);
                }
            }
            Command::ResetScores { difficulty } => {
                let mut ledger = ScoreLedger::load(&store);
                ledger.reset(&mut store, difficulty);
                match difficulty {
                    Some(difficulty) => println!("Cleared {difficulty} scores."),
                    None => println!("Cleared all scores."),
                }
            }
            Command::Settings { action } => {
                let mut settings = SettingsStore::load(&store);
                match action.unwrap_or(SettingsAction::Show) {
                    SettingsAction::Show => {}
                    SettingsAction::Set {
                        theme,
                        sound,
                        volume,
                        auto_flip,
                        show_timer,
                    } => {
                        let patch = SettingsPatch {
                            theme,
                            sound_enabled: sound,
                            volume_percent: volume,
                            auto_flip,
                            show_timer,
                        };
                        if patch.is_empty() {
                            return Err(anyhow!("nothing to change, see `settings set --help`"));
                        }
                        settings.update(&mut store, &patch);
                    }
                    SettingsAction::Reset => settings.reset(&mut store),
                }
                print_settings(settings.get());
            }
        }
        Ok(())
    }
}

fn selected(difficulty: Option<Difficulty>) -> Vec<Difficulty> {
    match difficulty {
        Some(difficulty) => vec![difficulty],
        None => Difficulty::ALL.to_vec(),
    }
}

fn print_scores(ledger: &ScoreLedger, difficulty: Difficulty) {
    println!("{difficulty}");
    println!("{:>4}  {:>6}  {:>5}  {:>6}  {}", "#", "Score", "Moves", "Time", "Date");
    let entries = ledger.entries(difficulty);
    for rank in 0..LEADERBOARD_LIMIT {
        match entries.get(rank) {
            Some(entry) => println!(
                "{:>4}  {:>6}  {:>5}  {:>6}  {}",
                rank + 1,
                entry.score,
                entry.moves,
                entry.elapsed_formatted,
                entry.date_label()
            ),
            None if rank == 0 => println!("{:>4}  ---", 1),
            None => break,
        }
    }
    println!();
}

fn print_settings(settings: &Settings) {
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    println!("theme       {:?}", settings.theme);
    println!("sound       {}", on_off(settings.sound_enabled));
    println!("volume      {}%", settings.volume_percent);
    println!("auto flip   {}", on_off(settings.auto_flip));
    println!("show timer  {}", on_off(settings.show_timer));
}
