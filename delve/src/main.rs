//! Text-mode dungeon crawler.
//!
//! A thin blocking shell over `delve-core`: read a line, hand it to the
//! session, print the events it returns. All game logic lives in the
//! engine crate.
//!
//! ```bash
//! delve --class rogue --seed 42        # reproducible seeded run
//! delve --daily                        # today's challenge, same for everyone
//! delve --load run.json                # resume a saved run
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use delve_core::{Catalog, GameSession, MapMode, RunOutcome, SaveData, SessionConfig};

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "A text-mode dungeon crawler")]
#[command(version)]
struct Cli {
    /// Character name
    #[arg(long, default_value = "Adventurer")]
    name: String,

    /// Character class (warrior, rogue, cleric)
    #[arg(long, default_value = "Warrior")]
    class: String,

    /// Fixed seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Play today's challenge (date-derived seed, same for everyone)
    #[arg(long, conflicts_with = "seed")]
    daily: bool,

    /// Resume from a save file
    #[arg(long)]
    load: Option<PathBuf>,

    /// External content catalog (JSON) replacing the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Grow rooms one at a time instead of generating a full level up front
    #[arg(long)]
    frontier: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => Some(Catalog::load(path)?),
        None => None,
    };

    let (mut session, intro) = match &cli.load {
        Some(path) => match SaveData::load(path) {
            Ok(save) => {
                let session = GameSession::from_save(save, catalog)?;
                println!("Resumed from {}.", path.display());
                let banner = session_banner(&session);
                (session, banner)
            }
            Err(error) => {
                // A broken save is bad luck, not a crash.
                eprintln!("Could not load {} ({error}); starting fresh.", path.display());
                new_session(&cli, catalog)?
            }
        },
        None => new_session(&cli, catalog)?,
    };

    log::info!("session started with seed {}", session.seed());
    println!("(seed {}; type 'help' for commands)", session.seed());
    for event in intro {
        println!("{event}");
    }

    let stdin = std::io::stdin();
    let mut line = String::new();
    while !session.is_over() {
        print!("> ");
        std::io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        for event in session.handle_line(&line) {
            println!("{event}");
        }
    }

    match session.outcome() {
        Some(RunOutcome::Won) => println!("\nA winner is you. (seed {})", session.seed()),
        Some(RunOutcome::Died) => println!(
            "\nThe dungeon keeps what it takes. (seed {})",
            session.seed()
        ),
        Some(RunOutcome::Quit) | None => println!("\nUntil next time."),
    }
    Ok(())
}

fn new_session(
    cli: &Cli,
    catalog: Option<Catalog>,
) -> Result<(GameSession, Vec<delve_core::Event>), Box<dyn std::error::Error>> {
    let mut config = SessionConfig::new(cli.name.clone()).with_class(cli.class.clone());
    if let Some(catalog) = catalog {
        config = config.with_catalog(catalog);
    }
    if cli.frontier {
        config = config.with_map_mode(MapMode::Frontier);
    }
    if cli.daily {
        config = config.with_seed(daily_seed());
        println!("Daily challenge. Good luck.");
    } else if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(GameSession::new(config)?)
}

fn session_banner(session: &GameSession) -> Vec<delve_core::Event> {
    let player = session.player();
    vec![delve_core::Event::Info(format!(
        "{} the {}, level {}, {}/{} HP.",
        player.name, player.class_name, player.level, player.hp, player.max_hp
    ))]
}

/// One seed per UTC day, shared by everyone playing the daily.
fn daily_seed() -> u64 {
    let days = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        / 86_400;
    // Spread consecutive days across the seed space.
    days.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
