//! Text dungeon-crawler engine.
//!
//! This crate provides:
//! - BSP dungeon generation (with a lazy frontier-growth fallback)
//! - Weighted room content population scaled to player level
//! - Turn-based combat with status effects, crits, hordes, and loot
//! - Equipment-derived stats, leveling, quests, and save data
//!
//! Everything probabilistic draws from one seeded RNG owned by the session,
//! so a seed fully determines a run. The engine emits structured [`Event`]s
//! instead of printing; frontends render them however they like.
//!
//! # Quick Start
//!
//! ```ignore
//! use delve_core::{GameSession, SessionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut session, intro) = GameSession::new(
//!         SessionConfig::new("Brand").with_class("Warrior").with_seed(42),
//!     )?;
//!     for event in intro {
//!         println!("{event}");
//!     }
//!     for event in session.handle_line("go north") {
//!         println!("{event}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod command;
pub mod config;
pub mod content;
pub mod effect;
pub mod event;
pub mod item;
pub mod mapgen;
pub mod monster;
pub mod persist;
pub mod player;
pub mod populate;
pub mod quest;
pub mod rng;
pub mod room;
pub mod session;
pub mod stats;
pub mod testing;

// Primary public API
pub use combat::{CombatAction, CombatState};
pub use command::{Command, CommandError};
pub use content::{builtin_catalog, Catalog, ContentError};
pub use event::{Event, GameMode};
pub use persist::{SaveData, SaveError};
pub use player::Player;
pub use rng::GameRng;
pub use session::{GameSession, MapMode, RunOutcome, SessionConfig, SessionError};
