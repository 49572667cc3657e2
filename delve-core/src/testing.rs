//! Testing utilities.
//!
//! Deterministic fixtures shared by the unit tests and the integration
//! suite: a plain player with known numbers, seeded sessions, and a couple
//! of assertion helpers. Shipped in the crate (not behind `cfg(test)`) so
//! downstream tools can script scenarios the same way.

use crate::content::Catalog;
use crate::event::Event;
use crate::player::Player;
use crate::session::{GameSession, SessionConfig};

/// A classless level-1 player with base stats, carrying one healing potion.
/// No equipment, so attack power equals `base_attack` and defense is 0.
pub fn test_player(catalog: &Catalog) -> Player {
    let mut player = Player {
        name: "Tester".into(),
        ..Player::default()
    };
    if let Some(potion) = catalog.item("Healing Potion") {
        player.inventory.push(potion.clone());
    }
    player.recalculate();
    player
}

/// A seeded Warrior session; same seed, same run.
pub fn test_session(seed: u64) -> (GameSession, Vec<Event>) {
    GameSession::new(SessionConfig::new("Tester").with_seed(seed))
        .expect("builtin catalog builds a session")
}

/// Assert an event list contains a match for `predicate`, with the list in
/// the failure message.
#[track_caller]
pub fn assert_event(events: &[Event], predicate: impl Fn(&Event) -> bool, what: &str) {
    assert!(
        events.iter().any(predicate),
        "expected {what} in events: {events:#?}"
    );
}

/// Render events the way the CLI would; handy for snapshot-ish assertions.
pub fn render_events(events: &[Event]) -> String {
    events
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_catalog;

    #[test]
    fn test_player_has_known_baseline() {
        let catalog = builtin_catalog();
        let player = test_player(&catalog);
        assert_eq!(player.level, 1);
        assert_eq!(player.attack_power, player.base_attack);
        assert_eq!(player.total_defense(&catalog), 0);
        assert!(player.find_item("Healing Potion").is_some());
    }

    #[test]
    fn test_sessions_repeat_with_the_same_seed() {
        let (_, a) = test_session(1234);
        let (_, b) = test_session(1234);
        assert_eq!(render_events(&a), render_events(&b));
    }
}
