//! Room nodes of the dungeon graph.
//!
//! A room is created once (eagerly by the BSP generator, lazily by the
//! frontier generator), keeps its identity for the rest of the run, and
//! carries at most one primary feature. Interacting empties or mutates the
//! feature slot; rooms are never destroyed, so backtracking always finds
//! them as left.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::content::{HazardTemplate, HordeTemplate, PuzzleTemplate, ShrineTemplate};
use crate::item::{Item, KeyKind};
use crate::monster::Monster;

/// Index of a room within the session's room table.
pub type RoomId = usize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    pub fn parse(text: &str) -> Option<Direction> {
        match text.to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A locked exit: which key opens it and, when known, where it leads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockedExit {
    pub key: KeyKind,
    /// `None` until the far room is generated (frontier mode).
    pub target: Option<RoomId>,
}

/// The single primary content slot of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomFeature {
    Inn,
    CraftingStation { kind: String },
    Horde { horde: HordeTemplate },
    Vendor { npc: String, dialogue: String },
    Shrine { shrine: ShrineTemplate, used: bool },
    Puzzle { puzzle: PuzzleTemplate, solved: bool },
    QuestGiver { npc: String, quest_id: String, dialogue: String },
    Npc { npc: String, dialogue: String },
    Item(Item),
    Hazard { hazard: HazardTemplate, revealed: bool, disarmed: bool },
    Monster(Monster),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Room {
    pub description: String,
    /// Traversable exits and their targets. `None` targets haven't been
    /// generated yet (frontier mode).
    pub exits: BTreeMap<Direction, Option<RoomId>>,
    /// Exits gated behind a key.
    pub locked_exits: BTreeMap<Direction, LockedExit>,
    pub feature: Option<RoomFeature>,
}

impl Room {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Room::default()
        }
    }

    /// Move a locked exit into the open set, keeping its target. Returns
    /// the key kind it took, or `None` if that direction wasn't locked.
    pub fn unlock(&mut self, direction: Direction) -> Option<KeyKind> {
        let locked = self.locked_exits.remove(&direction)?;
        self.exits.insert(direction, locked.target);
        Some(locked.key)
    }

    /// True when the feature slot holds a live (non-guardian) monster that
    /// blocks interaction with the room.
    pub fn has_live_monster(&self) -> bool {
        matches!(&self.feature, Some(RoomFeature::Monster(m)) if m.is_alive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn parse_accepts_short_forms() {
        assert_eq!(Direction::parse("n"), Some(Direction::North));
        assert_eq!(Direction::parse("WEST"), Some(Direction::West));
        assert_eq!(Direction::parse("up"), None);
    }

    #[test]
    fn unlock_promotes_exit_and_keeps_target() {
        let mut room = Room::new("a bare cell");
        room.locked_exits.insert(
            Direction::East,
            LockedExit {
                key: KeyKind::Silver,
                target: Some(7),
            },
        );
        assert_eq!(room.unlock(Direction::East), Some(KeyKind::Silver));
        assert_eq!(room.exits.get(&Direction::East), Some(&Some(7)));
        assert!(room.locked_exits.is_empty());
        assert_eq!(room.unlock(Direction::East), None);
    }
}
