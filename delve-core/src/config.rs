//! Game tuning constants.
//!
//! Every number the engine rolls against lives here so the balance surface
//! is one screen, not scattered through combat and generation code.

// ============================================================================
// Base player stats
// ============================================================================

pub const BASE_ATTACK_POWER: i32 = 8;
pub const BASE_ATTACK_VARIANCE: i32 = 2;
pub const BASE_CRIT_CHANCE: f64 = 0.10;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;
pub const BASE_MAX_HP: i32 = 100;

pub const STARTING_GOLD: u32 = 500;
pub const STARTING_INVENTORY_SLOTS: usize = 5;

/// Shown when no weapon is equipped. Display only; attack power already
/// carries the unarmed baseline.
pub const UNARMED_DISPLAY_DAMAGE: i32 = 5;

// ============================================================================
// Leveling
// ============================================================================

pub const BASE_XP_TO_LEVEL: u32 = 100;
pub const XP_SCALE_FACTOR: f64 = 1.5;
pub const HP_GAIN_PER_LEVEL: i32 = 15;
pub const ATTACK_GAIN_PER_LEVEL: i32 = 3;
pub const CRIT_GAIN_PER_LEVEL: f64 = 0.015;

/// XP required to advance out of `level`.
pub fn xp_to_next_level(level: u32) -> u32 {
    (BASE_XP_TO_LEVEL as f64 * XP_SCALE_FACTOR.powi(level as i32 - 1)) as u32
}

// ============================================================================
// Monster spawning
// ============================================================================

pub const MONSTER_LEVEL_MIN_OFFSET: i32 = -1;
pub const MONSTER_LEVEL_MAX_OFFSET: i32 = 2;

/// Spawn weight by `monster.level - player.level`. Offsets outside the
/// `[-1, +2]` band never spawn.
pub fn monster_level_weight(offset: i32) -> f64 {
    match offset {
        -1 => 0.2,
        0 => 0.5,
        1 => 0.2,
        2 => 0.1,
        _ => 0.0,
    }
}

// ============================================================================
// Room content chances
// ============================================================================

pub const INN_SPAWN_CHANCE: f64 = 0.04;
pub const CRAFTING_STATION_SPAWN_CHANCE: f64 = 0.05;
pub const HORDE_SPAWN_CHANCE: f64 = 0.05;
pub const VENDOR_SPAWN_CHANCE: f64 = 0.05;
pub const SHRINE_SPAWN_CHANCE: f64 = 0.08;
pub const PUZZLE_SPAWN_CHANCE: f64 = 0.10;
pub const QUEST_GIVER_SPAWN_CHANCE: f64 = 0.15;

pub const WINNING_ITEM_SPAWN_CHANCE: f64 = 0.01;
pub const WINNING_ITEM_MIN_PLAYER_LEVEL: u32 = 5;

// Secondary roll, cumulative thresholds. Rolls at or above the monster
// threshold leave the room empty.
pub const ITEM_SPAWN_THRESHOLD: f64 = 0.35;
pub const NPC_SPAWN_THRESHOLD: f64 = 0.47;
pub const HAZARD_SPAWN_THRESHOLD: f64 = 0.62;
pub const MONSTER_SPAWN_THRESHOLD: f64 = 0.82;

// ============================================================================
// Frontier exits (directional-growth map mode)
// ============================================================================

pub const OPEN_EXIT_CHANCE: f64 = 0.25;
pub const LOCKED_EXIT_CHANCE: f64 = 0.20;

// ============================================================================
// Combat
// ============================================================================

pub const FLEE_SUCCESS_CHANCE: f64 = 0.5;
pub const HORDE_BONUS_ITEM_CHANCE: f64 = 0.5;
pub const MATERIAL_DROP_CHANCE: f64 = 0.1;

// ============================================================================
// Room interactions
// ============================================================================

pub const HAZARD_DISARM_CHANCE: f64 = 0.5;
pub const INN_REST_COST: u32 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_curve_matches_base_and_scale() {
        assert_eq!(xp_to_next_level(1), 100);
        assert_eq!(xp_to_next_level(2), 150);
        assert_eq!(xp_to_next_level(3), 225);
    }

    #[test]
    fn monster_weights_cover_band_only() {
        assert!(monster_level_weight(-2) == 0.0);
        assert!(monster_level_weight(3) == 0.0);
        let total: f64 = (-1..=2).map(monster_level_weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
