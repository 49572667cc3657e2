//! Effective stat computation.
//!
//! Pure functions of the current player state; no randomness, no side
//! effects. Callers recompute whenever equipment or level changes; timed
//! buffs and curses stay out of these numbers and arrive as per-turn
//! modifiers from the effect engine instead.

use crate::config::ATTACK_GAIN_PER_LEVEL;
use crate::content::{Catalog, EnchantEffect};
use crate::item::{Item, TrinketEffect};
use crate::player::Player;

/// Effective attack power: class base grown by level, plus permanent
/// bonuses, the equipped weapon, and strength trinkets.
pub fn attack_power(player: &Player) -> i32 {
    let base = player.base_attack + (player.level as i32 - 1) * ATTACK_GAIN_PER_LEVEL;
    let weapon = player
        .equipment
        .weapon
        .as_ref()
        .and_then(Item::damage)
        .unwrap_or(0);
    let trinkets: i32 = player
        .equipment
        .trinkets
        .iter()
        .map(|t| match t.kind {
            crate::item::ItemKind::Trinket {
                effect: TrinketEffect::StrengthBoost(amount),
            } => amount,
            _ => 0,
        })
        .sum();
    base + player.attack_bonus + weapon + trinkets
}

/// Total defense from worn gear: shield, body armor, cloak, helmet, plus
/// cursed-gear penalties and enchantment bonuses. Never negative.
pub fn total_defense(player: &Player, catalog: &Catalog) -> i32 {
    let mut total = 0;
    for piece in player.equipment.defensive_pieces() {
        total += piece.defense().unwrap_or(0);
        if let Some(curse) = piece.curse.as_ref().filter(|_| piece.cursed) {
            total += curse.defense_penalty;
        }
        if let Some(enchant) = piece
            .enchantment
            .as_deref()
            .and_then(|name| catalog.enchantment(name))
        {
            if let EnchantEffect::DefenseBoost(amount) = enchant.effect {
                total += amount;
            }
        }
    }
    total.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_catalog;
    use crate::item::{ArmorSlot, CurseEffect, ItemKind};
    use crate::testing::test_player;

    fn armor(name: &str, defense: i32) -> Item {
        Item::new(
            name,
            ItemKind::Armor {
                slot: ArmorSlot::Body,
                defense,
            },
        )
    }

    #[test]
    fn attack_power_stacks_level_weapon_and_trinkets() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        player.base_attack = 8;
        player.level = 3;
        player.attack_bonus = 1;
        player.equipment.weapon = Some(Item::new("Iron Sword", ItemKind::Weapon { damage: 6 }));
        player.equipment.trinkets.push(Item::new(
            "Ring of Strength",
            ItemKind::Trinket {
                effect: TrinketEffect::StrengthBoost(2),
            },
        ));
        // 8 + 2*3 + 1 + 6 + 2
        assert_eq!(attack_power(&player), 23);
    }

    #[test]
    fn defense_is_monotone_in_each_piece() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        player.equipment.body_armor = Some(armor("Leather Armor", 3));
        let before = total_defense(&player, &catalog);
        player.equipment.body_armor = Some(armor("Chainmail", 5));
        let after = total_defense(&player, &catalog);
        assert!(after >= before);
        assert_eq!(after - before, 2);
    }

    #[test]
    fn cursed_penalty_applies_and_floor_holds() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        player.equipment.body_armor = Some(armor("Thin Rags", 1).with_curse(CurseEffect {
            defense_penalty: -5,
            ..CurseEffect::default()
        }));
        assert_eq!(total_defense(&player, &catalog), 0);
    }

    #[test]
    fn enchantment_defense_bonus_counts() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        // Plate Armor carries the Warding enchantment (+2) in the builtin set.
        player.equipment.body_armor = Some(catalog.item("Plate Armor").unwrap().clone());
        assert_eq!(total_defense(&player, &catalog), 8 + 2);
    }
}
