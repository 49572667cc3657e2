//! Item templates and instances.
//!
//! Items are immutable templates in the content catalog; anything the
//! player carries is a clone. Level scaling clones the template, bumps the
//! combat stat, and suffixes the name (`Iron Sword+2`); the template is
//! never touched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lock/key colors for gated exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    Rusty,
    Silver,
    Bone,
    /// Dropped by the dungeon's mini-boss; opens the boss chamber.
    Obsidian,
}

impl KeyKind {
    pub fn name(&self) -> &'static str {
        match self {
            KeyKind::Rusty => "rusty",
            KeyKind::Silver => "silver",
            KeyKind::Bone => "bone",
            KeyKind::Obsidian => "obsidian",
        }
    }

    /// The key colors frontier-mode exit rolls draw from. The obsidian key
    /// is placed by the map generator, never rolled.
    pub fn rollable() -> [KeyKind; 3] {
        [KeyKind::Rusty, KeyKind::Silver, KeyKind::Bone]
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Armor subtype, one slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorSlot {
    Body,
    Cloak,
    Helmet,
}

impl ArmorSlot {
    pub fn name(&self) -> &'static str {
        match self {
            ArmorSlot::Body => "body armor",
            ArmorSlot::Cloak => "cloak",
            ArmorSlot::Helmet => "helmet",
        }
    }
}

/// What a consumable does when used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    /// Restore up to this much HP.
    Heal(i32),
    /// Lose this much HP.
    Harm(i32),
    /// Remove the named status effect from the user.
    Cure { effect: String },
    /// Combat only: apply the named catalog status effect to the monster.
    Inflict { effect: String },
    /// Permanently raise a base stat. Not usable mid-combat.
    StatBoost { stat: BoostStat, amount: i32 },
    /// No mechanical effect.
    Flavor,
}

/// Stats a permanent boost consumable can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostStat {
    AttackPower,
    MaxHp,
}

/// Passive effect of an equipped trinket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrinketEffect {
    /// Flat attack power while equipped.
    StrengthBoost(i32),
}

/// Drawbacks of a cursed piece of gear. A cursed item cannot be unequipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CurseEffect {
    /// Added to total defense (negative in practice).
    pub defense_penalty: i32,
    /// HP drained from the wielder before each swing (weapons).
    pub hp_drain: i32,
    /// Multiplier on gold drops (helmets). `None` leaves gold untouched.
    pub gold_find: Option<f64>,
}

/// Chance for a weapon (or monster) to apply a catalog status effect on hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnHitEffect {
    pub effect: String,
    pub chance: f64,
}

/// Item category, with the stats that only exist for that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon { damage: i32 },
    Shield { defense: i32 },
    Armor { slot: ArmorSlot, defense: i32 },
    Consumable { effect: ConsumableEffect },
    Key { key: KeyKind },
    Trinket { effect: TrinketEffect },
    Backpack { extra_slots: usize },
    CraftingMaterial,
    /// Picking one of these up forces the dungeon guardian to spawn.
    WinningItem,
}

/// An item template (catalog) or carried instance (inventory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shop_price: Option<u32>,
    #[serde(default)]
    pub cursed: bool,
    #[serde(default)]
    pub curse: Option<CurseEffect>,
    /// Name of a catalog enchantment, if any.
    #[serde(default)]
    pub enchantment: Option<String>,
    /// Status effects this weapon may inflict on hit.
    #[serde(default)]
    pub on_hit: Vec<OnHitEffect>,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            shop_price: None,
            cursed: false,
            curse: None,
            enchantment: None,
            on_hit: Vec::new(),
        }
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_price(mut self, gold: u32) -> Self {
        self.shop_price = Some(gold);
        self
    }

    pub fn with_curse(mut self, curse: CurseEffect) -> Self {
        self.cursed = true;
        self.curse = Some(curse);
        self
    }

    pub fn with_enchantment(mut self, name: impl Into<String>) -> Self {
        self.enchantment = Some(name.into());
        self
    }

    pub fn with_on_hit(mut self, effect: impl Into<String>, chance: f64) -> Self {
        self.on_hit.push(OnHitEffect {
            effect: effect.into(),
            chance,
        });
        self
    }

    /// Weapon damage, if this is a weapon.
    pub fn damage(&self) -> Option<i32> {
        match self.kind {
            ItemKind::Weapon { damage } => Some(damage),
            _ => None,
        }
    }

    /// Defense contribution, if this is defensive gear.
    pub fn defense(&self) -> Option<i32> {
        match self.kind {
            ItemKind::Shield { defense } | ItemKind::Armor { defense, .. } => Some(defense),
            _ => None,
        }
    }

    /// True for gear that goes into an equipment slot.
    pub fn is_equippable(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Weapon { .. }
                | ItemKind::Shield { .. }
                | ItemKind::Armor { .. }
                | ItemKind::Trinket { .. }
        )
    }

    /// Level-band bonus applied when gear spawns for a player of `level`.
    pub fn scaling_bonus(level: u32) -> i32 {
        match level {
            0..=4 => 0,
            5..=7 => 1,
            8..=10 => 2,
            11..=13 => 3,
            14..=16 => 4,
            _ => 5,
        }
    }

    /// Clone this template scaled for a player of `level`. Non-gear and
    /// zero-bonus levels return an unscaled clone.
    pub fn scaled_for_level(&self, level: u32) -> Item {
        let bonus = Self::scaling_bonus(level);
        if bonus == 0 {
            return self.clone();
        }
        let mut scaled = self.clone();
        match &mut scaled.kind {
            ItemKind::Weapon { damage } => *damage += bonus,
            ItemKind::Shield { defense } | ItemKind::Armor { defense, .. } => *defense += bonus,
            _ => return self.clone(),
        }
        scaled.name = format!("{}+{}", self.name, bonus);
        scaled
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_clones_and_suffixes() {
        let sword = Item::new("Iron Sword", ItemKind::Weapon { damage: 6 });
        let scaled = sword.scaled_for_level(9);
        assert_eq!(scaled.name, "Iron Sword+2");
        assert_eq!(scaled.damage(), Some(8));
        // Template untouched.
        assert_eq!(sword.name, "Iron Sword");
        assert_eq!(sword.damage(), Some(6));
    }

    #[test]
    fn scaling_skips_low_levels_and_non_gear() {
        let sword = Item::new("Iron Sword", ItemKind::Weapon { damage: 6 });
        assert_eq!(sword.scaled_for_level(4), sword);

        let potion = Item::new(
            "Healing Potion",
            ItemKind::Consumable {
                effect: ConsumableEffect::Heal(20),
            },
        );
        assert_eq!(potion.scaled_for_level(17), potion);
    }

    #[test]
    fn scaling_bands() {
        assert_eq!(Item::scaling_bonus(1), 0);
        assert_eq!(Item::scaling_bonus(5), 1);
        assert_eq!(Item::scaling_bonus(10), 2);
        assert_eq!(Item::scaling_bonus(13), 3);
        assert_eq!(Item::scaling_bonus(16), 4);
        assert_eq!(Item::scaling_bonus(17), 5);
        assert_eq!(Item::scaling_bonus(40), 5);
    }
}
