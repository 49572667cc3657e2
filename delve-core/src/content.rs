//! Immutable content catalogs.
//!
//! Items, monsters, NPCs, hazards, puzzles, shrines, hordes, quests,
//! classes, status effects, enchantments, room vocabulary, and spawn
//! weights: all read-only templates keyed by case-insensitive name. The
//! engine only ever clones out of a catalog; nothing here mutates after
//! load.
//!
//! A built-in default catalog ships with the crate; an external JSON file
//! can replace it wholesale.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::effect::{ActiveEffect, EffectKind};
use crate::item::{
    ArmorSlot, BoostStat, ConsumableEffect, CurseEffect, Item, ItemKind, KeyKind, OnHitEffect,
    TrinketEffect,
};

/// Errors loading or querying content data.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed content data: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Monster templates
// ============================================================================

/// A monster template. Combat instances are deep copies; see
/// [`crate::monster::Monster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub level: u32,
    pub health: i32,
    pub damage: i32,
    #[serde(default)]
    pub damage_variance: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default = "default_crit_multiplier")]
    pub crit_multiplier: f64,
    pub xp_reward: u32,
    #[serde(default)]
    pub gold_min: u32,
    #[serde(default)]
    pub gold_max: u32,
    #[serde(default)]
    pub item_drop: Option<String>,
    #[serde(default)]
    pub on_hit: Vec<OnHitEffect>,
}

fn default_crit_multiplier() -> f64 {
    1.0
}

impl MonsterTemplate {
    pub fn new(name: impl Into<String>, level: u32, health: i32, damage: i32) -> Self {
        Self {
            name: name.into(),
            level,
            health,
            damage,
            damage_variance: 0,
            defense: 0,
            crit_chance: 0.0,
            crit_multiplier: 1.0,
            xp_reward: level * 15,
            gold_min: 0,
            gold_max: 0,
            item_drop: None,
            on_hit: Vec::new(),
        }
    }

    pub fn with_variance(mut self, variance: i32) -> Self {
        self.damage_variance = variance;
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_crit(mut self, chance: f64, multiplier: f64) -> Self {
        self.crit_chance = chance;
        self.crit_multiplier = multiplier;
        self
    }

    pub fn with_gold(mut self, min: u32, max: u32) -> Self {
        self.gold_min = min;
        self.gold_max = max;
        self
    }

    pub fn with_drop(mut self, item: impl Into<String>) -> Self {
        self.item_drop = Some(item.into());
        self
    }

    pub fn with_on_hit(mut self, effect: impl Into<String>, chance: f64) -> Self {
        self.on_hit.push(OnHitEffect {
            effect: effect.into(),
            chance,
        });
        self
    }
}

// ============================================================================
// Status effect and enchantment templates
// ============================================================================

/// A named status effect the catalog can hand out (weapon on-hit, shrine
/// blessings, consumables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectTemplate {
    pub name: String,
    pub kind: EffectKind,
    pub duration: i32,
}

impl StatusEffectTemplate {
    pub fn new(name: impl Into<String>, kind: EffectKind, duration: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
        }
    }

    /// Deep-copy this template into a live effect.
    pub fn instantiate(&self) -> ActiveEffect {
        ActiveEffect::new(self.name.clone(), self.kind, self.duration)
    }
}

/// What an enchantment does for the gear carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnchantEffect {
    /// Flat bonus damage on every hit.
    DamageBoost(i32),
    /// Flat bonus to total defense while equipped.
    DefenseBoost(i32),
    /// Chance to apply a catalog status effect on hit.
    OnHit(OnHitEffect),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enchantment {
    pub name: String,
    pub effect: EnchantEffect,
}

// ============================================================================
// NPCs, hazards, puzzles, shrines, hordes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NpcRole {
    Vendor,
    QuestGiver { quest_id: String },
    Bystander,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcTemplate {
    pub name: String,
    pub role: NpcRole,
    pub dialogue: String,
    /// Only spawns while the named quest is active.
    #[serde(default)]
    pub requires_quest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardTemplate {
    pub name: String,
    pub damage: i32,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleReward {
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleTemplate {
    pub prompt: String,
    pub answer: String,
    pub reward: PuzzleReward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShrineTemplate {
    pub name: String,
    pub description: String,
    /// Status effect granted on a favorable roll.
    pub blessing: String,
    /// Status effect inflicted otherwise.
    pub curse: String,
    #[serde(default = "default_bless_chance")]
    pub bless_chance: f64,
}

fn default_bless_chance() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HordeTemplate {
    pub name: String,
    /// Monster names drawn from (with replacement) for each sub-fight.
    pub monsters: Vec<String>,
    pub size_min: u32,
    pub size_max: u32,
}

// ============================================================================
// Quests and classes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestKind {
    DefeatAny { count: u32 },
    DefeatMonster { monster: String, count: u32 },
    FetchItem { item: String, count: u32 },
}

impl QuestKind {
    pub fn target_count(&self) -> u32 {
        match self {
            QuestKind::DefeatAny { count }
            | QuestKind::DefeatMonster { count, .. }
            | QuestKind::FetchItem { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub id: String,
    pub name: String,
    pub giver: String,
    pub kind: QuestKind,
    #[serde(default = "default_required_level")]
    pub required_level: u32,
    #[serde(default)]
    pub prerequisite: Option<String>,
    pub gold_reward: u32,
    pub xp_reward: u32,
}

fn default_required_level() -> u32 {
    1
}

/// Combat skill effects, unlocked through a class's skill list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Multiply the damage roll.
    DamageBoost(f64),
    /// The hit cannot miss and always crits.
    GuaranteedCrit,
    Heal(i32),
    Stun { chance: f64 },
    Poison { damage: i32, turns: i32 },
    AttackBuff { amount: i32, turns: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTemplate {
    pub name: String,
    pub unlock_level: u32,
    pub effect: SkillEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartingStats {
    pub max_hp: i32,
    pub attack_power: i32,
    pub attack_variance: i32,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTemplate {
    pub name: String,
    pub description: String,
    pub starting: StartingStats,
    pub starting_equipment: Vec<String>,
    pub skills: Vec<SkillTemplate>,
}

// ============================================================================
// Room vocabulary and spawn weights
// ============================================================================

/// Word lists the generator draws room descriptions from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoomVocabulary {
    pub adjectives: Vec<String>,
    pub room_types: Vec<String>,
    pub details: Vec<String>,
}

/// Per-category item spawn weights. Zero-weight categories never spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub weapon: f64,
    pub armor_body: f64,
    pub armor_cloak: f64,
    pub armor_helmet: f64,
    pub shield: f64,
    pub backpack: f64,
    pub key: f64,
    pub consumable_healing: f64,
    pub consumable_other: f64,
    pub default: f64,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            weapon: 3.0,
            armor_body: 2.0,
            armor_cloak: 1.0,
            armor_helmet: 1.0,
            shield: 2.0,
            backpack: 1.0,
            key: 2.0,
            consumable_healing: 5.0,
            consumable_other: 2.0,
            default: 1.0,
        }
    }
}

impl SpawnWeights {
    /// The weight bucket an item rolls under. Winning items never roll.
    pub fn weight_for(&self, item: &Item) -> f64 {
        match &item.kind {
            ItemKind::Weapon { .. } => self.weapon,
            ItemKind::Armor { slot, .. } => match slot {
                ArmorSlot::Body => self.armor_body,
                ArmorSlot::Cloak => self.armor_cloak,
                ArmorSlot::Helmet => self.armor_helmet,
            },
            ItemKind::Shield { .. } => self.shield,
            ItemKind::Backpack { .. } => self.backpack,
            ItemKind::Key { .. } => self.key,
            ItemKind::Consumable { effect } => match effect {
                ConsumableEffect::Heal(_) => self.consumable_healing,
                _ => self.consumable_other,
            },
            ItemKind::Trinket { .. } | ItemKind::CraftingMaterial => self.default,
            ItemKind::WinningItem => 0.0,
        }
    }
}

// ============================================================================
// The catalog
// ============================================================================

/// The complete read-only content set for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub monsters: Vec<MonsterTemplate>,
    pub npcs: Vec<NpcTemplate>,
    pub hazards: Vec<HazardTemplate>,
    pub puzzles: Vec<PuzzleTemplate>,
    pub shrines: Vec<ShrineTemplate>,
    pub hordes: Vec<HordeTemplate>,
    pub quests: Vec<QuestTemplate>,
    pub classes: Vec<ClassTemplate>,
    pub effects: Vec<StatusEffectTemplate>,
    pub enchantments: Vec<Enchantment>,
    pub vocabulary: RoomVocabulary,
    pub spawn_weights: SpawnWeights,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a catalog from a JSON string. Absent tables default to empty.
    pub fn from_json_str(text: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Case-insensitive item lookup.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive monster lookup.
    pub fn monster(&self, name: &str) -> Option<&MonsterTemplate> {
        self.monsters
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn status_effect(&self, name: &str) -> Option<&StatusEffectTemplate> {
        self.effects
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn enchantment(&self, name: &str) -> Option<&Enchantment> {
        self.enchantments
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn quest(&self, id: &str) -> Option<&QuestTemplate> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn class(&self, name: &str) -> Option<&ClassTemplate> {
        self.classes
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Items eligible for the normal spawn roll (winning items excluded by
    /// their zero weight).
    pub fn winning_items(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|i| matches!(i.kind, ItemKind::WinningItem))
    }

    /// Monsters within the spawnable level band around `player_level`,
    /// paired with their weights.
    pub fn eligible_monsters(&self, player_level: u32) -> Vec<(&MonsterTemplate, f64)> {
        use crate::config::monster_level_weight;
        self.monsters
            .iter()
            .filter_map(|m| {
                let offset = m.level as i32 - player_level as i32;
                let weight = monster_level_weight(offset);
                (weight > 0.0).then_some((m, weight))
            })
            .collect()
    }

    /// The hardest monster at or up to two levels above the player. Used
    /// for the winning-item guardian.
    pub fn hardest_guardian(&self, player_level: u32) -> Option<&MonsterTemplate> {
        self.monsters
            .iter()
            .filter(|m| {
                let offset = m.level as i32 - player_level as i32;
                (0..=crate::config::MONSTER_LEVEL_MAX_OFFSET).contains(&offset)
            })
            .max_by_key(|m| m.level)
    }

    /// The highest-level monster in the catalog. The BSP end room hosts it.
    pub fn apex_monster(&self) -> Option<&MonsterTemplate> {
        self.monsters.iter().max_by_key(|m| m.level)
    }

    /// A mid-tier monster near the given level, for the key-room mini-boss.
    pub fn mini_boss(&self, player_level: u32) -> Option<&MonsterTemplate> {
        self.monsters
            .iter()
            .filter(|m| m.level >= player_level)
            .min_by_key(|m| m.level)
            .or_else(|| self.apex_monster())
    }
}

// ============================================================================
// Built-in content
// ============================================================================

lazy_static::lazy_static! {
    /// The default content set, used when no external catalog is supplied.
    pub static ref DEFAULT_CATALOG: Catalog = builtin_catalog();
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Construct the built-in catalog.
pub fn builtin_catalog() -> Catalog {
    use EffectKind::*;

    let items = vec![
        // Weapons
        Item::new("Rusty Dagger", ItemKind::Weapon { damage: 3 }).with_price(15),
        Item::new("Iron Sword", ItemKind::Weapon { damage: 6 }).with_price(60),
        Item::new("Steel Longsword", ItemKind::Weapon { damage: 9 }).with_price(140),
        Item::new("Warhammer", ItemKind::Weapon { damage: 11 }).with_price(220),
        Item::new("Shadow Blade", ItemKind::Weapon { damage: 8 })
            .with_price(260)
            .with_on_hit("Poison", 0.25),
        Item::new("Flamebrand", ItemKind::Weapon { damage: 10 })
            .with_price(400)
            .with_enchantment("Flaming"),
        Item::new("Bloodthirsty Axe", ItemKind::Weapon { damage: 14 })
            .with_description("It whispers. It is hungry.")
            .with_curse(CurseEffect {
                hp_drain: 2,
                ..CurseEffect::default()
            }),
        // Shields
        Item::new("Wooden Shield", ItemKind::Shield { defense: 2 }).with_price(25),
        Item::new("Iron Shield", ItemKind::Shield { defense: 4 }).with_price(90),
        Item::new("Tower Shield", ItemKind::Shield { defense: 6 }).with_price(200),
        // Armor
        Item::new(
            "Leather Armor",
            ItemKind::Armor {
                slot: ArmorSlot::Body,
                defense: 3,
            },
        )
        .with_price(50),
        Item::new(
            "Chainmail",
            ItemKind::Armor {
                slot: ArmorSlot::Body,
                defense: 5,
            },
        )
        .with_price(150),
        Item::new(
            "Plate Armor",
            ItemKind::Armor {
                slot: ArmorSlot::Body,
                defense: 8,
            },
        )
        .with_price(350)
        .with_enchantment("Warding"),
        Item::new(
            "Traveler's Cloak",
            ItemKind::Armor {
                slot: ArmorSlot::Cloak,
                defense: 1,
            },
        )
        .with_price(30),
        Item::new(
            "Shadowweave Cloak",
            ItemKind::Armor {
                slot: ArmorSlot::Cloak,
                defense: 3,
            },
        )
        .with_price(180),
        Item::new(
            "Iron Helm",
            ItemKind::Armor {
                slot: ArmorSlot::Helmet,
                defense: 2,
            },
        )
        .with_price(70),
        Item::new(
            "Greedy Crown",
            ItemKind::Armor {
                slot: ArmorSlot::Helmet,
                defense: 3,
            },
        )
        .with_description("Heavier than it looks, and it never comes off willingly.")
        .with_curse(CurseEffect {
            defense_penalty: -1,
            gold_find: Some(2.0),
            ..CurseEffect::default()
        }),
        // Consumables
        Item::new(
            "Healing Potion",
            ItemKind::Consumable {
                effect: ConsumableEffect::Heal(20),
            },
        )
        .with_price(30),
        Item::new(
            "Greater Healing Potion",
            ItemKind::Consumable {
                effect: ConsumableEffect::Heal(45),
            },
        )
        .with_price(80),
        Item::new(
            "Antidote",
            ItemKind::Consumable {
                effect: ConsumableEffect::Cure {
                    effect: "Poison".into(),
                },
            },
        )
        .with_price(25),
        Item::new(
            "Vial of Venom",
            ItemKind::Consumable {
                effect: ConsumableEffect::Inflict {
                    effect: "Poison".into(),
                },
            },
        )
        .with_price(40),
        Item::new(
            "Elixir of Vigor",
            ItemKind::Consumable {
                effect: ConsumableEffect::StatBoost {
                    stat: BoostStat::MaxHp,
                    amount: 10,
                },
            },
        )
        .with_price(120),
        Item::new(
            "Warrior's Draught",
            ItemKind::Consumable {
                effect: ConsumableEffect::StatBoost {
                    stat: BoostStat::AttackPower,
                    amount: 2,
                },
            },
        )
        .with_price(150),
        Item::new(
            "Moldy Bread",
            ItemKind::Consumable {
                effect: ConsumableEffect::Harm(5),
            },
        ),
        Item::new(
            "Dungeon Ale",
            ItemKind::Consumable {
                effect: ConsumableEffect::Flavor,
            },
        )
        .with_price(5),
        // Keys
        Item::new("Rusty Key", ItemKind::Key { key: KeyKind::Rusty }),
        Item::new("Silver Key", ItemKind::Key { key: KeyKind::Silver }),
        Item::new("Bone Key", ItemKind::Key { key: KeyKind::Bone }),
        Item::new(
            "Obsidian Key",
            ItemKind::Key {
                key: KeyKind::Obsidian,
            },
        )
        .with_description("Cold to the touch. The boss chamber answers to it."),
        // Trinkets and sundries
        Item::new(
            "Ring of Strength",
            ItemKind::Trinket {
                effect: TrinketEffect::StrengthBoost(2),
            },
        )
        .with_price(100),
        Item::new(
            "Berserker's Band",
            ItemKind::Trinket {
                effect: TrinketEffect::StrengthBoost(4),
            },
        )
        .with_price(250),
        Item::new("Leather Satchel", ItemKind::Backpack { extra_slots: 3 }).with_price(60),
        Item::new("Iron Scrap", ItemKind::CraftingMaterial),
        Item::new("Ember Crystal", ItemKind::CraftingMaterial),
        // The artifact
        Item::new("Heart of the Dungeon", ItemKind::WinningItem)
            .with_description("A fist-sized gem beating like a living thing."),
    ];

    let effects = vec![
        StatusEffectTemplate::new("Poison", DamageOverTime(3), 3),
        StatusEffectTemplate::new("Burning", DamageOverTime(4), 2),
        StatusEffectTemplate::new("Stun", Stun, 2),
        StatusEffectTemplate::new("Weakness", AttackModifier(-3), 3),
        StatusEffectTemplate::new("Curse", DefenseModifier(-2), 3),
        StatusEffectTemplate::new("Blindness", AccuracyModifier(-0.3), 2),
        StatusEffectTemplate::new("Battle Fury", AttackModifier(4), 3),
        StatusEffectTemplate::new("Stone Skin", DefenseModifier(3), 3),
        StatusEffectTemplate::new("Eagle Eye", CritModifier(0.15), 3),
    ];

    let enchantments = vec![
        Enchantment {
            name: "Flaming".into(),
            effect: EnchantEffect::DamageBoost(2),
        },
        Enchantment {
            name: "Warding".into(),
            effect: EnchantEffect::DefenseBoost(2),
        },
        Enchantment {
            name: "Venomous".into(),
            effect: EnchantEffect::OnHit(OnHitEffect {
                effect: "Poison".into(),
                chance: 0.25,
            }),
        },
    ];

    let monsters = vec![
        MonsterTemplate::new("Giant Rat", 1, 12, 3)
            .with_variance(1)
            .with_gold(1, 5),
        MonsterTemplate::new("Cave Goblin", 1, 16, 4)
            .with_variance(1)
            .with_gold(3, 10)
            .with_drop("Rusty Dagger"),
        MonsterTemplate::new("Skeletal Warrior", 2, 24, 6)
            .with_variance(2)
            .with_defense(1)
            .with_gold(5, 15)
            .with_drop("Bone Key"),
        MonsterTemplate::new("Feral Ghoul", 3, 30, 7)
            .with_variance(2)
            .with_gold(8, 20)
            .with_on_hit("Weakness", 0.2),
        MonsterTemplate::new("Orc Raider", 3, 34, 8)
            .with_variance(3)
            .with_defense(2)
            .with_crit(0.1, 1.5)
            .with_gold(10, 25)
            .with_drop("Iron Sword"),
        MonsterTemplate::new("Venomfang Spider", 4, 36, 8)
            .with_variance(2)
            .with_gold(10, 30)
            .with_on_hit("Poison", 0.35),
        MonsterTemplate::new("Cursed Shade", 5, 42, 10)
            .with_variance(3)
            .with_gold(15, 35)
            .with_on_hit("Curse", 0.3),
        MonsterTemplate::new("Stone Golem", 6, 60, 11)
            .with_variance(2)
            .with_defense(5)
            .with_gold(20, 45)
            .with_drop("Iron Shield"),
        MonsterTemplate::new("Vampire Spawn", 7, 55, 13)
            .with_variance(3)
            .with_crit(0.15, 1.6)
            .with_gold(25, 60),
        MonsterTemplate::new("Minotaur", 8, 75, 15)
            .with_variance(4)
            .with_defense(3)
            .with_crit(0.1, 2.0)
            .with_gold(35, 80)
            .with_drop("Warhammer"),
        MonsterTemplate::new("Lich's Apprentice", 9, 70, 16)
            .with_variance(4)
            .with_gold(40, 100)
            .with_on_hit("Blindness", 0.25),
        MonsterTemplate::new("Dungeon Wyrm", 10, 120, 18)
            .with_variance(5)
            .with_defense(6)
            .with_crit(0.15, 2.0)
            .with_gold(100, 250)
            .with_drop("Flamebrand"),
    ];

    let npcs = vec![
        NpcTemplate {
            name: "Barnaby".into(),
            role: NpcRole::Vendor,
            dialogue: "Fine wares for those still breathing!".into(),
            requires_quest: None,
        },
        NpcTemplate {
            name: "Old Maren".into(),
            role: NpcRole::QuestGiver {
                quest_id: "rat_cull".into(),
            },
            dialogue: "The rats took my stores. Thin their numbers, would you?".into(),
            requires_quest: None,
        },
        NpcTemplate {
            name: "Grimwald".into(),
            role: NpcRole::QuestGiver {
                quest_id: "bone_collector".into(),
            },
            dialogue: "Anything that walks these halls deserves a second death.".into(),
            requires_quest: None,
        },
        NpcTemplate {
            name: "Sister Elba".into(),
            role: NpcRole::QuestGiver {
                quest_id: "ember_fetch".into(),
            },
            dialogue: "My forge is cold without ember crystals. Bring me two.".into(),
            requires_quest: None,
        },
        NpcTemplate {
            name: "Lost Adventurer".into(),
            role: NpcRole::Bystander,
            dialogue: "Turn back. The deep rooms don't give people back.".into(),
            requires_quest: None,
        },
        NpcTemplate {
            name: "Mad Hermit".into(),
            role: NpcRole::Bystander,
            dialogue: "The walls rearrange when you sleep. I've counted them!".into(),
            requires_quest: None,
        },
    ];

    let hazards = vec![
        HazardTemplate {
            name: "spike pit".into(),
            damage: 8,
            hidden: true,
        },
        HazardTemplate {
            name: "dart trap".into(),
            damage: 6,
            hidden: true,
        },
        HazardTemplate {
            name: "patch of green slime".into(),
            damage: 4,
            hidden: false,
        },
        HazardTemplate {
            name: "swinging blade".into(),
            damage: 10,
            hidden: false,
        },
    ];

    let puzzles = vec![
        PuzzleTemplate {
            prompt: "Carved in the wall: \"I speak without a mouth and hear without ears. What am I?\"".into(),
            answer: "echo".into(),
            reward: PuzzleReward {
                gold: 40,
                xp: 30,
                item: None,
            },
        },
        PuzzleTemplate {
            prompt: "A plaque reads: \"I have cities, but no houses; mountains, but no trees. What am I?\"".into(),
            answer: "map".into(),
            reward: PuzzleReward {
                gold: 0,
                xp: 25,
                item: Some("Silver Key".into()),
            },
        },
        PuzzleTemplate {
            prompt: "Scratched into stone: \"I am tall when young and short when old. What am I?\"".into(),
            answer: "candle".into(),
            reward: PuzzleReward {
                gold: 25,
                xp: 20,
                item: Some("Healing Potion".into()),
            },
        },
    ];

    let shrines = vec![
        ShrineTemplate {
            name: "Shrine of the Warrior".into(),
            description: "A basalt altar stained with old offerings.".into(),
            blessing: "Battle Fury".into(),
            curse: "Weakness".into(),
            bless_chance: 0.5,
        },
        ShrineTemplate {
            name: "Mossy Idol".into(),
            description: "A squat figure half-swallowed by luminous moss.".into(),
            blessing: "Stone Skin".into(),
            curse: "Curse".into(),
            bless_chance: 0.5,
        },
        ShrineTemplate {
            name: "Altar of the Hawk".into(),
            description: "A wind you cannot feel stirs the feathers laid here.".into(),
            blessing: "Eagle Eye".into(),
            curse: "Blindness".into(),
            bless_chance: 0.5,
        },
    ];

    let hordes = vec![
        HordeTemplate {
            name: "Rat Swarm".into(),
            monsters: vec!["Giant Rat".into(), "Cave Goblin".into()],
            size_min: 3,
            size_max: 5,
        },
        HordeTemplate {
            name: "Restless Dead".into(),
            monsters: vec!["Skeletal Warrior".into(), "Feral Ghoul".into()],
            size_min: 2,
            size_max: 4,
        },
    ];

    let quests = vec![
        QuestTemplate {
            id: "rat_cull".into(),
            name: "Rat Problem".into(),
            giver: "Old Maren".into(),
            kind: QuestKind::DefeatMonster {
                monster: "Giant Rat".into(),
                count: 3,
            },
            required_level: 1,
            prerequisite: None,
            gold_reward: 50,
            xp_reward: 40,
        },
        QuestTemplate {
            id: "bone_collector".into(),
            name: "Bone Collector".into(),
            giver: "Grimwald".into(),
            kind: QuestKind::DefeatAny { count: 5 },
            required_level: 2,
            prerequisite: Some("rat_cull".into()),
            gold_reward: 120,
            xp_reward: 90,
        },
        QuestTemplate {
            id: "ember_fetch".into(),
            name: "Cold Forge".into(),
            giver: "Sister Elba".into(),
            kind: QuestKind::FetchItem {
                item: "Ember Crystal".into(),
                count: 2,
            },
            required_level: 3,
            prerequisite: None,
            gold_reward: 100,
            xp_reward: 75,
        },
    ];

    let classes = vec![
        ClassTemplate {
            name: "Warrior".into(),
            description: "Hits hard, wears iron, outlasts everything.".into(),
            starting: StartingStats {
                max_hp: 110,
                attack_power: 9,
                attack_variance: 2,
                crit_chance: 0.08,
                crit_multiplier: 1.5,
            },
            starting_equipment: vec![
                "Iron Sword".into(),
                "Wooden Shield".into(),
                "Healing Potion".into(),
            ],
            skills: vec![
                SkillTemplate {
                    name: "Power Strike".into(),
                    unlock_level: 2,
                    effect: SkillEffect::DamageBoost(1.5),
                },
                SkillTemplate {
                    name: "Battle Cry".into(),
                    unlock_level: 4,
                    effect: SkillEffect::AttackBuff {
                        amount: 4,
                        turns: 3,
                    },
                },
                SkillTemplate {
                    name: "Stunning Blow".into(),
                    unlock_level: 6,
                    effect: SkillEffect::Stun { chance: 0.6 },
                },
            ],
        },
        ClassTemplate {
            name: "Rogue".into(),
            description: "Strikes from shadow; the knife finds the gap.".into(),
            starting: StartingStats {
                max_hp: 90,
                attack_power: 8,
                attack_variance: 3,
                crit_chance: 0.18,
                crit_multiplier: 1.8,
            },
            starting_equipment: vec![
                "Rusty Dagger".into(),
                "Traveler's Cloak".into(),
                "Healing Potion".into(),
            ],
            skills: vec![
                SkillTemplate {
                    name: "Shadowstrike".into(),
                    unlock_level: 3,
                    effect: SkillEffect::GuaranteedCrit,
                },
                SkillTemplate {
                    name: "Envenom".into(),
                    unlock_level: 5,
                    effect: SkillEffect::Poison {
                        damage: 4,
                        turns: 3,
                    },
                },
            ],
        },
        ClassTemplate {
            name: "Cleric".into(),
            description: "Faith mends flesh and breaks the unquiet dead.".into(),
            starting: StartingStats {
                max_hp: 100,
                attack_power: 7,
                attack_variance: 1,
                crit_chance: 0.08,
                crit_multiplier: 1.5,
            },
            starting_equipment: vec![
                "Warhammer".into(),
                "Iron Helm".into(),
                "Healing Potion".into(),
            ],
            skills: vec![
                SkillTemplate {
                    name: "Mending Light".into(),
                    unlock_level: 2,
                    effect: SkillEffect::Heal(25),
                },
                SkillTemplate {
                    name: "Smite".into(),
                    unlock_level: 5,
                    effect: SkillEffect::DamageBoost(1.4),
                },
            ],
        },
    ];

    let vocabulary = RoomVocabulary {
        adjectives: words(&[
            "dank",
            "echoing",
            "crumbling",
            "torchlit",
            "fungal",
            "frost-rimed",
            "ancient",
            "collapsed",
        ]),
        room_types: words(&[
            "chamber",
            "crypt",
            "hall",
            "cistern",
            "gallery",
            "guardroom",
            "vault",
        ]),
        details: words(&[
            "bones piled in a corner",
            "water dripping from the ceiling",
            "claw marks gouged into the stone",
            "a cold draft rising from below",
            "faded murals of a forgotten war",
            "a shattered statue missing its head",
            "rusted chains bolted to the wall",
        ]),
    };

    Catalog {
        items,
        monsters,
        npcs,
        hazards,
        puzzles,
        shrines,
        hordes,
        quests,
        classes,
        effects,
        enchantments,
        vocabulary,
        spawn_weights: SpawnWeights::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookups_are_case_insensitive() {
        let catalog = builtin_catalog();
        assert!(catalog.item("iron sword").is_some());
        assert!(catalog.item("IRON SWORD").is_some());
        assert!(catalog.monster("giant rat").is_some());
        assert!(catalog.item("Excalibur").is_none());
    }

    #[test]
    fn builtin_references_resolve() {
        let catalog = builtin_catalog();
        // Every monster drop, on-hit effect, horde member, quest item, and
        // shrine effect must name something the catalog actually has.
        for m in &catalog.monsters {
            if let Some(drop) = &m.item_drop {
                assert!(catalog.item(drop).is_some(), "missing drop {drop}");
            }
            for oh in &m.on_hit {
                assert!(
                    catalog.status_effect(&oh.effect).is_some(),
                    "missing effect {}",
                    oh.effect
                );
            }
        }
        for h in &catalog.hordes {
            for name in &h.monsters {
                assert!(catalog.monster(name).is_some(), "missing monster {name}");
            }
        }
        for s in &catalog.shrines {
            assert!(catalog.status_effect(&s.blessing).is_some());
            assert!(catalog.status_effect(&s.curse).is_some());
        }
        for q in &catalog.quests {
            assert!(catalog.npcs.iter().any(|n| n.name == q.giver));
            if let QuestKind::FetchItem { item, .. } = &q.kind {
                assert!(catalog.item(item).is_some());
            }
        }
        for c in &catalog.classes {
            for name in &c.starting_equipment {
                assert!(catalog.item(name).is_some(), "missing equipment {name}");
            }
        }
        for i in &catalog.items {
            if let Some(name) = &i.enchantment {
                assert!(catalog.enchantment(name).is_some());
            }
            for oh in &i.on_hit {
                assert!(catalog.status_effect(&oh.effect).is_some());
            }
        }
    }

    #[test]
    fn eligible_monsters_respect_band() {
        let catalog = builtin_catalog();
        let eligible = catalog.eligible_monsters(3);
        assert!(!eligible.is_empty());
        for (m, w) in eligible {
            let offset = m.level as i32 - 3;
            assert!((-1..=2).contains(&offset));
            assert!(w > 0.0);
        }
    }

    #[test]
    fn partial_json_catalog_defaults_missing_tables() {
        let catalog = Catalog::from_json_str(r#"{"monsters": []}"#).unwrap();
        assert!(catalog.items.is_empty());
        assert!(catalog.monsters.is_empty());
        // Defaults still give spawn weights.
        assert!(catalog.spawn_weights.weapon > 0.0);
    }

    #[test]
    fn apex_and_guardian_selection() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.apex_monster().unwrap().name, "Dungeon Wyrm");
        let guardian = catalog.hardest_guardian(5).unwrap();
        assert_eq!(guardian.level, 7);
    }
}
