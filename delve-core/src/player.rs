//! The player aggregate.
//!
//! One mutable struct carries everything the run needs to know about the
//! adventurer: stats, leveling, inventory, equipment, keychain, timed
//! effects, quest ledger. Functions mutate it in place and report outcomes
//! through [`Event`]s rather than echoing state back.

use serde::{Deserialize, Serialize};

use crate::config::{
    self, BASE_ATTACK_POWER, BASE_ATTACK_VARIANCE, BASE_CRIT_CHANCE, BASE_CRIT_MULTIPLIER,
    BASE_MAX_HP, CRIT_GAIN_PER_LEVEL, HP_GAIN_PER_LEVEL, STARTING_GOLD, STARTING_INVENTORY_SLOTS,
};
use crate::content::{Catalog, ClassTemplate};
use crate::effect::ActiveEffect;
use crate::event::Event;
use crate::item::{ArmorSlot, BoostStat, ConsumableEffect, Item, ItemKind, KeyKind};
use crate::quest::QuestLog;
use crate::stats;

/// The five gear slots plus the open-ended trinket set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub shield: Option<Item>,
    pub body_armor: Option<Item>,
    pub cloak: Option<Item>,
    pub helmet: Option<Item>,
    pub trinkets: Vec<Item>,
}

impl Equipment {
    /// The pieces that contribute to total defense.
    pub fn defensive_pieces(&self) -> impl Iterator<Item = &Item> {
        [&self.shield, &self.body_armor, &self.cloak, &self.helmet]
            .into_iter()
            .flatten()
    }
}

/// What happened when a consumable was used.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UseOutcome {
    /// Whether the use costs the player's combat turn.
    pub consumed_turn: bool,
    /// Status effect name to apply to the current monster, if any.
    pub inflict_monster: Option<String>,
}

/// Where a picked-up item ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StowResult {
    Inventory,
    Keychain,
    NoSpace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub name: String,
    pub class_name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub skill_points: u32,
    pub unlocked_skills: Vec<String>,
    /// Class baseline before level growth.
    pub base_attack: i32,
    /// Permanent bonuses from elixirs and the like.
    pub attack_bonus: i32,
    /// Cached effective attack power; see [`Player::recalculate`].
    pub attack_power: i32,
    pub attack_variance: i32,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub gold: u32,
    pub inventory: Vec<Item>,
    pub max_inventory_slots: usize,
    pub keychain: Vec<Item>,
    pub equipment: Equipment,
    pub effects: Vec<ActiveEffect>,
    pub quests: QuestLog,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "Adventurer".into(),
            class_name: String::new(),
            hp: BASE_MAX_HP,
            max_hp: BASE_MAX_HP,
            level: 1,
            xp: 0,
            xp_to_next_level: config::xp_to_next_level(1),
            skill_points: 0,
            unlocked_skills: Vec::new(),
            base_attack: BASE_ATTACK_POWER,
            attack_bonus: 0,
            attack_power: BASE_ATTACK_POWER,
            attack_variance: BASE_ATTACK_VARIANCE,
            crit_chance: BASE_CRIT_CHANCE,
            crit_multiplier: BASE_CRIT_MULTIPLIER,
            gold: STARTING_GOLD,
            inventory: Vec::new(),
            max_inventory_slots: STARTING_INVENTORY_SLOTS,
            keychain: Vec::new(),
            equipment: Equipment::default(),
            effects: Vec::new(),
            quests: QuestLog::new(),
        }
    }
}

impl Player {
    /// Create a level-1 character of the given class, with its starting
    /// equipment cloned out of the catalog.
    pub fn new(name: impl Into<String>, class: &ClassTemplate, catalog: &Catalog) -> Self {
        let mut player = Player {
            name: name.into(),
            class_name: class.name.clone(),
            hp: class.starting.max_hp,
            max_hp: class.starting.max_hp,
            base_attack: class.starting.attack_power,
            attack_variance: class.starting.attack_variance,
            crit_chance: class.starting.crit_chance,
            crit_multiplier: class.starting.crit_multiplier,
            ..Player::default()
        };
        for item_name in &class.starting_equipment {
            match catalog.item(item_name) {
                Some(item) => {
                    player.inventory.push(item.clone());
                }
                None => log::warn!("starting equipment '{item_name}' not in catalog; skipped"),
            }
        }
        player.recalculate();
        player
    }

    /// Refresh the cached attack power. Call after any equipment, level, or
    /// permanent-bonus change.
    pub fn recalculate(&mut self) {
        self.attack_power = stats::attack_power(self);
    }

    pub fn total_defense(&self, catalog: &Catalog) -> i32 {
        stats::total_defense(self, catalog)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage, clamping HP at 0.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Restore HP up to the maximum; returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    // ========================================================================
    // Leveling
    // ========================================================================

    /// Award XP, cascading through as many level-ups as the total crosses.
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: u32, catalog: &Catalog, events: &mut Vec<Event>) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.skill_points += 1;
            self.max_hp += HP_GAIN_PER_LEVEL;
            self.hp = self.max_hp;
            self.crit_chance = (self.crit_chance + CRIT_GAIN_PER_LEVEL).min(1.0);
            self.xp_to_next_level = config::xp_to_next_level(self.level);
            self.recalculate();
            gained += 1;
            events.push(Event::LevelUp {
                level: self.level,
                max_hp: self.max_hp,
                attack_power: self.attack_power,
            });
            self.unlock_new_skills(catalog, events);
        }
        gained
    }

    fn unlock_new_skills(&mut self, catalog: &Catalog, events: &mut Vec<Event>) {
        let Some(class) = catalog.class(&self.class_name) else {
            return;
        };
        for skill in &class.skills {
            if skill.unlock_level <= self.level
                && !self
                    .unlocked_skills
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(&skill.name))
            {
                self.unlocked_skills.push(skill.name.clone());
                events.push(Event::SkillLearned {
                    skill: skill.name.clone(),
                });
            }
        }
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Stow an item. Keys always fit on the keychain; everything else needs
    /// a free inventory slot.
    pub fn stow(&mut self, item: Item) -> StowResult {
        if matches!(item.kind, ItemKind::Key { .. }) {
            self.keychain.push(item);
            return StowResult::Keychain;
        }
        if self.inventory.len() >= self.max_inventory_slots {
            return StowResult::NoSpace;
        }
        self.inventory.push(item);
        StowResult::Inventory
    }

    pub fn has_key(&self, kind: KeyKind) -> bool {
        self.keychain
            .iter()
            .any(|k| matches!(k.kind, ItemKind::Key { key } if key == kind))
    }

    pub fn find_item(&self, name: &str) -> Option<usize> {
        self.inventory
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// The strongest healing consumable carried, if any.
    pub fn best_healing_item(&self) -> Option<String> {
        self.inventory
            .iter()
            .filter_map(|i| match &i.kind {
                ItemKind::Consumable {
                    effect: ConsumableEffect::Heal(amount),
                } => Some((i.name.clone(), *amount)),
                _ => None,
            })
            .max_by_key(|(_, amount)| *amount)
            .map(|(name, _)| name)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Equip a carried item by name. The slot's occupant is only replaced by
    /// an equal-or-better piece (damage for weapons, defense for armor);
    /// cursed occupants refuse to come off. Returns true if anything changed.
    pub fn equip(&mut self, name: &str, events: &mut Vec<Event>) -> bool {
        let Some(index) = self.find_item(name) else {
            events.push(Event::ItemNotCarried { item: name.into() });
            return false;
        };
        let item = self.inventory[index].clone();
        match &item.kind {
            ItemKind::Weapon { damage } => {
                self.equip_into(index, SlotId::Weapon, *damage, events)
            }
            ItemKind::Shield { defense } => {
                self.equip_into(index, SlotId::Shield, *defense, events)
            }
            ItemKind::Armor { slot, defense } => {
                let slot = match slot {
                    ArmorSlot::Body => SlotId::BodyArmor,
                    ArmorSlot::Cloak => SlotId::Cloak,
                    ArmorSlot::Helmet => SlotId::Helmet,
                };
                self.equip_into(index, slot, *defense, events)
            }
            ItemKind::Trinket { .. } => {
                if self
                    .equipment
                    .trinkets
                    .iter()
                    .any(|t| t.name.eq_ignore_ascii_case(&item.name))
                {
                    events.push(Event::AlreadyEquipped { item: item.name });
                    return false;
                }
                let item = self.inventory.remove(index);
                events.push(Event::Equipped {
                    item: item.name.clone(),
                    slot: "trinket".into(),
                });
                self.equipment.trinkets.push(item);
                self.recalculate();
                true
            }
            _ => {
                events.push(Event::ItemUnusable { item: item.name });
                false
            }
        }
    }

    fn equip_into(
        &mut self,
        index: usize,
        slot: SlotId,
        new_value: i32,
        events: &mut Vec<Event>,
    ) -> bool {
        let incoming_name = self.inventory[index].name.clone();
        let current = self.slot_mut(slot);
        if let Some(occupant) = current {
            if occupant.name.eq_ignore_ascii_case(&incoming_name) {
                events.push(Event::AlreadyEquipped {
                    item: incoming_name,
                });
                return false;
            }
            if occupant.cursed {
                events.push(Event::CursedCannotUnequip {
                    item: occupant.name.clone(),
                });
                return false;
            }
            let current_value = match slot {
                SlotId::Weapon => occupant.damage().unwrap_or(0),
                _ => occupant.defense().unwrap_or(0),
            };
            if new_value < current_value {
                events.push(Event::EquipRejected {
                    item: incoming_name,
                    item_value: new_value,
                    kept: occupant.name.clone(),
                    kept_value: current_value,
                });
                return false;
            }
        }
        // Swap: incoming leaves the pack, the old occupant (if any) returns
        // to it, so slot count never changes.
        let incoming = self.inventory.remove(index);
        events.push(Event::Equipped {
            item: incoming.name.clone(),
            slot: slot.name().into(),
        });
        let previous = self.slot_mut(slot).replace(incoming);
        if let Some(previous) = previous {
            self.inventory.push(previous);
        }
        self.recalculate();
        true
    }

    /// Unequip by slot name or by the equipped item's name. Needs a free
    /// inventory slot; cursed gear stays on.
    pub fn unequip(&mut self, query: &str, events: &mut Vec<Event>) -> bool {
        let slot = match SlotId::parse(query) {
            Some(slot) => Some(slot),
            None => SlotId::ALL.into_iter().find(|s| {
                self.slot(*s)
                    .as_ref()
                    .is_some_and(|i| i.name.eq_ignore_ascii_case(query))
            }),
        };
        let Some(slot) = slot else {
            // Maybe it's a trinket.
            if let Some(pos) = self
                .equipment
                .trinkets
                .iter()
                .position(|t| t.name.eq_ignore_ascii_case(query))
            {
                if self.inventory.len() >= self.max_inventory_slots {
                    let name = self.equipment.trinkets[pos].name.clone();
                    events.push(Event::InventoryFull { item: name });
                    return false;
                }
                let trinket = self.equipment.trinkets.remove(pos);
                events.push(Event::Unequipped {
                    item: trinket.name.clone(),
                    slot: "trinket".into(),
                });
                self.inventory.push(trinket);
                self.recalculate();
                return true;
            }
            events.push(Event::CommandRejected {
                reason: format!("Nothing called '{query}' is equipped."),
            });
            return false;
        };

        let Some(occupant) = self.slot(slot) else {
            events.push(Event::CommandRejected {
                reason: format!("No {} is equipped.", slot.name()),
            });
            return false;
        };
        if occupant.cursed {
            events.push(Event::CursedCannotUnequip {
                item: occupant.name.clone(),
            });
            return false;
        }
        if self.inventory.len() >= self.max_inventory_slots {
            events.push(Event::InventoryFull {
                item: occupant.name.clone(),
            });
            return false;
        }
        let Some(item) = self.slot_mut(slot).take() else {
            return false;
        };
        events.push(Event::Unequipped {
            item: item.name.clone(),
            slot: slot.name().into(),
        });
        self.inventory.push(item);
        self.recalculate();
        true
    }

    fn slot(&self, slot: SlotId) -> &Option<Item> {
        match slot {
            SlotId::Weapon => &self.equipment.weapon,
            SlotId::Shield => &self.equipment.shield,
            SlotId::BodyArmor => &self.equipment.body_armor,
            SlotId::Cloak => &self.equipment.cloak,
            SlotId::Helmet => &self.equipment.helmet,
        }
    }

    fn slot_mut(&mut self, slot: SlotId) -> &mut Option<Item> {
        match slot {
            SlotId::Weapon => &mut self.equipment.weapon,
            SlotId::Shield => &mut self.equipment.shield,
            SlotId::BodyArmor => &mut self.equipment.body_armor,
            SlotId::Cloak => &mut self.equipment.cloak,
            SlotId::Helmet => &mut self.equipment.helmet,
        }
    }

    // ========================================================================
    // Consumables
    // ========================================================================

    /// Use a carried item by name. In combat only heal/harm/cure/inflict/
    /// flavor consumables are allowed; stat boosts and backpacks want calm.
    pub fn use_item(&mut self, name: &str, in_combat: bool, events: &mut Vec<Event>) -> UseOutcome {
        let mut outcome = UseOutcome::default();
        let Some(index) = self.find_item(name) else {
            events.push(Event::ItemNotCarried { item: name.into() });
            return outcome;
        };
        let item = self.inventory[index].clone();
        match &item.kind {
            ItemKind::Consumable { effect } => match effect {
                ConsumableEffect::Heal(amount) => {
                    let healed = self.heal(*amount);
                    events.push(Event::Healed {
                        amount: healed,
                        hp: self.hp,
                        max_hp: self.max_hp,
                    });
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
                ConsumableEffect::Harm(amount) => {
                    self.take_damage(*amount);
                    events.push(Event::Harmed {
                        item: item.name.clone(),
                        damage: *amount,
                    });
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
                ConsumableEffect::Cure { effect } => {
                    let before = self.effects.len();
                    self.effects.retain(|e| !e.name.eq_ignore_ascii_case(effect));
                    if self.effects.len() < before {
                        events.push(Event::EffectCured {
                            effect: effect.clone(),
                        });
                    } else {
                        events.push(Event::Info(format!(
                            "You use the {}, but nothing needed curing.",
                            item.name
                        )));
                    }
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
                ConsumableEffect::Inflict { effect } => {
                    if !in_combat {
                        events.push(Event::ItemUnusable { item: item.name });
                        return outcome;
                    }
                    outcome.inflict_monster = Some(effect.clone());
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
                ConsumableEffect::StatBoost { stat, amount } => {
                    if in_combat {
                        events.push(Event::ItemUnusable { item: item.name });
                        return outcome;
                    }
                    match stat {
                        BoostStat::AttackPower => {
                            self.attack_bonus += amount;
                            self.recalculate();
                            events.push(Event::StatBoosted {
                                stat: "attack power".into(),
                                amount: *amount,
                            });
                        }
                        BoostStat::MaxHp => {
                            self.max_hp += amount;
                            self.hp += amount;
                            events.push(Event::StatBoosted {
                                stat: "max HP".into(),
                                amount: *amount,
                            });
                        }
                    }
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
                ConsumableEffect::Flavor => {
                    events.push(Event::Info(format!(
                        "You consume the {}. It tastes... unique.",
                        item.name
                    )));
                    self.inventory.remove(index);
                    outcome.consumed_turn = true;
                }
            },
            ItemKind::Backpack { extra_slots } => {
                if in_combat {
                    events.push(Event::ItemUnusable { item: item.name });
                    return outcome;
                }
                self.max_inventory_slots += extra_slots;
                self.inventory.remove(index);
                events.push(Event::SlotsExpanded {
                    extra: *extra_slots,
                    total: self.max_inventory_slots,
                });
                outcome.consumed_turn = true;
            }
            _ => {
                events.push(Event::ItemUnusable { item: item.name });
            }
        }
        outcome
    }
}

/// The five fixed equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotId {
    Weapon,
    Shield,
    BodyArmor,
    Cloak,
    Helmet,
}

impl SlotId {
    const ALL: [SlotId; 5] = [
        SlotId::Weapon,
        SlotId::Shield,
        SlotId::BodyArmor,
        SlotId::Cloak,
        SlotId::Helmet,
    ];

    fn name(&self) -> &'static str {
        match self {
            SlotId::Weapon => "weapon",
            SlotId::Shield => "shield",
            SlotId::BodyArmor => "body armor",
            SlotId::Cloak => "cloak",
            SlotId::Helmet => "helmet",
        }
    }

    fn parse(text: &str) -> Option<SlotId> {
        match text.to_ascii_lowercase().as_str() {
            "weapon" => Some(SlotId::Weapon),
            "shield" => Some(SlotId::Shield),
            "armor" | "body" | "body armor" => Some(SlotId::BodyArmor),
            "cloak" => Some(SlotId::Cloak),
            "helmet" | "helm" => Some(SlotId::Helmet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_catalog;
    use crate::item::CurseEffect;
    use crate::testing::test_player;

    fn weapon(name: &str, damage: i32) -> Item {
        Item::new(name, ItemKind::Weapon { damage })
    }

    #[test]
    fn exact_threshold_gives_exactly_one_level() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        let need = player.xp_to_next_level;
        let gained = player.add_xp(need, &catalog, &mut events);
        assert_eq!(gained, 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 0);
    }

    #[test]
    fn oversized_award_cascades_levels() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        // 100 (1->2) + 150 (2->3) = 250; award past both thresholds.
        let gained = player.add_xp(260, &catalog, &mut events);
        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.xp, 10);
        assert_eq!(player.hp, player.max_hp, "level-up heals to full");
    }

    #[test]
    fn repeated_awards_do_not_drift() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        for _ in 0..3 {
            let need = player.xp_to_next_level;
            assert_eq!(player.add_xp(need, &catalog, &mut events), 1);
            assert_eq!(player.xp, 0);
        }
        assert_eq!(player.level, 4);
    }

    #[test]
    fn equip_rejects_downgrade() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        player.inventory.push(weapon("Steel Longsword", 8));
        player.inventory.push(weapon("Rusty Dagger", 5));
        assert!(player.equip("Steel Longsword", &mut events));
        assert!(!player.equip("Rusty Dagger", &mut events));
        assert_eq!(
            player.equipment.weapon.as_ref().unwrap().name,
            "Steel Longsword"
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::EquipRejected { item, .. } if item == "Rusty Dagger")));
        // The rejected dagger is still carried.
        assert!(player.find_item("Rusty Dagger").is_some());
    }

    #[test]
    fn equip_swap_returns_old_piece_to_pack() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        player.inventory.push(weapon("Iron Sword", 6));
        player.inventory.push(weapon("Steel Longsword", 9));
        assert!(player.equip("Iron Sword", &mut events));
        assert!(player.equip("Steel Longsword", &mut events));
        assert!(player.find_item("Iron Sword").is_some());
        assert_eq!(player.attack_power, player.base_attack + 9);
    }

    #[test]
    fn cursed_gear_blocks_unequip_and_replacement() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        player
            .inventory
            .push(weapon("Bloodthirsty Axe", 14).with_curse(CurseEffect {
                hp_drain: 2,
                ..CurseEffect::default()
            }));
        player.inventory.push(weapon("Kingly Blade", 20));
        assert!(player.equip("Bloodthirsty Axe", &mut events));
        assert!(!player.equip("Kingly Blade", &mut events));
        assert!(!player.unequip("weapon", &mut events));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CursedCannotUnequip { .. })));
    }

    #[test]
    fn keys_go_to_keychain_regardless_of_pack_space() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        player.max_inventory_slots = 0;
        let key = catalog.item("Rusty Key").unwrap().clone();
        assert_eq!(player.stow(key), StowResult::Keychain);
        assert!(player.has_key(KeyKind::Rusty));
        assert!(!player.has_key(KeyKind::Silver));
    }

    #[test]
    fn stat_boost_refused_in_combat() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        let mut events = Vec::new();
        player
            .inventory
            .push(catalog.item("Warrior's Draught").unwrap().clone());
        let outcome = player.use_item("Warrior's Draught", true, &mut events);
        assert!(!outcome.consumed_turn);
        assert!(player.find_item("Warrior's Draught").is_some());

        let outcome = player.use_item("Warrior's Draught", false, &mut events);
        assert!(outcome.consumed_turn);
        assert_eq!(player.attack_bonus, 2);
    }

    #[test]
    fn best_healing_item_picks_strongest() {
        let catalog = builtin_catalog();
        let mut player = test_player(&catalog);
        player
            .inventory
            .push(catalog.item("Healing Potion").unwrap().clone());
        player
            .inventory
            .push(catalog.item("Greater Healing Potion").unwrap().clone());
        assert_eq!(
            player.best_healing_item().as_deref(),
            Some("Greater Healing Potion")
        );
    }

    #[test]
    fn skills_unlock_with_levels() {
        let catalog = builtin_catalog();
        let warrior = catalog.class("Warrior").unwrap();
        let mut player = Player::new("Brand", warrior, &catalog);
        let mut events = Vec::new();
        player.add_xp(100, &catalog, &mut events);
        assert!(player
            .unlocked_skills
            .iter()
            .any(|s| s == "Power Strike"));
        assert!(!player.unlocked_skills.iter().any(|s| s == "Battle Cry"));
    }
}
