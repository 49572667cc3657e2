//! Structured narration events.
//!
//! The engine never prints. Every state transition pushes an [`Event`];
//! the presentation layer renders them (the bundled CLI just uses the
//! `Display` impls) and the audio collaborator watches for
//! [`Event::ModeChanged`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::item::KeyKind;
use crate::room::Direction;

/// Background mode hint for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Ambient,
    Combat,
}

/// One narratable state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ------------------------------------------------------------------
    // Exploration
    // ------------------------------------------------------------------
    RoomEntered {
        description: String,
        travelled: u32,
    },
    ExitBlocked {
        direction: Direction,
        key: KeyKind,
    },
    DoorUnlocked {
        direction: Direction,
        key: KeyKind,
    },
    NoExitThatWay {
        direction: Direction,
    },
    HazardTriggered {
        name: String,
        damage: i32,
        absorbed: i32,
    },
    HazardRevealed {
        name: String,
    },
    HazardDisarmed {
        name: String,
    },
    NothingFound,
    ShrineBlessing {
        shrine: String,
        effect: String,
    },
    ShrineCurse {
        shrine: String,
        effect: String,
    },
    PuzzleSolved {
        reward: String,
    },
    PuzzleFailed,
    NpcSpeech {
        name: String,
        line: String,
    },

    // ------------------------------------------------------------------
    // Quests
    // ------------------------------------------------------------------
    QuestAccepted {
        name: String,
    },
    QuestProgress {
        name: String,
        current: u32,
        target: u32,
    },
    QuestReady {
        name: String,
        giver: String,
    },
    QuestCompleted {
        name: String,
        gold: u32,
        xp: u32,
    },

    // ------------------------------------------------------------------
    // Items and equipment
    // ------------------------------------------------------------------
    ItemTaken {
        item: String,
    },
    ItemDropped {
        item: String,
    },
    ItemOnFloor {
        item: String,
    },
    ItemLost {
        item: String,
    },
    InventoryFull {
        item: String,
    },
    ItemNotCarried {
        item: String,
    },
    ItemUnusable {
        item: String,
    },
    Healed {
        amount: i32,
        hp: i32,
        max_hp: i32,
    },
    Harmed {
        item: String,
        damage: i32,
    },
    SlotsExpanded {
        extra: usize,
        total: usize,
    },
    StatBoosted {
        stat: String,
        amount: i32,
    },
    Equipped {
        item: String,
        slot: String,
    },
    EquipRejected {
        item: String,
        item_value: i32,
        kept: String,
        kept_value: i32,
    },
    AlreadyEquipped {
        item: String,
    },
    Unequipped {
        item: String,
        slot: String,
    },
    CursedCannotUnequip {
        item: String,
    },

    // ------------------------------------------------------------------
    // Status effects
    // ------------------------------------------------------------------
    EffectApplied {
        target: String,
        effect: String,
    },
    EffectTick {
        target: String,
        effect: String,
        damage: i32,
    },
    EffectExpired {
        target: String,
        effect: String,
    },
    EffectCured {
        effect: String,
    },
    Stunned {
        target: String,
    },

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------
    ModeChanged {
        mode: GameMode,
    },
    CombatStarted {
        monster: String,
        monster_hp: i32,
        player_hp: i32,
        player_max_hp: i32,
    },
    HordeApproaches {
        name: String,
        size: u32,
    },
    HordeBattle {
        index: u32,
        total: u32,
        monster: String,
    },
    HordeCleared {
        name: String,
        gold: u32,
        xp: u32,
    },
    AttackHit {
        attacker: String,
        target: String,
        damage: i32,
        critical: bool,
    },
    AttackMissed {
        attacker: String,
    },
    CurseDrain {
        item: String,
        damage: i32,
    },
    SkillUsed {
        skill: String,
    },
    SkillUnknown {
        skill: String,
    },
    SkillLearned {
        skill: String,
    },
    FleeSucceeded,
    FleeFailed,
    MonsterDefeated {
        name: String,
    },
    GuardianAppears {
        monster: String,
    },
    GoldGained {
        amount: u32,
        total: u32,
    },
    XpGained {
        amount: u32,
        total: u32,
    },
    LevelUp {
        level: u32,
        max_hp: i32,
        attack_power: i32,
    },
    PlayerDied {
        cause: String,
    },
    RunWon {
        artifact: String,
    },

    // ------------------------------------------------------------------
    // Meta
    // ------------------------------------------------------------------
    CommandRejected {
        reason: String,
    },
    /// Informational text that is not a state transition (status screens,
    /// hints). Kept out of the structured variants on purpose.
    Info(String),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::RoomEntered {
                description,
                travelled,
            } => write!(f, "[Room {travelled}] {description}"),
            Event::ExitBlocked { direction, key } => {
                write!(f, "The {direction} exit is locked. It takes a {key} key.")
            }
            Event::DoorUnlocked { direction, key } => {
                write!(f, "Your {key} key turns. The {direction} door swings open.")
            }
            Event::NoExitThatWay { direction } => write!(f, "You can't go {direction}."),
            Event::HazardTriggered {
                name,
                damage,
                absorbed,
            } => {
                if *absorbed > 0 {
                    write!(
                        f,
                        "{name} catches you for {damage} damage ({absorbed} absorbed by armor)!"
                    )
                } else {
                    write!(f, "{name} catches you for {damage} damage!")
                }
            }
            Event::HazardRevealed { name } => write!(f, "You spot a hidden {name}!"),
            Event::HazardDisarmed { name } => write!(f, "You disarm the {name}."),
            Event::NothingFound => write!(f, "You find nothing of note."),
            Event::ShrineBlessing { shrine, effect } => {
                write!(f, "The {shrine} glows warmly. {effect}")
            }
            Event::ShrineCurse { shrine, effect } => {
                write!(f, "The {shrine} flares with cold light. {effect}")
            }
            Event::PuzzleSolved { reward } => write!(f, "The puzzle yields: {reward}."),
            Event::PuzzleFailed => write!(f, "That is not the answer."),
            Event::NpcSpeech { name, line } => write!(f, "{name}: \"{line}\""),
            Event::QuestAccepted { name } => write!(f, "Quest accepted: {name}."),
            Event::QuestProgress {
                name,
                current,
                target,
            } => write!(f, "Quest update: {name} ({current}/{target})."),
            Event::QuestReady { name, giver } => {
                write!(f, "Quest complete: {name}! Return to {giver} for your reward.")
            }
            Event::QuestCompleted { name, gold, xp } => {
                write!(f, "Quest turned in: {name} (+{gold} gold, +{xp} XP).")
            }
            Event::ItemTaken { item } => write!(f, "You take the {item}."),
            Event::ItemDropped { item } => write!(f, "You drop the {item}."),
            Event::ItemOnFloor { item } => {
                write!(f, "Your pack is full; the {item} lands on the floor.")
            }
            Event::ItemLost { item } => {
                write!(f, "The {item} is lost; no room in your pack or on the floor.")
            }
            Event::InventoryFull { item } => {
                write!(f, "Your pack is full. You can't carry the {item}.")
            }
            Event::ItemNotCarried { item } => write!(f, "You aren't carrying a {item}."),
            Event::ItemUnusable { item } => {
                write!(f, "You can't use the {item} like that right now.")
            }
            Event::Healed { amount, hp, max_hp } => {
                write!(f, "You recover {amount} HP ({hp}/{max_hp}).")
            }
            Event::Harmed { item, damage } => {
                write!(f, "The {item} disagrees with you. {damage} damage!")
            }
            Event::SlotsExpanded { extra, total } => {
                write!(f, "Your pack grows by {extra} slots ({total} total).")
            }
            Event::StatBoosted { stat, amount } => {
                write!(f, "You feel permanently stronger (+{amount} {stat}).")
            }
            Event::Equipped { item, slot } => write!(f, "You equip the {item} ({slot})."),
            Event::EquipRejected {
                item,
                item_value,
                kept,
                kept_value,
            } => write!(
                f,
                "Your {kept} ({kept_value}) outclasses the {item} ({item_value}); you keep it."
            ),
            Event::AlreadyEquipped { item } => write!(f, "The {item} is already equipped."),
            Event::Unequipped { item, slot } => write!(f, "You unequip the {item} ({slot})."),
            Event::CursedCannotUnequip { item } => {
                write!(f, "The {item} is cursed! It will not come off.")
            }
            Event::EffectApplied { target, effect } => write!(f, "{target} now suffers {effect}!"),
            Event::EffectTick {
                target,
                effect,
                damage,
            } => write!(f, "{target} takes {damage} damage from {effect}."),
            Event::EffectExpired { target, effect } => {
                write!(f, "The {effect} on {target} wears off.")
            }
            Event::EffectCured { effect } => write!(f, "The {effect} is cured."),
            Event::Stunned { target } => write!(f, "{target} is stunned and cannot act!"),
            Event::ModeChanged { mode } => match mode {
                GameMode::Combat => write!(f, "~ steel rings out ~"),
                GameMode::Ambient => write!(f, "~ the dungeon falls quiet ~"),
            },
            Event::CombatStarted {
                monster,
                monster_hp,
                player_hp,
                player_max_hp,
            } => write!(
                f,
                "A {monster} attacks! (you: {player_hp}/{player_max_hp} HP, it: {monster_hp} HP)"
            ),
            Event::HordeApproaches { name, size } => {
                write!(f, "A {name} descends on you, {size} strong!")
            }
            Event::HordeBattle {
                index,
                total,
                monster,
            } => write!(f, "Horde battle {index}/{total}: a {monster} steps up."),
            Event::HordeCleared { name, gold, xp } => {
                write!(f, "The {name} is broken! Spoils: {gold} gold, {xp} XP.")
            }
            Event::AttackHit {
                attacker,
                target,
                damage,
                critical,
            } => {
                if *critical {
                    write!(f, "{attacker} lands a CRITICAL HIT on {target} for {damage} damage!")
                } else {
                    write!(f, "{attacker} hits {target} for {damage} damage.")
                }
            }
            Event::AttackMissed { attacker } => write!(f, "{attacker} misses!"),
            Event::CurseDrain { item, damage } => {
                write!(f, "Your {item} drains {damage} HP from you!")
            }
            Event::SkillUsed { skill } => write!(f, "You unleash {skill}!"),
            Event::SkillUnknown { skill } => write!(f, "You haven't learned {skill}."),
            Event::SkillLearned { skill } => write!(f, "You have learned {skill}!"),
            Event::FleeSucceeded => write!(f, "You slip away from the fight!"),
            Event::FleeFailed => write!(f, "You try to run, but your path is blocked!"),
            Event::MonsterDefeated { name } => write!(f, "The {name} collapses, defeated!"),
            Event::GuardianAppears { monster } => write!(
                f,
                "The dungeon trembles. A {monster} manifests, enraged by the theft!"
            ),
            Event::GoldGained { amount, total } => {
                write!(f, "You gain {amount} gold ({total} total).")
            }
            Event::XpGained { amount, total } => write!(f, "You gain {amount} XP ({total} total)."),
            Event::LevelUp {
                level,
                max_hp,
                attack_power,
            } => write!(
                f,
                "LEVEL UP! You reach level {level} (HP {max_hp}, attack {attack_power}). You feel revitalized."
            ),
            Event::PlayerDied { cause } => write!(f, "You collapse. ({cause}) The run is over."),
            Event::RunWon { artifact } => {
                write!(f, "With the {artifact} in hand and its guardian slain, you win!")
            }
            Event::CommandRejected { reason } => write!(f, "{reason}"),
            Event::Info(text) => write!(f, "{text}"),
        }
    }
}
