//! Timed status effects and the per-turn tick engine.
//!
//! Effects live on whichever character carries them and are processed in
//! insertion order, once per turn that character takes. The tick applies the
//! effect's instantaneous contribution, then decrements its duration;
//! anything at zero or below is removed after its final tick.
//!
//! Duration convention: the application-turn tick counts, so callers that
//! want an effect to last N *following* turns store `N + 1`
//! ([`ActiveEffect::lasting`] does this).

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Per-turn stat modifiers accumulated from active effects. Applied on top
/// of base stats for a single turn and never persisted back.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatModifiers {
    pub attack_power: i32,
    pub defense: i32,
    pub crit_chance: f64,
    /// Added to the base 1.0 accuracy; blindness-style effects push it
    /// negative.
    pub accuracy: f64,
}

impl StatModifiers {
    pub fn is_neutral(&self) -> bool {
        *self == StatModifiers::default()
    }
}

/// What an effect does on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    AttackModifier(i32),
    DefenseModifier(i32),
    CritModifier(f64),
    AccuracyModifier(f64),
    DamageOverTime(i32),
    Stun,
}

/// A status effect currently riding on a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub name: String,
    pub kind: EffectKind,
    pub remaining_turns: i32,
}

impl ActiveEffect {
    /// An effect that ticks exactly `turns` times, counting the
    /// application turn.
    pub fn new(name: impl Into<String>, kind: EffectKind, turns: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            remaining_turns: turns,
        }
    }

    /// An effect meant to last `turns` full turns *after* the one it was
    /// applied on.
    pub fn lasting(name: impl Into<String>, kind: EffectKind, turns: i32) -> Self {
        Self::new(name, kind, turns + 1)
    }
}

/// Result of ticking one character's effect list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// HP after damage-over-time, clamped at 0.
    pub hp: i32,
    /// Whether the character loses its action this turn.
    pub stunned: bool,
    /// Aggregated stat modifiers for this turn only.
    pub modifiers: StatModifiers,
}

/// Tick every effect on a character, in insertion order.
///
/// Emits an [`Event::EffectTick`] per damage tick and an
/// [`Event::EffectExpired`] when an effect wears off. Same-stat modifiers
/// simply sum.
pub fn tick_effects(
    effects: &mut Vec<ActiveEffect>,
    hp: i32,
    carrier: &str,
    events: &mut Vec<Event>,
) -> TickOutcome {
    let mut outcome = TickOutcome {
        hp,
        stunned: false,
        modifiers: StatModifiers::default(),
    };

    let mut index = 0;
    while index < effects.len() {
        let effect = &mut effects[index];
        match effect.kind {
            EffectKind::AttackModifier(amount) => outcome.modifiers.attack_power += amount,
            EffectKind::DefenseModifier(amount) => outcome.modifiers.defense += amount,
            EffectKind::CritModifier(amount) => outcome.modifiers.crit_chance += amount,
            EffectKind::AccuracyModifier(amount) => outcome.modifiers.accuracy += amount,
            EffectKind::DamageOverTime(damage) => {
                outcome.hp = (outcome.hp - damage).max(0);
                events.push(Event::EffectTick {
                    target: carrier.to_string(),
                    effect: effect.name.clone(),
                    damage,
                });
            }
            EffectKind::Stun => outcome.stunned = true,
        }

        effect.remaining_turns -= 1;
        if effect.remaining_turns <= 0 {
            events.push(Event::EffectExpired {
                target: carrier.to_string(),
                effect: effect.name.clone(),
            });
            effects.remove(index);
        } else {
            index += 1;
        }
    }

    outcome
}

/// Sum the stat modifiers of a list without ticking it. Used for the
/// defender's side of a swing, where the defender's own turn (and tick)
/// hasn't come yet.
pub fn passive_modifiers(effects: &[ActiveEffect]) -> StatModifiers {
    let mut mods = StatModifiers::default();
    for effect in effects {
        match effect.kind {
            EffectKind::AttackModifier(amount) => mods.attack_power += amount,
            EffectKind::DefenseModifier(amount) => mods.defense += amount,
            EffectKind::CritModifier(amount) => mods.crit_chance += amount,
            EffectKind::AccuracyModifier(amount) => mods.accuracy += amount,
            EffectKind::DamageOverTime(_) | EffectKind::Stun => {}
        }
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(effects: &mut Vec<ActiveEffect>, hp: i32) -> TickOutcome {
        let mut events = Vec::new();
        tick_effects(effects, hp, "Test", &mut events)
    }

    #[test]
    fn effect_ticks_exactly_duration_times() {
        let mut effects = vec![ActiveEffect::new(
            "Poison",
            EffectKind::DamageOverTime(3),
            3,
        )];
        let mut hp = 50;
        for _ in 0..3 {
            hp = tick(&mut effects, hp).hp;
        }
        assert_eq!(hp, 41);
        assert!(effects.is_empty());
        // A fourth tick has nothing left to apply.
        assert_eq!(tick(&mut effects, hp).hp, 41);
    }

    #[test]
    fn expired_effect_stops_contributing() {
        let mut effects = vec![ActiveEffect::new(
            "Battle Fury",
            EffectKind::AttackModifier(4),
            1,
        )];
        let first = tick(&mut effects, 10);
        assert_eq!(first.modifiers.attack_power, 4);
        let second = tick(&mut effects, 10);
        assert_eq!(second.modifiers.attack_power, 0);
    }

    #[test]
    fn same_stat_modifiers_sum() {
        let mut effects = vec![
            ActiveEffect::new("Weakness", EffectKind::AttackModifier(-2), 2),
            ActiveEffect::new("Rally", EffectKind::AttackModifier(5), 2),
        ];
        let outcome = tick(&mut effects, 10);
        assert_eq!(outcome.modifiers.attack_power, 3);
    }

    #[test]
    fn stun_does_not_block_other_effects() {
        let mut effects = vec![
            ActiveEffect::new("Stun", EffectKind::Stun, 1),
            ActiveEffect::new("Burning", EffectKind::DamageOverTime(2), 2),
        ];
        let outcome = tick(&mut effects, 10);
        assert!(outcome.stunned);
        assert_eq!(outcome.hp, 8);
    }

    #[test]
    fn dot_clamps_hp_at_zero() {
        let mut effects = vec![ActiveEffect::new(
            "Poison",
            EffectKind::DamageOverTime(9),
            2,
        )];
        let outcome = tick(&mut effects, 5);
        assert_eq!(outcome.hp, 0);
    }

    #[test]
    fn lasting_adds_application_turn() {
        let effect = ActiveEffect::lasting("Stun", EffectKind::Stun, 1);
        assert_eq!(effect.remaining_turns, 2);
    }

    #[test]
    fn wear_off_emits_event() {
        let mut effects = vec![ActiveEffect::new("Stun", EffectKind::Stun, 1)];
        let mut events = Vec::new();
        tick_effects(&mut effects, 10, "the goblin", &mut events);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::EffectExpired { target, effect } if target == "the goblin" && effect == "Stun"
        )));
    }
}
