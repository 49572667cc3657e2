//! Live monster instances.
//!
//! A [`Monster`] is a deep copy of a catalog template, created fresh each
//! time a room's monster slot fills or a horde member steps up, and
//! discarded when it dies or is left behind.

use serde::{Deserialize, Serialize};

use crate::content::MonsterTemplate;
use crate::effect::ActiveEffect;
use crate::item::OnHitEffect;
use crate::rng::GameRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub attack_power: i32,
    pub attack_variance: i32,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub defense: i32,
    pub xp_reward: u32,
    pub gold_min: u32,
    pub gold_max: u32,
    pub item_drop: Option<String>,
    pub on_hit: Vec<OnHitEffect>,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
    /// Set on the monster that spawns when the winning item is taken.
    #[serde(default)]
    pub is_boss_guardian: bool,
}

impl Monster {
    pub fn from_template(template: &MonsterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            level: template.level,
            hp: template.health,
            max_hp: template.health,
            attack_power: template.damage,
            attack_variance: template.damage_variance,
            crit_chance: template.crit_chance,
            crit_multiplier: template.crit_multiplier,
            defense: template.defense,
            xp_reward: template.xp_reward,
            gold_min: template.gold_min,
            gold_max: template.gold_max,
            item_drop: template.item_drop.clone(),
            on_hit: template.on_hit.clone(),
            effects: Vec::new(),
            is_boss_guardian: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage, clamping HP at 0.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Roll this monster's gold drop.
    pub fn roll_gold(&self, rng: &mut GameRng) -> u32 {
        rng.roll_range_u32(self.gold_min, self.gold_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_are_independent_of_the_template() {
        let template = MonsterTemplate::new("Cave Goblin", 1, 16, 4);
        let mut a = Monster::from_template(&template);
        a.take_damage(10);
        let b = Monster::from_template(&template);
        assert_eq!(a.hp, 6);
        assert_eq!(b.hp, 16);
        assert_eq!(template.health, 16);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let template = MonsterTemplate::new("Giant Rat", 1, 12, 3);
        let mut m = Monster::from_template(&template);
        m.take_damage(100);
        assert_eq!(m.hp, 0);
        assert!(!m.is_alive());
    }
}
