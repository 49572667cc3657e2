//! Quest progress tracking.
//!
//! The quest dialogue surface lives outside the engine; what lives here is
//! the progress ledger: per-quest `{status, current, target}` entries whose
//! counters are driven by combat kills and item pickups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::content::{Catalog, QuestKind, QuestTemplate};
use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    NotStarted,
    Active,
    /// Objective met; reward waits on the giver.
    CompleteReady,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub status: QuestStatus,
    pub current_count: u32,
    pub target_count: u32,
}

/// The player's quest ledger, keyed by quest id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuestLog {
    entries: BTreeMap<String, QuestProgress>,
}

impl QuestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, quest_id: &str) -> QuestStatus {
        self.entries
            .get(quest_id)
            .map(|e| e.status)
            .unwrap_or(QuestStatus::NotStarted)
    }

    pub fn progress(&self, quest_id: &str) -> Option<&QuestProgress> {
        self.entries.get(quest_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QuestProgress)> {
        self.entries.iter()
    }

    /// Whether a giver should offer this quest: not yet taken, level met,
    /// prerequisite chain completed.
    pub fn eligible_to_offer(&self, quest: &QuestTemplate, player_level: u32) -> bool {
        if self.status(&quest.id) != QuestStatus::NotStarted {
            return false;
        }
        if player_level < quest.required_level {
            return false;
        }
        match &quest.prerequisite {
            Some(prereq) => self.status(prereq) == QuestStatus::Completed,
            None => true,
        }
    }

    /// Accept a quest. Returns false if it was already taken.
    pub fn accept(&mut self, quest: &QuestTemplate) -> bool {
        if self.entries.contains_key(&quest.id) {
            return false;
        }
        self.entries.insert(
            quest.id.clone(),
            QuestProgress {
                status: QuestStatus::Active,
                current_count: 0,
                target_count: quest.kind.target_count(),
            },
        );
        true
    }

    /// Mark a ready quest as turned in. Returns false unless it was ready.
    pub fn complete(&mut self, quest_id: &str) -> bool {
        match self.entries.get_mut(quest_id) {
            Some(entry) if entry.status == QuestStatus::CompleteReady => {
                entry.status = QuestStatus::Completed;
                true
            }
            _ => false,
        }
    }

    /// Bump counters for a monster kill.
    pub fn record_kill(&mut self, monster_name: &str, catalog: &Catalog, events: &mut Vec<Event>) {
        self.record(catalog, events, |kind| match kind {
            QuestKind::DefeatAny { .. } => true,
            QuestKind::DefeatMonster { monster, .. } => monster.eq_ignore_ascii_case(monster_name),
            QuestKind::FetchItem { .. } => false,
        });
    }

    /// Bump counters for an item pickup.
    pub fn record_pickup(&mut self, item_name: &str, catalog: &Catalog, events: &mut Vec<Event>) {
        self.record(catalog, events, |kind| match kind {
            QuestKind::FetchItem { item, .. } => item.eq_ignore_ascii_case(item_name),
            _ => false,
        });
    }

    fn record(
        &mut self,
        catalog: &Catalog,
        events: &mut Vec<Event>,
        matches: impl Fn(&QuestKind) -> bool,
    ) {
        for (id, entry) in self.entries.iter_mut() {
            if entry.status != QuestStatus::Active {
                continue;
            }
            let Some(quest) = catalog.quest(id) else {
                continue;
            };
            if !matches(&quest.kind) || entry.current_count >= entry.target_count {
                continue;
            }
            entry.current_count += 1;
            events.push(Event::QuestProgress {
                name: quest.name.clone(),
                current: entry.current_count,
                target: entry.target_count,
            });
            if entry.current_count >= entry.target_count {
                entry.status = QuestStatus::CompleteReady;
                events.push(Event::QuestReady {
                    name: quest.name.clone(),
                    giver: quest.giver.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_catalog;

    #[test]
    fn kill_counters_advance_matching_quests_only() {
        let catalog = builtin_catalog();
        let mut log = QuestLog::new();
        log.accept(catalog.quest("rat_cull").unwrap());

        let mut events = Vec::new();
        log.record_kill("Giant Rat", &catalog, &mut events);
        log.record_kill("Cave Goblin", &catalog, &mut events);
        assert_eq!(log.progress("rat_cull").unwrap().current_count, 1);

        log.record_kill("giant rat", &catalog, &mut events);
        log.record_kill("Giant Rat", &catalog, &mut events);
        let entry = log.progress("rat_cull").unwrap();
        assert_eq!(entry.current_count, 3);
        assert_eq!(entry.status, QuestStatus::CompleteReady);
        assert!(events.iter().any(|e| matches!(e, Event::QuestReady { .. })));

        // Ready quests stop counting.
        log.record_kill("Giant Rat", &catalog, &mut events);
        assert_eq!(log.progress("rat_cull").unwrap().current_count, 3);
    }

    #[test]
    fn prerequisites_gate_offers() {
        let catalog = builtin_catalog();
        let mut log = QuestLog::new();
        let bone = catalog.quest("bone_collector").unwrap();

        assert!(!log.eligible_to_offer(bone, 5), "prereq not completed");

        log.accept(catalog.quest("rat_cull").unwrap());
        let mut events = Vec::new();
        for _ in 0..3 {
            log.record_kill("Giant Rat", &catalog, &mut events);
        }
        log.complete("rat_cull");
        assert!(log.eligible_to_offer(bone, 5));
        assert!(!log.eligible_to_offer(bone, 1), "level gate");
    }

    #[test]
    fn fetch_quests_count_pickups() {
        let catalog = builtin_catalog();
        let mut log = QuestLog::new();
        log.accept(catalog.quest("ember_fetch").unwrap());
        let mut events = Vec::new();
        log.record_pickup("Ember Crystal", &catalog, &mut events);
        log.record_pickup("Iron Scrap", &catalog, &mut events);
        assert_eq!(log.progress("ember_fetch").unwrap().current_count, 1);
    }
}
