//! Room content population.
//!
//! Fills a freshly generated room with at most one primary feature through
//! a fixed precedence chain of independent rolls; the first hit wins and
//! everything later is skipped. All draws come from the session RNG.

use crate::config::{
    CRAFTING_STATION_SPAWN_CHANCE, HAZARD_SPAWN_THRESHOLD, HORDE_SPAWN_CHANCE, INN_SPAWN_CHANCE,
    ITEM_SPAWN_THRESHOLD, MONSTER_SPAWN_THRESHOLD, NPC_SPAWN_THRESHOLD, PUZZLE_SPAWN_CHANCE,
    QUEST_GIVER_SPAWN_CHANCE, SHRINE_SPAWN_CHANCE, VENDOR_SPAWN_CHANCE,
    WINNING_ITEM_MIN_PLAYER_LEVEL, WINNING_ITEM_SPAWN_CHANCE,
};
use crate::content::{Catalog, NpcRole};
use crate::monster::Monster;
use crate::quest::QuestLog;
use crate::rng::GameRng;
use crate::room::RoomFeature;

/// Compose a room description from the catalog vocabulary.
pub fn describe_room(rng: &mut GameRng, catalog: &Catalog) -> String {
    let vocab = &catalog.vocabulary;
    match (
        rng.pick(&vocab.adjectives),
        rng.pick(&vocab.room_types),
        rng.pick(&vocab.details),
    ) {
        (Some(adj), Some(kind), Some(detail)) => {
            format!("You are in a {adj} {kind}. You notice {detail}.")
        }
        _ => "You are in a featureless room.".to_string(),
    }
}

/// Roll the primary feature for a new room. Precedence: inn, crafting
/// station, horde, vendor, shrine, puzzle, quest giver, winning item, then
/// the weighted secondary roll over item/npc/hazard/monster.
pub fn roll_feature(
    rng: &mut GameRng,
    catalog: &Catalog,
    player_level: u32,
    quests: &QuestLog,
) -> Option<RoomFeature> {
    if rng.chance(INN_SPAWN_CHANCE) {
        return Some(RoomFeature::Inn);
    }

    if rng.chance(CRAFTING_STATION_SPAWN_CHANCE) {
        if let Some(kind) = rng.pick(&["Altar", "Anvil"]) {
            return Some(RoomFeature::CraftingStation {
                kind: (*kind).into(),
            });
        }
    }

    if rng.chance(HORDE_SPAWN_CHANCE) {
        if let Some(horde) = rng.pick(&catalog.hordes) {
            return Some(RoomFeature::Horde {
                horde: horde.clone(),
            });
        }
    }

    // Drawn before the winning-item gate, matching the reference behavior:
    // one roll decides both the artifact chance and the secondary bucket.
    let content_roll = rng.roll();

    if rng.chance(VENDOR_SPAWN_CHANCE) {
        if let Some(vendor) = catalog
            .npcs
            .iter()
            .find(|n| matches!(n.role, NpcRole::Vendor))
        {
            return Some(RoomFeature::Vendor {
                npc: vendor.name.clone(),
                dialogue: vendor.dialogue.clone(),
            });
        }
    }

    if rng.chance(SHRINE_SPAWN_CHANCE) {
        if let Some(shrine) = rng.pick(&catalog.shrines) {
            return Some(RoomFeature::Shrine {
                shrine: shrine.clone(),
                used: false,
            });
        }
    }

    if rng.chance(PUZZLE_SPAWN_CHANCE) {
        if let Some(puzzle) = rng.pick(&catalog.puzzles) {
            return Some(RoomFeature::Puzzle {
                puzzle: puzzle.clone(),
                solved: false,
            });
        }
    }

    if rng.chance(QUEST_GIVER_SPAWN_CHANCE) {
        let eligible: Vec<_> = catalog
            .npcs
            .iter()
            .filter_map(|n| match &n.role {
                NpcRole::QuestGiver { quest_id } => catalog
                    .quest(quest_id)
                    .filter(|q| quests.eligible_to_offer(q, player_level))
                    .map(|_| (n, quest_id.clone())),
                _ => None,
            })
            .collect();
        if !eligible.is_empty() {
            let index = rng.roll_range(0, eligible.len() as i32 - 1) as usize;
            let (npc, quest_id) = &eligible[index];
            return Some(RoomFeature::QuestGiver {
                npc: npc.name.clone(),
                quest_id: quest_id.clone(),
                dialogue: npc.dialogue.clone(),
            });
        }
    }

    if player_level >= WINNING_ITEM_MIN_PLAYER_LEVEL && content_roll < WINNING_ITEM_SPAWN_CHANCE {
        let candidates: Vec<_> = catalog.winning_items().collect();
        if let Some(item) = rng
            .pick(&candidates)
            .map(|i| (*i).clone())
        {
            return Some(RoomFeature::Item(item));
        }
    }

    secondary_roll(rng, catalog, player_level, quests)
}

/// The fall-through weighted roll over item / npc / hazard / monster.
fn secondary_roll(
    rng: &mut GameRng,
    catalog: &Catalog,
    player_level: u32,
    quests: &QuestLog,
) -> Option<RoomFeature> {
    let roll = rng.roll();

    if roll < ITEM_SPAWN_THRESHOLD {
        return roll_item(rng, catalog, player_level).map(RoomFeature::Item);
    }

    if roll < NPC_SPAWN_THRESHOLD {
        let eligible: Vec<_> = catalog
            .npcs
            .iter()
            .filter(|n| matches!(n.role, NpcRole::Bystander))
            .filter(|n| match &n.requires_quest {
                Some(id) => quests.status(id) == crate::quest::QuestStatus::Active,
                None => true,
            })
            .collect();
        return rng.pick(&eligible).map(|n| RoomFeature::Npc {
            npc: n.name.clone(),
            dialogue: n.dialogue.clone(),
        });
    }

    if roll < HAZARD_SPAWN_THRESHOLD {
        return rng.pick(&catalog.hazards).map(|h| RoomFeature::Hazard {
            hazard: h.clone(),
            revealed: !h.hidden,
            disarmed: false,
        });
    }

    if roll < MONSTER_SPAWN_THRESHOLD {
        return roll_monster(rng, catalog, player_level).map(RoomFeature::Monster);
    }

    None
}

/// Weighted item pick over the per-category spawn weights, scaled to the
/// player's level. Zero-weight categories (winning items among them) never
/// come up.
pub fn roll_item(rng: &mut GameRng, catalog: &Catalog, player_level: u32) -> Option<crate::item::Item> {
    let weights: Vec<f64> = catalog
        .items
        .iter()
        .map(|i| catalog.spawn_weights.weight_for(i))
        .collect();
    let index = rng.pick_weighted(&weights)?;
    Some(catalog.items[index].scaled_for_level(player_level))
}

/// Weighted monster pick within the level band around the player.
pub fn roll_monster(rng: &mut GameRng, catalog: &Catalog, player_level: u32) -> Option<Monster> {
    let eligible = catalog.eligible_monsters(player_level);
    if eligible.is_empty() {
        return None;
    }
    let weights: Vec<f64> = eligible.iter().map(|(_, w)| *w).collect();
    let index = rng.pick_weighted(&weights)?;
    Some(Monster::from_template(eligible[index].0))
}
