//! The game session: one run of the dungeon.
//!
//! [`GameSession`] owns everything a run needs: the content catalog, the
//! seeded RNG, the player, the room table, and the active fight, if any. It
//! is the engine's public surface: feed it input lines, get [`Event`]s back.
//! Nothing here prints, and nothing here blocks; the frontend decides how
//! to render and when to read.

use thiserror::Error;

use crate::combat::{ActiveCombat, CombatAction, CombatState, Encounter, HordeEncounter};
use crate::command::Command;
use crate::config::{HAZARD_DISARM_CHANCE, INN_REST_COST, UNARMED_DISPLAY_DAMAGE};
use crate::content::{Catalog, ContentError, DEFAULT_CATALOG};
use crate::effect;
use crate::event::{Event, GameMode};
use crate::item::ItemKind;
use crate::mapgen::{frontier_room, BspGenerator, MapConfig};
use crate::monster::Monster;
use crate::persist::{SaveData, SaveError};
use crate::player::{Player, StowResult};
use crate::quest::QuestStatus;
use crate::rng::GameRng;
use crate::room::{Direction, Room, RoomFeature, RoomId};

/// Errors constructing or persisting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown character class '{0}'")]
    UnknownClass(String),

    #[error("the catalog has no character classes to choose from")]
    NoClasses,

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Which map generation strategy drives this run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub enum MapMode {
    /// Whole level generated up front with binary space partitioning.
    #[default]
    Bsp,
    /// Rooms grown one at a time as the player walks.
    Frontier,
}

/// Configuration for a new run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub player_name: String,
    pub class_name: String,
    /// `None` seeds from OS entropy (the seed is still recorded).
    pub seed: Option<u64>,
    pub map_mode: MapMode,
    pub map_config: MapConfig,
    /// `None` uses the built-in catalog.
    pub catalog: Option<Catalog>,
}

impl SessionConfig {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            class_name: "Warrior".into(),
            seed: None,
            map_mode: MapMode::Bsp,
            map_config: MapConfig::default(),
            catalog: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_name = class.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_map_mode(mut self, mode: MapMode) -> Self {
        self.map_mode = mode;
        self
    }

    pub fn with_map_config(mut self, config: MapConfig) -> Self {
        self.map_config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// How the run ended, when it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Won,
    Died,
    Quit,
}

/// One run of the dungeon.
pub struct GameSession {
    catalog: Catalog,
    rng: GameRng,
    player: Player,
    rooms: Vec<Room>,
    current: RoomId,
    start: RoomId,
    history: Vec<RoomId>,
    travelled: u32,
    mode: MapMode,
    combat: Option<ActiveCombat>,
    /// Set once the winning item is carried; its guardian's death wins.
    artifact: Option<String>,
    outcome: Option<RunOutcome>,
}

impl GameSession {
    /// Start a fresh run. The returned events narrate the entry into the
    /// first room.
    pub fn new(config: SessionConfig) -> Result<(Self, Vec<Event>), SessionError> {
        let catalog = config.catalog.unwrap_or_else(|| DEFAULT_CATALOG.clone());
        let mut rng = match config.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::from_entropy(),
        };

        if catalog.classes.is_empty() {
            return Err(SessionError::NoClasses);
        }
        let class = catalog
            .class(&config.class_name)
            .ok_or_else(|| SessionError::UnknownClass(config.class_name.clone()))?;
        let player = Player::new(config.player_name, class, &catalog);

        let (rooms, start) = match config.map_mode {
            MapMode::Bsp => {
                let dungeon = BspGenerator::new(config.map_config).generate(
                    &mut rng,
                    &catalog,
                    player.level,
                    &player.quests,
                );
                (dungeon.rooms, dungeon.start)
            }
            MapMode::Frontier => {
                let first = frontier_room(&mut rng, &catalog, player.level, &player.quests, None);
                (vec![first], 0)
            }
        };

        let mut session = Self {
            catalog,
            rng,
            player,
            rooms,
            current: start,
            start,
            history: Vec::new(),
            travelled: 0,
            mode: config.map_mode,
            combat: None,
            artifact: None,
            outcome: None,
        };
        let mut events = Vec::new();
        session.enter_current_room(&mut events);
        Ok((session, events))
    }

    /// Rebuild a session from saved data. The run resumes out of combat;
    /// any fight in progress at save time left its monster in the room.
    pub fn from_save(save: SaveData, catalog: Option<Catalog>) -> Result<Self, SessionError> {
        let catalog = catalog.unwrap_or_else(|| DEFAULT_CATALOG.clone());
        let mut rng = GameRng::seeded(save.seed);
        let mut rooms = save.rooms;
        if rooms.is_empty() {
            // An older or hand-edited save with no map still resumes: grow a
            // fresh frontier room rather than fail.
            rooms.push(frontier_room(
                &mut rng,
                &catalog,
                save.player.level,
                &save.player.quests,
                None,
            ));
        }
        let current = save.current_room.min(rooms.len() - 1);
        Ok(Self {
            catalog,
            rng,
            player: save.player,
            rooms,
            current,
            start: save.start_room,
            history: save.history,
            travelled: save.travelled,
            mode: save.mode,
            combat: None,
            artifact: save.artifact,
            outcome: None,
        })
    }

    /// Snapshot the session as plain save data. An active fight is folded
    /// back into the current room's feature slot.
    pub fn to_save(&self) -> SaveData {
        let mut rooms = self.rooms.clone();
        if let Some(combat) = &self.combat {
            rooms[self.current].feature = Some(match combat {
                ActiveCombat::Single(encounter) => {
                    RoomFeature::Monster(encounter.monster().clone())
                }
                ActiveCombat::Horde(horde) => RoomFeature::Horde {
                    horde: horde.template().clone(),
                },
            });
        }
        SaveData {
            seed: self.rng.seed(),
            player: self.player.clone(),
            rooms,
            current_room: self.current,
            start_room: self.start,
            history: self.history.clone(),
            travelled: self.travelled,
            mode: self.mode,
            artifact: self.artifact.clone(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct mutable access for tests and tooling. Changes bypass the
    /// command surface, so use with caution.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_room_id(&self) -> RoomId {
        self.current
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Direct mutable room access for tests and tooling; see [`Self::player_mut`].
    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    // ========================================================================
    // The one entry point
    // ========================================================================

    /// Process one line of player input and return everything that happened.
    pub fn handle_line(&mut self, line: &str) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_over() {
            events.push(Event::Info("The run is over.".into()));
            return events;
        }
        match Command::parse(line) {
            Err(error) => events.push(Event::CommandRejected {
                reason: error.to_string(),
            }),
            Ok(command) => {
                if self.combat.is_some() {
                    self.combat_command(command, &mut events);
                } else {
                    self.explore_command(command, &mut events);
                }
            }
        }
        events
    }

    // ========================================================================
    // Combat dispatch
    // ========================================================================

    fn combat_command(&mut self, command: Command, events: &mut Vec<Event>) {
        let action = match command {
            Command::Attack => CombatAction::Attack,
            Command::Skill(name) => CombatAction::Skill(name),
            Command::Heal => CombatAction::Heal,
            Command::Run => CombatAction::Run,
            Command::Use(name) => CombatAction::UseItem(name),
            // Informational commands are free mid-fight.
            Command::Status => return self.report_status(events),
            Command::Inventory => return self.report_inventory(events),
            Command::Quests => return self.report_quests(events),
            Command::Skills => return self.report_skills(events),
            Command::Help => return self.report_help(events),
            Command::Look => {
                if let Some(combat) = &self.combat {
                    let monster = match combat {
                        ActiveCombat::Single(e) => e.monster(),
                        ActiveCombat::Horde(h) => h.current_monster(),
                    };
                    events.push(Event::Info(format!(
                        "The {} has {}/{} HP. You have {}/{}.",
                        monster.name, monster.hp, monster.max_hp, self.player.hp, self.player.max_hp
                    )));
                }
                return;
            }
            // Saving mid-fight folds the monster back into its room; the
            // loaded run resumes out of combat.
            Command::Save(path) => return self.write_save(path, events),
            Command::Quit => return self.quit(events),
            _ => {
                events.push(Event::CommandRejected {
                    reason: "Not while something wants you dead. Attack, heal, use something, or run."
                        .into(),
                });
                return;
            }
        };

        // Take the fight out of self so the room can be borrowed alongside it.
        let Some(mut combat) = self.combat.take() else {
            return;
        };
        let state = combat.take_turn(
            &mut self.player,
            &mut self.rooms[self.current],
            action,
            &self.catalog,
            &mut self.rng,
            events,
        );
        match state {
            CombatState::Ongoing => self.combat = Some(combat),
            CombatState::PlayerWon => {
                if combat.is_boss_guardian() {
                    let artifact = self
                        .artifact
                        .clone()
                        .unwrap_or_else(|| "artifact".to_string());
                    events.push(Event::RunWon { artifact });
                    self.outcome = Some(RunOutcome::Won);
                    return;
                }
                events.push(Event::ModeChanged {
                    mode: GameMode::Ambient,
                });
            }
            CombatState::PlayerFled => {
                // The monster keeps the room; the player falls back the way
                // they came.
                self.rooms[self.current].feature = Some(combat.into_fled_feature());
                events.push(Event::ModeChanged {
                    mode: GameMode::Ambient,
                });
                if let Some(previous) = self.history.pop() {
                    self.current = previous;
                    self.enter_current_room(events);
                }
            }
            CombatState::PlayerDied => {
                self.outcome = Some(RunOutcome::Died);
            }
        }
    }

    // ========================================================================
    // Exploration dispatch
    // ========================================================================

    fn explore_command(&mut self, command: Command, events: &mut Vec<Event>) {
        match command {
            Command::Go(direction) => self.go(direction, events),
            Command::Back => self.go_back(events),
            Command::Look => self.look(events),
            Command::Search => self.search(events),
            Command::Disarm => self.disarm(events),
            Command::Take => self.take(events),
            Command::Drop(name) => self.drop_item(&name, events),
            Command::Talk => self.talk(events),
            Command::Answer(text) => self.answer(&text, events),
            Command::Pray => self.pray(events),
            Command::Rest => self.rest(events),
            Command::Use(name) => {
                self.player.use_item(&name, false, events);
                self.check_player_alive("a consumable gone wrong", events);
            }
            Command::Equip(name) => {
                self.player.equip(&name, events);
            }
            Command::Unequip(name) => {
                self.player.unequip(&name, events);
            }
            Command::Attack | Command::Skill(_) | Command::Heal | Command::Run => {
                events.push(Event::CommandRejected {
                    reason: "There is nothing here to fight.".into(),
                });
            }
            Command::Status => self.report_status(events),
            Command::Inventory => self.report_inventory(events),
            Command::Quests => self.report_quests(events),
            Command::Skills => self.report_skills(events),
            Command::Help => self.report_help(events),
            Command::Save(path) => self.write_save(path, events),
            Command::Quit => self.quit(events),
        }
    }

    fn write_save(&mut self, path: Option<String>, events: &mut Vec<Event>) {
        let path = path.unwrap_or_else(|| "delve_save.json".to_string());
        match self.to_save().save(&path) {
            Ok(()) => events.push(Event::Info(format!("Saved to {path}."))),
            Err(error) => events.push(Event::CommandRejected {
                reason: format!("Save failed: {error}"),
            }),
        }
    }

    fn quit(&mut self, events: &mut Vec<Event>) {
        events.push(Event::Info(
            "You retreat to the surface. The dungeon will keep.".into(),
        ));
        self.outcome = Some(RunOutcome::Quit);
    }

    // ========================================================================
    // Movement
    // ========================================================================

    fn go(&mut self, direction: Direction, events: &mut Vec<Event>) {
        // A locked exit opens if the right key is on the chain. Keys are
        // durable; unlocking does not consume them.
        if let Some(locked) = self.rooms[self.current].locked_exits.get(&direction) {
            let key = locked.key;
            if !self.player.has_key(key) {
                events.push(Event::ExitBlocked { direction, key });
                return;
            }
            self.rooms[self.current].unlock(direction);
            events.push(Event::DoorUnlocked { direction, key });
        }

        let Some(target) = self.rooms[self.current].exits.get(&direction).copied() else {
            events.push(Event::NoExitThatWay { direction });
            return;
        };

        let target = match target {
            Some(id) => id,
            // Unexplored space: grow a room on the spot (frontier mode).
            None => {
                let mut room = frontier_room(
                    &mut self.rng,
                    &self.catalog,
                    self.player.level,
                    &self.player.quests,
                    Some(direction),
                );
                let id = self.rooms.len();
                room.exits.insert(direction.opposite(), Some(self.current));
                self.rooms.push(room);
                self.rooms[self.current].exits.insert(direction, Some(id));
                id
            }
        };

        self.history.push(self.current);
        self.current = target;
        self.enter_current_room(events);
    }

    fn go_back(&mut self, events: &mut Vec<Event>) {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                self.enter_current_room(events);
            }
            None => events.push(Event::CommandRejected {
                reason: "There is nowhere to go back to.".into(),
            }),
        }
    }

    /// Everything that happens on stepping into the current room: the
    /// room-entry effect tick, the narration, and whatever the room holds.
    fn enter_current_room(&mut self, events: &mut Vec<Event>) {
        self.travelled += 1;

        // Effects tick on every room entry, same as on combat turns.
        let tick = effect::tick_effects(&mut self.player.effects, self.player.hp, "You", events);
        self.player.hp = tick.hp;
        if !self.check_player_alive("your afflictions claim you", events) {
            return;
        }

        events.push(Event::RoomEntered {
            description: self.rooms[self.current].description.clone(),
            travelled: self.travelled,
        });
        self.describe_exits(events);

        match self.rooms[self.current].feature.take() {
            Some(RoomFeature::Monster(monster)) if monster.is_alive() => {
                events.push(Event::ModeChanged {
                    mode: GameMode::Combat,
                });
                let encounter = Encounter::start(monster, &self.player, events);
                self.combat = Some(ActiveCombat::Single(encounter));
            }
            Some(RoomFeature::Horde { horde }) => {
                match HordeEncounter::start(&horde, &self.player, &self.catalog, &mut self.rng, events)
                {
                    Some(encounter) => {
                        events.push(Event::ModeChanged {
                            mode: GameMode::Combat,
                        });
                        self.combat = Some(ActiveCombat::Horde(encounter));
                    }
                    None => log::warn!("horde '{}' resolved to no monsters", horde.name),
                }
            }
            Some(RoomFeature::Hazard {
                hazard,
                revealed,
                disarmed,
            }) => {
                // A visible, armed hazard catches whoever walks in. Hidden
                // ones wait to be found (or stepped around, unknowingly).
                if revealed && !disarmed {
                    self.trigger_hazard(&hazard, events);
                    self.rooms[self.current].feature = Some(RoomFeature::Hazard {
                        hazard,
                        revealed: true,
                        disarmed: true,
                    });
                } else {
                    self.rooms[self.current].feature = Some(RoomFeature::Hazard {
                        hazard,
                        revealed,
                        disarmed,
                    });
                }
            }
            other => {
                if let Some(feature) = &other {
                    self.describe_feature(feature, events);
                }
                self.rooms[self.current].feature = other;
            }
        }
    }

    fn describe_exits(&self, events: &mut Vec<Event>) {
        let room = &self.rooms[self.current];
        let mut exits: Vec<String> = room.exits.keys().map(|d| d.name().to_string()).collect();
        exits.extend(
            room.locked_exits
                .iter()
                .map(|(d, l)| format!("{d} ({} lock)", l.key)),
        );
        if exits.is_empty() {
            events.push(Event::Info("There is no way out of here.".into()));
        } else {
            events.push(Event::Info(format!("Exits: {}.", exits.join(", "))));
        }
    }

    fn describe_feature(&self, feature: &RoomFeature, events: &mut Vec<Event>) {
        let line = match feature {
            RoomFeature::Inn => {
                "A battered sign hangs here: an inn, of sorts. You could rest.".to_string()
            }
            RoomFeature::CraftingStation { kind } => {
                format!("A {} stands here, tools scattered around it.", kind.to_lowercase())
            }
            RoomFeature::Vendor { npc, .. } => {
                format!("{npc} has set up a small stall here. You could talk.")
            }
            RoomFeature::Shrine { shrine, used } => {
                if *used {
                    format!("The {} stands silent, its power spent.", shrine.name)
                } else {
                    format!("{} You could pray here.", shrine.description)
                }
            }
            RoomFeature::Puzzle { puzzle, solved } => {
                if *solved {
                    "The puzzle here has already been solved.".to_string()
                } else {
                    format!("{} (answer <word>)", puzzle.prompt)
                }
            }
            RoomFeature::QuestGiver { npc, .. } => {
                format!("{npc} waits here, looking like they need something. You could talk.")
            }
            RoomFeature::Npc { npc, .. } => format!("{npc} is here. You could talk."),
            RoomFeature::Item(item) => format!("A {item} lies here. You could take it."),
            RoomFeature::Hazard { .. } | RoomFeature::Monster(_) | RoomFeature::Horde { .. } => {
                return
            }
        };
        events.push(Event::Info(line));
    }

    // ========================================================================
    // Room interactions
    // ========================================================================

    fn look(&mut self, events: &mut Vec<Event>) {
        events.push(Event::Info(self.rooms[self.current].description.clone()));
        self.describe_exits(events);
        if let Some(feature) = &self.rooms[self.current].feature {
            // A revealed hazard is worth pointing out on a second look.
            if let RoomFeature::Hazard {
                hazard,
                revealed: true,
                disarmed,
            } = feature
            {
                let state = if *disarmed { "sprung" } else { "armed" };
                events.push(Event::Info(format!("A {} sits here, {state}.", hazard.name)));
            } else {
                self.describe_feature(feature, events);
            }
        }
    }

    fn search(&mut self, events: &mut Vec<Event>) {
        match &mut self.rooms[self.current].feature {
            Some(RoomFeature::Hazard {
                hazard,
                revealed: revealed @ false,
                ..
            }) => {
                *revealed = true;
                events.push(Event::HazardRevealed {
                    name: hazard.name.clone(),
                });
            }
            _ => events.push(Event::NothingFound),
        }
    }

    fn disarm(&mut self, events: &mut Vec<Event>) {
        let Some(RoomFeature::Hazard {
            hazard,
            revealed: true,
            disarmed: false,
        }) = self.rooms[self.current].feature.clone()
        else {
            events.push(Event::CommandRejected {
                reason: "There is nothing here to disarm.".into(),
            });
            return;
        };
        if self.rng.chance(HAZARD_DISARM_CHANCE) {
            events.push(Event::HazardDisarmed {
                name: hazard.name.clone(),
            });
        } else {
            // A botched attempt springs the trap.
            self.trigger_hazard(&hazard, events);
        }
        self.rooms[self.current].feature = Some(RoomFeature::Hazard {
            hazard,
            revealed: true,
            disarmed: true,
        });
    }

    fn trigger_hazard(&mut self, hazard: &crate::content::HazardTemplate, events: &mut Vec<Event>) {
        let defense = self.player.total_defense(&self.catalog);
        let absorbed = hazard.damage.min(defense).max(0);
        let damage = (hazard.damage - absorbed).max(0);
        self.player.take_damage(damage);
        events.push(Event::HazardTriggered {
            name: hazard.name.clone(),
            damage,
            absorbed,
        });
        self.check_player_alive(&format!("killed by a {}", hazard.name), events);
    }

    fn take(&mut self, events: &mut Vec<Event>) {
        let Some(RoomFeature::Item(item)) = self.rooms[self.current].feature.clone() else {
            events.push(Event::CommandRejected {
                reason: "There is nothing here to take.".into(),
            });
            return;
        };

        let is_artifact = matches!(item.kind, ItemKind::WinningItem);
        let name = item.name.clone();
        match self.player.stow(item) {
            StowResult::NoSpace => {
                events.push(Event::InventoryFull { item: name });
            }
            StowResult::Inventory | StowResult::Keychain => {
                self.rooms[self.current].feature = None;
                events.push(Event::ItemTaken { item: name.clone() });
                self.player.quests.record_pickup(&name, &self.catalog, events);
                if is_artifact {
                    self.spawn_guardian(name, events);
                }
            }
        }
    }

    /// Taking the winning item wakes the dungeon's hardest monster, which
    /// attacks on the spot. Its death wins the run.
    fn spawn_guardian(&mut self, artifact: String, events: &mut Vec<Event>) {
        self.artifact = Some(artifact.clone());
        match self.catalog.hardest_guardian(self.player.level) {
            Some(template) => {
                let mut guardian = Monster::from_template(template);
                guardian.is_boss_guardian = true;
                events.push(Event::GuardianAppears {
                    monster: guardian.name.clone(),
                });
                events.push(Event::ModeChanged {
                    mode: GameMode::Combat,
                });
                let encounter = Encounter::start(guardian, &self.player, events);
                self.combat = Some(ActiveCombat::Single(encounter));
            }
            None => {
                // Nothing left alive to contest the theft.
                events.push(Event::RunWon { artifact });
                self.outcome = Some(RunOutcome::Won);
            }
        }
    }

    fn drop_item(&mut self, name: &str, events: &mut Vec<Event>) {
        let Some(index) = self.player.find_item(name) else {
            events.push(Event::ItemNotCarried { item: name.into() });
            return;
        };
        if self.rooms[self.current].feature.is_some() {
            events.push(Event::CommandRejected {
                reason: "There is no clean spot to leave it here.".into(),
            });
            return;
        }
        let item = self.player.inventory.remove(index);
        events.push(Event::ItemDropped {
            item: item.name.clone(),
        });
        self.rooms[self.current].feature = Some(RoomFeature::Item(item));
    }

    fn talk(&mut self, events: &mut Vec<Event>) {
        match self.rooms[self.current].feature.clone() {
            Some(RoomFeature::Npc { npc, dialogue })
            | Some(RoomFeature::Vendor { npc, dialogue }) => {
                events.push(Event::NpcSpeech { name: npc, line: dialogue });
            }
            Some(RoomFeature::QuestGiver {
                npc,
                quest_id,
                dialogue,
            }) => self.talk_to_quest_giver(&npc, &quest_id, &dialogue, events),
            _ => events.push(Event::CommandRejected {
                reason: "There is no one here to talk to.".into(),
            }),
        }
    }

    fn talk_to_quest_giver(
        &mut self,
        npc: &str,
        quest_id: &str,
        dialogue: &str,
        events: &mut Vec<Event>,
    ) {
        events.push(Event::NpcSpeech {
            name: npc.to_string(),
            line: dialogue.to_string(),
        });
        let Some(quest) = self.catalog.quest(quest_id).cloned() else {
            log::warn!("quest giver {npc} references unknown quest '{quest_id}'");
            return;
        };
        match self.player.quests.status(quest_id) {
            QuestStatus::NotStarted => {
                if self.player.quests.eligible_to_offer(&quest, self.player.level) {
                    self.player.quests.accept(&quest);
                    events.push(Event::QuestAccepted { name: quest.name });
                } else {
                    events.push(Event::Info(format!(
                        "{npc} sizes you up. \"Come back when you're ready.\""
                    )));
                }
            }
            QuestStatus::Active => {
                if let Some(progress) = self.player.quests.progress(quest_id) {
                    events.push(Event::QuestProgress {
                        name: quest.name,
                        current: progress.current_count,
                        target: progress.target_count,
                    });
                }
            }
            QuestStatus::CompleteReady => {
                self.player.quests.complete(quest_id);
                self.player.gold += quest.gold_reward;
                events.push(Event::QuestCompleted {
                    name: quest.name,
                    gold: quest.gold_reward,
                    xp: quest.xp_reward,
                });
                self.player.add_xp(quest.xp_reward, &self.catalog, events);
            }
            QuestStatus::Completed => {
                events.push(Event::Info(format!("{npc} nods. \"Thank you again.\"")));
            }
        }
    }

    fn answer(&mut self, text: &str, events: &mut Vec<Event>) {
        let Some(RoomFeature::Puzzle {
            puzzle,
            solved: false,
        }) = self.rooms[self.current].feature.clone()
        else {
            events.push(Event::CommandRejected {
                reason: "Nothing here is asking you anything.".into(),
            });
            return;
        };
        if !text.trim().eq_ignore_ascii_case(&puzzle.answer) {
            events.push(Event::PuzzleFailed);
            return;
        }

        let mut rewards = Vec::new();
        if puzzle.reward.gold > 0 {
            rewards.push(format!("{} gold", puzzle.reward.gold));
        }
        if puzzle.reward.xp > 0 {
            rewards.push(format!("{} XP", puzzle.reward.xp));
        }
        if let Some(item) = &puzzle.reward.item {
            rewards.push(item.clone());
        }
        events.push(Event::PuzzleSolved {
            reward: if rewards.is_empty() {
                "satisfaction".to_string()
            } else {
                rewards.join(", ")
            },
        });
        self.rooms[self.current].feature = Some(RoomFeature::Puzzle {
            puzzle: puzzle.clone(),
            solved: true,
        });

        if puzzle.reward.gold > 0 {
            self.player.gold += puzzle.reward.gold;
            events.push(Event::GoldGained {
                amount: puzzle.reward.gold,
                total: self.player.gold,
            });
        }
        if let Some(item_name) = &puzzle.reward.item {
            match self.catalog.item(item_name) {
                Some(template) => {
                    let item = template.scaled_for_level(self.player.level);
                    let name = item.name.clone();
                    match self.player.stow(item) {
                        StowResult::NoSpace => events.push(Event::InventoryFull { item: name }),
                        _ => {
                            events.push(Event::ItemTaken { item: name.clone() });
                            self.player.quests.record_pickup(&name, &self.catalog, events);
                        }
                    }
                }
                None => log::warn!("puzzle reward '{item_name}' not in catalog; skipped"),
            }
        }
        if puzzle.reward.xp > 0 {
            self.player.add_xp(puzzle.reward.xp, &self.catalog, events);
        }
    }

    fn pray(&mut self, events: &mut Vec<Event>) {
        let Some(RoomFeature::Shrine {
            shrine,
            used: false,
        }) = self.rooms[self.current].feature.clone()
        else {
            events.push(Event::CommandRejected {
                reason: "There is no shrine here that will answer.".into(),
            });
            return;
        };

        let (effect_name, blessed) = if self.rng.chance(shrine.bless_chance) {
            (shrine.blessing.clone(), true)
        } else {
            (shrine.curse.clone(), false)
        };
        match self.catalog.status_effect(&effect_name) {
            Some(template) => {
                self.player.effects.push(template.instantiate());
                let event = if blessed {
                    Event::ShrineBlessing {
                        shrine: shrine.name.clone(),
                        effect: format!("You are granted {}.", template.name),
                    }
                } else {
                    Event::ShrineCurse {
                        shrine: shrine.name.clone(),
                        effect: format!("You are struck with {}.", template.name),
                    }
                };
                events.push(event);
            }
            None => log::warn!("shrine effect '{effect_name}' not in catalog; skipped"),
        }
        self.rooms[self.current].feature = Some(RoomFeature::Shrine { shrine, used: true });
    }

    fn rest(&mut self, events: &mut Vec<Event>) {
        if !matches!(self.rooms[self.current].feature, Some(RoomFeature::Inn)) {
            events.push(Event::CommandRejected {
                reason: "This is no place to sleep.".into(),
            });
            return;
        }
        if self.player.hp >= self.player.max_hp {
            events.push(Event::Info("You are already fully rested.".into()));
            return;
        }
        // Gold is checked before anything changes; no partial charge.
        if self.player.gold < INN_REST_COST {
            events.push(Event::CommandRejected {
                reason: format!(
                    "A bed costs {INN_REST_COST} gold and you carry {}.",
                    self.player.gold
                ),
            });
            return;
        }
        self.player.gold -= INN_REST_COST;
        let healed = self.player.heal(self.player.max_hp);
        events.push(Event::Healed {
            amount: healed,
            hp: self.player.hp,
            max_hp: self.player.max_hp,
        });
        events.push(Event::Info(format!(
            "You sleep soundly for {INN_REST_COST} gold ({} left).",
            self.player.gold
        )));
    }

    // ========================================================================
    // Reports
    // ========================================================================

    fn report_status(&self, events: &mut Vec<Event>) {
        let p = &self.player;
        let weapon_damage = p
            .equipment
            .weapon
            .as_ref()
            .and_then(|w| w.damage())
            .unwrap_or(UNARMED_DISPLAY_DAMAGE);
        events.push(Event::Info(format!(
            "{} the {}, level {} ({}/{} XP). HP {}/{}, attack {} (weapon {}), defense {}, \
             crit {:.0}%, gold {}.",
            p.name,
            p.class_name,
            p.level,
            p.xp,
            p.xp_to_next_level,
            p.hp,
            p.max_hp,
            p.attack_power,
            weapon_damage,
            p.total_defense(&self.catalog),
            p.crit_chance * 100.0,
            p.gold,
        )));
        if !p.effects.is_empty() {
            let names: Vec<&str> = p.effects.iter().map(|e| e.name.as_str()).collect();
            events.push(Event::Info(format!("Active effects: {}.", names.join(", "))));
        }
    }

    fn report_inventory(&self, events: &mut Vec<Event>) {
        let p = &self.player;
        if p.inventory.is_empty() {
            events.push(Event::Info(format!(
                "Your pack is empty ({} slots).",
                p.max_inventory_slots
            )));
        } else {
            let names: Vec<String> = p.inventory.iter().map(|i| i.name.clone()).collect();
            events.push(Event::Info(format!(
                "Pack ({}/{}): {}.",
                p.inventory.len(),
                p.max_inventory_slots,
                names.join(", ")
            )));
        }
        let mut worn = Vec::new();
        for piece in [
            &p.equipment.weapon,
            &p.equipment.shield,
            &p.equipment.body_armor,
            &p.equipment.cloak,
            &p.equipment.helmet,
        ]
        .into_iter()
        .flatten()
        {
            worn.push(piece.name.clone());
        }
        worn.extend(p.equipment.trinkets.iter().map(|t| t.name.clone()));
        if !worn.is_empty() {
            events.push(Event::Info(format!("Equipped: {}.", worn.join(", "))));
        }
        if !p.keychain.is_empty() {
            let keys: Vec<String> = p.keychain.iter().map(|k| k.name.clone()).collect();
            events.push(Event::Info(format!("Keychain: {}.", keys.join(", "))));
        }
    }

    fn report_quests(&self, events: &mut Vec<Event>) {
        let mut any = false;
        for (id, progress) in self.player.quests.iter() {
            let Some(quest) = self.catalog.quest(id) else {
                continue;
            };
            any = true;
            let status = match progress.status {
                QuestStatus::NotStarted => "not started",
                QuestStatus::Active => "active",
                QuestStatus::CompleteReady => "ready to turn in",
                QuestStatus::Completed => "completed",
            };
            events.push(Event::Info(format!(
                "{}: {} ({}/{})",
                quest.name, status, progress.current_count, progress.target_count
            )));
        }
        if !any {
            events.push(Event::Info("Your journal is empty.".into()));
        }
    }

    fn report_skills(&self, events: &mut Vec<Event>) {
        if self.player.unlocked_skills.is_empty() {
            events.push(Event::Info("You have not learned any skills yet.".into()));
        } else {
            events.push(Event::Info(format!(
                "Skills: {}. (skill <name> in combat)",
                self.player.unlocked_skills.join(", ")
            )));
        }
    }

    fn report_help(&self, events: &mut Vec<Event>) {
        events.push(Event::Info(
            "Explore: go <dir>, back, look, search, disarm, take, drop <item>, talk, \
             answer <word>, pray, rest. Gear: use/equip/unequip <item>, inventory. \
             Combat: attack, skill <name>, heal, run. Info: status, quests, skills. \
             Meta: save [path], quit."
                .into(),
        ));
    }

    /// Returns false (and ends the run) if the player is dead.
    fn check_player_alive(&mut self, cause: &str, events: &mut Vec<Event>) -> bool {
        if self.player.is_alive() {
            return true;
        }
        events.push(Event::PlayerDied {
            cause: cause.to_string(),
        });
        self.outcome = Some(RunOutcome::Died);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::builtin_catalog;

    fn seeded_session(seed: u64) -> (GameSession, Vec<Event>) {
        GameSession::new(SessionConfig::new("Tester").with_seed(seed)).unwrap()
    }

    #[test]
    fn new_session_enters_the_start_room() {
        let (session, events) = seeded_session(1);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::RoomEntered { travelled: 1, .. })));
        assert!(!session.is_over());
        assert!(!session.in_combat());
        assert_eq!(session.seed(), 1);
    }

    #[test]
    fn unknown_command_changes_nothing() {
        let (mut session, _) = seeded_session(2);
        let gold = session.player().gold;
        let hp = session.player().hp;
        let events = session.handle_line("defenestrate goblin");
        assert!(matches!(events[0], Event::CommandRejected { .. }));
        assert_eq!(session.player().gold, gold);
        assert_eq!(session.player().hp, hp);
    }

    #[test]
    fn unknown_class_is_an_error() {
        let result = GameSession::new(
            SessionConfig::new("Tester")
                .with_seed(3)
                .with_class("Necromancer"),
        );
        assert!(matches!(result, Err(SessionError::UnknownClass(_))));
    }

    #[test]
    fn movement_commands_reject_mid_combat() {
        let (mut session, _) = seeded_session(4);
        // Force a fight by planting a monster next door and walking in.
        let current = session.current_room_id();
        let (dir, target) = session
            .room(current)
            .unwrap()
            .exits
            .iter()
            .find_map(|(d, t)| t.map(|t| (*d, t)))
            .expect("start room has an exit");
        let monster = Monster::from_template(
            &crate::content::MonsterTemplate::new("Test Brute", 1, 1000, 0),
        );
        session.room_mut(target).unwrap().feature = Some(RoomFeature::Monster(monster));
        session.handle_line(&format!("go {dir}"));
        assert!(session.in_combat());

        let events = session.handle_line("go north");
        assert!(matches!(events[0], Event::CommandRejected { .. }));
        assert!(session.in_combat());
    }

    #[test]
    fn frontier_mode_grows_rooms_on_demand(){
        let (mut session, _) = GameSession::new(
            SessionConfig::new("Tester")
                .with_seed(5)
                .with_map_mode(MapMode::Frontier),
        )
        .unwrap();
        let before = session.rooms.len();
        assert_eq!(before, 1);
        let dir = *session
            .room(0)
            .unwrap()
            .exits
            .keys()
            .next()
            .expect("first frontier room has an exit");
        session.handle_line(&format!("go {dir}"));
        // Died-on-entry runs (hazard rolls) still must have grown the room.
        assert_eq!(session.rooms.len(), 2);
        // The new room links back.
        let back = session.room(1).unwrap().exits.get(&dir.opposite()).copied();
        assert_eq!(back, Some(Some(0)));
    }

    #[test]
    fn quitting_ends_the_run() {
        let (mut session, _) = seeded_session(6);
        session.handle_line("quit");
        assert_eq!(session.outcome(), Some(RunOutcome::Quit));
        let events = session.handle_line("look");
        assert!(matches!(events[0], Event::Info(_)));
    }

    #[test]
    fn status_report_uses_unarmed_display_baseline() {
        let (mut session, _) = seeded_session(7);
        session.player_mut().equipment.weapon = None;
        let mut events = Vec::new();
        session.report_status(&mut events);
        match &events[0] {
            Event::Info(text) => assert!(text.contains(&format!("weapon {UNARMED_DISPLAY_DAMAGE}"))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn save_snapshot_folds_combat_back_into_the_room() {
        let (mut session, _) = seeded_session(8);
        let current = session.current_room_id();
        let (dir, target) = session
            .room(current)
            .unwrap()
            .exits
            .iter()
            .find_map(|(d, t)| t.map(|t| (*d, t)))
            .unwrap();
        let monster = Monster::from_template(
            &crate::content::MonsterTemplate::new("Save Subject", 1, 500, 0),
        );
        session.room_mut(target).unwrap().feature = Some(RoomFeature::Monster(monster));
        session.handle_line(&format!("go {dir}"));
        assert!(session.in_combat());

        let save = session.to_save();
        match &save.rooms[save.current_room].feature {
            Some(RoomFeature::Monster(m)) => assert_eq!(m.name, "Save Subject"),
            other => panic!("expected the monster back in the slot, got {other:?}"),
        }

        let restored = GameSession::from_save(save, Some(builtin_catalog())).unwrap();
        assert!(!restored.in_combat());
        assert_eq!(restored.player().name, "Tester");
    }
}
