//! Dungeon map generation.
//!
//! The canonical generator builds a whole level up front with binary space
//! partitioning: recursively bisect the map rectangle, drop one room in
//! each leaf partition, then walk the tree bottom-up joining the halves
//! with L-shaped corridors. Narrative placement falls out of geometry:
//! the two most distant rooms become start and boss chamber, and the room
//! nearest their midpoint hides the mini-boss carrying the boss-door key.
//!
//! The frontier generator is the lightweight alternative: rooms appear one
//! at a time as the player walks, with exits rolled per direction.

use serde::{Deserialize, Serialize};

use crate::config::{LOCKED_EXIT_CHANCE, OPEN_EXIT_CHANCE};
use crate::content::Catalog;
use crate::item::KeyKind;
use crate::monster::Monster;
use crate::populate::{describe_room, roll_feature};
use crate::quest::QuestLog;
use crate::rng::GameRng;
use crate::room::{Direction, LockedExit, Room, RoomFeature, RoomId};

/// Knobs for the BSP generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    /// Maximum partition depth; 2^depth leaves at most.
    pub depth: u32,
    pub min_room_size: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 48,
            height: 32,
            depth: 4,
            min_room_size: 4,
        }
    }
}

// ============================================================================
// Tiles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
}

/// The carved tile layer under the room graph. Kept mainly so tests and
/// renderers can see what the corridors actually did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; (width * height).max(0) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(Tile::Floor)
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Floor).count()
    }

    fn carve_rect(&mut self, rect: &Rect) {
        for y in rect.y..rect.y + rect.h {
            for x in rect.x..rect.x + rect.w {
                self.set(x, y, Tile::Floor);
            }
        }
    }

    fn carve_h(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.set(x, y, Tile::Floor);
        }
    }

    fn carve_v(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.set(x, y, Tile::Floor);
        }
    }
}

/// An axis-aligned rectangle in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

fn manhattan(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

// ============================================================================
// The generated level
// ============================================================================

/// A fully generated dungeon level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub rooms: Vec<Room>,
    pub room_rects: Vec<Rect>,
    pub grid: TileGrid,
    pub start: RoomId,
    pub boss_room: RoomId,
    pub key_room: RoomId,
}

// ============================================================================
// BSP generation
// ============================================================================

enum BspNode {
    Leaf { room: RoomId },
    Internal { left: Box<BspNode>, right: Box<BspNode> },
}

/// Binary-space-partition dungeon generator.
#[derive(Debug, Clone, Default)]
pub struct BspGenerator {
    pub config: MapConfig,
}

impl BspGenerator {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    /// Generate a level. Draws exclusively from `rng`; two calls with the
    /// same seed and inputs produce the same dungeon.
    pub fn generate(
        &self,
        rng: &mut GameRng,
        catalog: &Catalog,
        player_level: u32,
        quests: &QuestLog,
    ) -> Dungeon {
        let cfg = self.config;
        let mut grid = TileGrid::new(cfg.width, cfg.height);
        let mut rects = Vec::new();
        let root = self.split(
            Rect {
                x: 0,
                y: 0,
                w: cfg.width,
                h: cfg.height,
            },
            cfg.depth,
            rng,
            &mut rects,
        );

        for rect in &rects {
            grid.carve_rect(rect);
        }

        let mut rooms: Vec<Room> = (0..rects.len()).map(|_| Room::default()).collect();
        self.connect(&root, rng, &rects, &mut rooms, &mut grid);

        let (start, boss_room) = furthest_pair(&rects);
        let key_room = nearest_to_midpoint(&rects, start, boss_room);

        for (id, room) in rooms.iter_mut().enumerate() {
            room.description = describe_room(rng, catalog);
            if id == start {
                continue;
            }
            if id == boss_room {
                if let Some(template) = catalog.apex_monster() {
                    room.feature = Some(RoomFeature::Monster(Monster::from_template(template)));
                    room.description
                        .push_str(" The air here is heavy; something vast is breathing.");
                }
                continue;
            }
            if Some(id) == key_room {
                if let Some(template) = catalog.mini_boss(player_level + 1) {
                    let mut guard = Monster::from_template(template);
                    guard.item_drop = Some("Obsidian Key".into());
                    room.feature = Some(RoomFeature::Monster(guard));
                    room.description
                        .push_str(" Something stands guard over a pedestal here.");
                }
                continue;
            }
            room.feature = roll_feature(rng, catalog, player_level, quests);
        }

        // Gate the boss chamber behind the mini-boss key: every corridor
        // into it locks. The carved graph stays connected; the lock is a
        // gameplay gate, not a wall.
        if key_room.is_some() {
            lock_room_entrances(&mut rooms, boss_room, KeyKind::Obsidian);
        }

        Dungeon {
            rooms,
            room_rects: rects,
            grid,
            start,
            boss_room,
            key_room: key_room.unwrap_or(start),
        }
    }

    fn split(
        &self,
        rect: Rect,
        depth: u32,
        rng: &mut GameRng,
        rects: &mut Vec<Rect>,
    ) -> BspNode {
        let min_room = self.config.min_room_size;
        // A partition must fit a room plus a one-cell margin on each side.
        let min_part = min_room + 2;
        let can_vertical = rect.w >= 2 * min_part;
        let can_horizontal = rect.h >= 2 * min_part;

        if depth == 0 || (!can_vertical && !can_horizontal) {
            return self.leaf(rect, rng, rects);
        }

        // Bias lopsided partitions toward splitting their long axis.
        let ratio = rect.w as f64 / rect.h as f64;
        let vertical = if ratio >= 1.25 && can_vertical {
            true
        } else if ratio <= 1.0 / 1.25 && can_horizontal {
            false
        } else if can_vertical && can_horizontal {
            rng.chance(0.5)
        } else {
            can_vertical
        };

        let (left, right) = if vertical {
            let cut = rng.roll_range(min_part, rect.w - min_part);
            (
                Rect {
                    w: cut,
                    ..rect
                },
                Rect {
                    x: rect.x + cut,
                    w: rect.w - cut,
                    ..rect
                },
            )
        } else {
            let cut = rng.roll_range(min_part, rect.h - min_part);
            (
                Rect {
                    h: cut,
                    ..rect
                },
                Rect {
                    y: rect.y + cut,
                    h: rect.h - cut,
                    ..rect
                },
            )
        };

        BspNode::Internal {
            left: Box::new(self.split(left, depth - 1, rng, rects)),
            right: Box::new(self.split(right, depth - 1, rng, rects)),
        }
    }

    fn leaf(&self, rect: Rect, rng: &mut GameRng, rects: &mut Vec<Rect>) -> BspNode {
        let min_room = self.config.min_room_size;
        let w = rng.roll_range(min_room, rect.w - 2);
        let h = rng.roll_range(min_room, rect.h - 2);
        let x = rng.roll_range(rect.x + 1, rect.x + rect.w - 1 - w);
        let y = rng.roll_range(rect.y + 1, rect.y + rect.h - 1 - h);
        rects.push(Rect { x, y, w, h });
        BspNode::Leaf {
            room: rects.len() - 1,
        }
    }

    /// Bottom-up corridor carving. Returns the leaf rooms of the subtree.
    fn connect(
        &self,
        node: &BspNode,
        rng: &mut GameRng,
        rects: &[Rect],
        rooms: &mut [Room],
        grid: &mut TileGrid,
    ) -> Vec<RoomId> {
        match node {
            BspNode::Leaf { room } => vec![*room],
            BspNode::Internal { left, right } => {
                let mut lefts = self.connect(left, rng, rects, rooms, grid);
                let rights = self.connect(right, rng, rects, rooms, grid);

                let a = connector(&lefts, rooms);
                let b = connector(&rights, rooms);
                let (ax, ay) = rects[a].center();
                let (bx, by) = rects[b].center();

                let horizontal_first = rng.chance(0.5);
                if horizontal_first {
                    grid.carve_h(ax, bx, ay);
                    grid.carve_v(ay, by, bx);
                } else {
                    grid.carve_v(ay, by, ax);
                    grid.carve_h(ax, bx, by);
                }

                let (dir_a, dir_b) = corridor_directions((ax, ay), (bx, by), horizontal_first);
                link(rooms, a, dir_a, b);
                link(rooms, b, dir_b, a);

                lefts.extend(rights);
                lefts
            }
        }
    }
}

/// The room in a subtree with the fewest connections so far. Spreads
/// corridor endpoints out instead of funneling through one hub.
fn connector(ids: &[RoomId], rooms: &[Room]) -> RoomId {
    *ids.iter()
        .min_by_key(|id| rooms[**id].exits.len() + rooms[**id].locked_exits.len())
        .unwrap_or(&ids[0])
}

/// Travel directions of an L-corridor from `a` to `b`: the direction the
/// corridor leaves `a`, and the direction `b` sees it arrive from.
fn corridor_directions(
    a: (i32, i32),
    b: (i32, i32),
    horizontal_first: bool,
) -> (Direction, Direction) {
    let h = if b.0 >= a.0 {
        Direction::East
    } else {
        Direction::West
    };
    let v = if b.1 >= a.1 {
        Direction::South
    } else {
        Direction::North
    };
    if a.0 == b.0 {
        (v, v.opposite())
    } else if a.1 == b.1 {
        (h, h.opposite())
    } else if horizontal_first {
        // Leaves `a` horizontally, arrives at `b` vertically.
        (h, v.opposite())
    } else {
        (v, h.opposite())
    }
}

/// Record a one-way exit, falling back to any free direction when the
/// preferred one is taken.
fn link(rooms: &mut [Room], from: RoomId, preferred: Direction, to: RoomId) {
    let room = &mut rooms[from];
    let taken =
        |room: &Room, d: &Direction| room.exits.contains_key(d) || room.locked_exits.contains_key(d);
    if !taken(room, &preferred) {
        room.exits.insert(preferred, Some(to));
        return;
    }
    for dir in Direction::ALL {
        if !taken(room, &dir) {
            room.exits.insert(dir, Some(to));
            return;
        }
    }
    log::warn!("room {from} has no free exit direction; corridor to {to} unrecorded");
}

fn furthest_pair(rects: &[Rect]) -> (RoomId, RoomId) {
    let mut best = (0, 0);
    let mut best_distance = -1;
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            let d = manhattan(rects[i].center(), rects[j].center());
            if d > best_distance {
                best_distance = d;
                best = (i, j);
            }
        }
    }
    best
}

fn nearest_to_midpoint(rects: &[Rect], start: RoomId, end: RoomId) -> Option<RoomId> {
    let (sx, sy) = rects[start].center();
    let (ex, ey) = rects[end].center();
    let midpoint = ((sx + ex) / 2, (sy + ey) / 2);
    rects
        .iter()
        .enumerate()
        .filter(|(id, _)| *id != start && *id != end)
        .min_by_key(|(_, rect)| manhattan(rect.center(), midpoint))
        .map(|(id, _)| id)
}

/// Turn every open exit leading into `target` into a locked one.
fn lock_room_entrances(rooms: &mut [Room], target: RoomId, key: KeyKind) {
    for (id, room) in rooms.iter_mut().enumerate() {
        if id == target {
            continue;
        }
        let locked: Vec<Direction> = room
            .exits
            .iter()
            .filter(|(_, t)| **t == Some(target))
            .map(|(d, _)| *d)
            .collect();
        for direction in locked {
            room.exits.remove(&direction);
            room.locked_exits.insert(
                direction,
                LockedExit {
                    key,
                    target: Some(target),
                },
            );
        }
    }
}

// ============================================================================
// Frontier generation (directional growth)
// ============================================================================

/// Generate a room on demand as the player steps into unexplored space.
/// Guarantees an exit back the way the player came; other directions roll
/// independently for open or locked exits.
pub fn frontier_room(
    rng: &mut GameRng,
    catalog: &Catalog,
    player_level: u32,
    quests: &QuestLog,
    travelled: Option<Direction>,
) -> Room {
    let mut room = Room::new(describe_room(rng, catalog));

    let mut free: Vec<Direction> = Direction::ALL.to_vec();
    if let Some(travelled) = travelled {
        let back = travelled.opposite();
        room.exits.insert(back, None);
        free.retain(|d| *d != back);
    } else if let Some(first) = rng.pick(&free).copied() {
        // The very first room still needs somewhere to go.
        room.exits.insert(first, None);
        free.retain(|d| *d != first);
    }

    for direction in free {
        let roll = rng.roll();
        if roll < OPEN_EXIT_CHANCE {
            room.exits.insert(direction, None);
        } else if roll < OPEN_EXIT_CHANCE + LOCKED_EXIT_CHANCE {
            if let Some(key) = rng.pick(&KeyKind::rollable()).copied() {
                room.locked_exits
                    .insert(direction, LockedExit { key, target: None });
            }
        }
    }

    room.feature = roll_feature(rng, catalog, player_level, quests);
    room
}
