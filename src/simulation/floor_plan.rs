//! Floor plan entities: rooms, exits, hazards and safe zones
//!
//! The floor plan is owned by the world and handed to the planner and
//! collision resolver as read-only slices filtered by floor.

use super::geometry::{Position, Rect};
use super::types::{ExitId, HazardId, RoomId, SafeZoneId, SimId};

/// A room on one floor (or on every floor when untagged)
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub rect: Rect,
    pub name: String,
    /// Floor parsed from the display name, `None` means every floor
    pub floor: Option<u32>,
}

impl Room {
    pub fn new(id: RoomId, rect: Rect, name: impl Into<String>) -> Self {
        let name = name.into();
        let floor = parse_floor_tag(&name);
        Self {
            id,
            rect,
            name,
            floor,
        }
    }

    pub fn is_on_floor(&self, floor: u32) -> bool {
        self.floor.map_or(true, |f| f == floor)
    }

    /// Point agents head for when leaving this room
    pub fn door_point(&self) -> Position {
        self.rect.right_midpoint()
    }
}

/// Extract a floor number from a room name such as `"2 этаж: Холл"` or
/// `"Floor 2: Lobby"`
pub fn parse_floor_tag(name: &str) -> Option<u32> {
    let words: Vec<&str> = name
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    words.windows(2).find_map(|pair| {
        if pair[1] == "этаж" {
            pair[0].parse().ok()
        } else if pair[0].eq_ignore_ascii_case("floor") {
            pair[1].parse().ok()
        } else {
            None
        }
    })
}

/// An exit doorway. Exits are reachable from every floor.
#[derive(Debug, Clone)]
pub struct Exit {
    pub id: ExitId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

impl Exit {
    pub fn new(id: ExitId, x: f32, y: f32, width: f32) -> Self {
        Self { id, x, y, width }
    }

    /// The point agents are routed to
    pub fn anchor(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Category of an emergency zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    Fire,
    Smoke,
    Collapse,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [HazardKind::Fire, HazardKind::Smoke, HazardKind::Collapse];

    /// Radius a freshly placed zone of this kind covers
    pub fn default_radius(&self) -> f32 {
        match self {
            HazardKind::Fire => 60.0,
            HazardKind::Smoke => 80.0,
            HazardKind::Collapse => 50.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HazardKind::Fire => "fire",
            HazardKind::Smoke => "smoke",
            HazardKind::Collapse => "collapse",
        }
    }
}

/// A circular emergency zone on one floor. Hazards never move once placed.
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: HazardId,
    pub center: Position,
    pub radius: f32,
    pub kind: HazardKind,
    pub floor: u32,
}

impl Hazard {
    pub fn new(id: HazardId, kind: HazardKind, center: Position, floor: u32) -> Self {
        Self {
            id,
            center,
            radius: kind.default_radius(),
            kind,
            floor,
        }
    }
}

/// Advisory gathering area; not used for routing
#[derive(Debug, Clone)]
pub struct SafeZone {
    pub id: SafeZoneId,
    pub rect: Rect,
    pub name: String,
}

/// The static layout of a building plus the hazards placed in it
#[derive(Debug, Clone)]
pub struct FloorPlan {
    pub rooms: Vec<Room>,
    pub exits: Vec<Exit>,
    pub hazards: Vec<Hazard>,
    pub safe_zones: Vec<SafeZone>,
    pub floor_count: u32,
    next_id: usize,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FloorPlan {
    pub fn new(floor_count: u32) -> Self {
        Self {
            rooms: Vec::new(),
            exits: Vec::new(),
            hazards: Vec::new(),
            safe_zones: Vec::new(),
            floor_count: floor_count.max(1),
            next_id: 0,
        }
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_room(&mut self, rect: Rect, name: impl Into<String>) -> RoomId {
        let id = RoomId(self.next_sim_id());
        self.rooms.push(Room::new(id, rect, name));
        id
    }

    pub fn add_exit(&mut self, x: f32, y: f32, width: f32) -> ExitId {
        let id = ExitId(self.next_sim_id());
        self.exits.push(Exit::new(id, x, y, width));
        id
    }

    pub fn add_safe_zone(&mut self, rect: Rect, name: impl Into<String>) -> SafeZoneId {
        let id = SafeZoneId(self.next_sim_id());
        self.safe_zones.push(SafeZone {
            id,
            rect,
            name: name.into(),
        });
        id
    }

    pub fn add_hazard(&mut self, kind: HazardKind, center: Position, floor: u32) -> HazardId {
        let id = HazardId(self.next_sim_id());
        self.hazards.push(Hazard::new(id, kind, center, floor));
        id
    }

    /// Remove a hazard, returning it if it existed
    pub fn remove_hazard(&mut self, hazard_id: HazardId) -> Option<Hazard> {
        let index = self.hazards.iter().position(|h| h.id == hazard_id)?;
        Some(self.hazards.remove(index))
    }

    pub fn rooms_on_floor(&self, floor: u32) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.is_on_floor(floor)).collect()
    }

    pub fn hazards_on_floor(&self, floor: u32) -> Vec<&Hazard> {
        self.hazards.iter().filter(|h| h.floor == floor).collect()
    }

    /// Single-floor office used by the headless driver and tests
    pub fn demo_office() -> Self {
        let mut plan = FloorPlan::new(1);
        plan.add_room(Rect::new(50.0, 50.0, 300.0, 200.0), "Hall 1");
        plan.add_room(Rect::new(400.0, 50.0, 250.0, 200.0), "Hall 2");
        plan.add_room(Rect::new(50.0, 300.0, 200.0, 150.0), "Office");
        plan.add_room(Rect::new(300.0, 300.0, 350.0, 150.0), "Corridor");
        plan.add_exit(680.0, 220.0, 40.0);
        plan.add_exit(20.0, 220.0, 40.0);
        plan.add_safe_zone(Rect::new(700.0, 180.0, 20.0, 80.0), "Assembly point");
        plan
    }

    /// Two-floor office with floor-tagged rooms
    pub fn demo_two_floor_office() -> Self {
        let mut plan = FloorPlan::new(2);
        plan.add_room(Rect::new(50.0, 50.0, 280.0, 180.0), "Floor 1: Lobby");
        plan.add_room(Rect::new(350.0, 50.0, 150.0, 180.0), "Floor 1: Conference");
        plan.add_room(Rect::new(520.0, 50.0, 130.0, 80.0), "Floor 1: Stairs");
        plan.add_room(Rect::new(50.0, 250.0, 200.0, 150.0), "Floor 1: Cafeteria");
        plan.add_room(Rect::new(270.0, 250.0, 380.0, 150.0), "Floor 1: Open space");
        plan.add_room(Rect::new(50.0, 50.0, 200.0, 150.0), "Floor 2: Office 1");
        plan.add_room(Rect::new(270.0, 50.0, 210.0, 150.0), "Floor 2: Office 2");
        plan.add_room(Rect::new(500.0, 50.0, 150.0, 80.0), "Floor 2: Stairs");
        plan.add_room(Rect::new(50.0, 220.0, 600.0, 70.0), "Floor 2: Corridor");
        plan.add_room(Rect::new(50.0, 310.0, 280.0, 140.0), "Floor 2: Office 3");
        plan.add_room(Rect::new(350.0, 310.0, 300.0, 140.0), "Floor 2: Meeting room");
        plan.add_exit(10.0, 140.0, 35.0);
        plan.add_exit(675.0, 330.0, 35.0);
        plan
    }
}
