//! Core identifier types and fixed constants for the evacuation simulation

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for agent IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub SimId);

/// A wrapper type for room IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub SimId);

/// A wrapper type for exit IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitId(pub SimId);

/// A wrapper type for hazard (emergency zone) IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HazardId(pub SimId);

/// A wrapper type for safe zone IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafeZoneId(pub SimId);

/// A wrapper type for group IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub SimId);

/// Duration of one simulation tick in seconds
pub const TICK_DURATION: f32 = 1.0 / 60.0;

/// Elapsed-time increment per tick at 1x speed
pub const CLOCK_INCREMENT: f32 = 0.016;

/// Slowest allowed global speed scale
pub const MIN_SPEED_SCALE: f32 = 0.5;

/// Fastest allowed global speed scale
pub const MAX_SPEED_SCALE: f32 = 3.0;

/// How far outside a foreign room wall an agent is clamped to
pub const WALL_CLEARANCE: f32 = 0.01;

/// Inset from room walls used for random placement
pub const PLACEMENT_INSET: f32 = 10.0;
