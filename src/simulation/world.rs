//! Main simulation world that ties everything together
//!
//! `SimWorld` is the single owner of all mutable simulation state. The
//! placement layer mutates it through commands between ticks and reads
//! snapshots after a tick has fully committed.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::agent::{Agent, AgentCategory};
use super::agent_manager;
use super::clock::{RunState, SimClock};
use super::command::{AgentEdit, Command};
use super::config::SimConfig;
use super::floor_plan::{FloorPlan, Hazard, HazardKind};
use super::geometry::Position;
use super::group::{summarize_groups, GroupCoordinator, GroupEvacuated, GroupSummary};
use super::types::{
    AgentId, GroupId, HazardId, SimId, MAX_SPEED_SCALE, MIN_SPEED_SCALE, PLACEMENT_INSET,
};

/// What happened during one call to `SimWorld::tick`
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Agents that evacuated this tick, in update order
    pub evacuated: Vec<AgentId>,
    pub group_events: Vec<GroupEvacuated>,
    /// The run finished on this tick
    pub finished: bool,
}

/// Read-only view of one agent for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Position,
    pub category: AgentCategory,
    pub evacuated: bool,
    pub cursor: usize,
    pub group: Option<GroupId>,
    pub floor: u32,
}

/// Evacuated/total counts for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    pub category: AgentCategory,
    pub evacuated: usize,
    pub total: usize,
}

/// Evacuation counters across every floor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvacuationProgress {
    pub evacuated: usize,
    pub total: usize,
    pub by_category: Vec<CategoryProgress>,
}

impl EvacuationProgress {
    /// Share of agents evacuated, in percent
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.evacuated as f32 / self.total as f32 * 100.0
        }
    }
}

/// The main simulation world
pub struct SimWorld {
    /// Building layout and placed hazards
    pub plan: FloorPlan,

    /// All agents, in placement order
    pub agents: Vec<Agent>,

    pub clock: SimClock,

    pub config: SimConfig,

    /// Floor whose agents are updated each tick (1-based)
    pub current_floor: u32,

    /// Every group event reported during the current run
    pub group_events: Vec<GroupEvacuated>,

    groups: GroupCoordinator,

    /// Next ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible placement
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(FloorPlan::default())
    }
}

impl SimWorld {
    fn new_internal(plan: FloorPlan, rng: Option<StdRng>) -> Self {
        Self {
            plan,
            agents: Vec::new(),
            clock: SimClock::new(),
            config: SimConfig::default(),
            current_floor: 1,
            group_events: Vec::new(),
            groups: GroupCoordinator::new(),
            next_id: 0,
            rng,
        }
    }

    pub fn new(plan: FloorPlan) -> Self {
        Self::new_internal(plan, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(plan: FloorPlan, seed: u64) -> Self {
        Self::new_internal(plan, Some(StdRng::seed_from_u64(seed)))
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: std::ops::Range<f32>) -> f32 {
        if range.is_empty() {
            return range.start;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocate a fresh group id for a batch of agents
    pub fn new_group_id(&mut self) -> GroupId {
        GroupId(self.next_sim_id())
    }

    /// Agent placement and edits are only allowed while the clock is stopped
    fn ensure_not_running(&self, action: &str) -> Result<()> {
        if self.clock.is_running() {
            bail!("Cannot {} while the simulation is running", action);
        }
        Ok(())
    }

    fn spawn_agent(
        &mut self,
        category: AgentCategory,
        position: Position,
        group: Option<GroupId>,
    ) -> AgentId {
        let id = AgentId(self.next_sim_id());
        let agent = Agent::new(id, category, position, self.current_floor, group);
        debug!(
            "Placed {} agent {:?} at ({:.1}, {:.1}) on floor {}",
            category.label(),
            id.0,
            position.x,
            position.y,
            self.current_floor
        );
        self.agents.push(agent);
        id
    }

    /// Place a single agent with no group
    pub fn place_agent(&mut self, category: AgentCategory, position: Position) -> Result<AgentId> {
        let ids = self.place_agents(category, position, 1, None)?;
        ids.first().copied().context("No agent was placed")
    }

    /// Place `count` agents around `position` on the active floor.
    /// Batches of more than one without a group id get a new group.
    pub fn place_agents(
        &mut self,
        category: AgentCategory,
        position: Position,
        count: usize,
        group: Option<GroupId>,
    ) -> Result<Vec<AgentId>> {
        self.ensure_not_running("place agents")?;
        if count == 0 {
            bail!("Batch must contain at least one agent");
        }
        if !(position.x.is_finite() && position.y.is_finite()) {
            bail!("Agent position must be finite");
        }

        let group = match group {
            Some(group) => Some(group),
            None if count > 1 => Some(self.new_group_id()),
            None => None,
        };

        let spread = self.config.batch_spread.max(0.0);
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let spot = if i == 0 {
                position
            } else {
                let dx = self.random_range(-spread..spread);
                let dy = self.random_range(-spread..spread);
                position.offset(dx, dy)
            };
            ids.push(self.spawn_agent(category, spot, group));
        }
        Ok(ids)
    }

    /// Place `count` agents at random spots inside rooms of the active floor
    pub fn place_agents_in_rooms(
        &mut self,
        category: AgentCategory,
        count: usize,
    ) -> Result<Vec<AgentId>> {
        self.ensure_not_running("place agents")?;
        if count == 0 {
            bail!("Batch must contain at least one agent");
        }
        // Rooms too small for the inset have no valid spot
        let rects: Vec<_> = self
            .plan
            .rooms_on_floor(self.current_floor)
            .into_iter()
            .map(|room| room.rect)
            .filter(|rect| {
                rect.width > 2.0 * PLACEMENT_INSET && rect.height > 2.0 * PLACEMENT_INSET
            })
            .collect();
        if rects.is_empty() {
            bail!(
                "No rooms on floor {} large enough to place agents in",
                self.current_floor
            );
        }

        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let rect = *self.choose_random(&rects).context("No room to place agent in")?;
            let x = rect.x + self.random_range(PLACEMENT_INSET..rect.width - PLACEMENT_INSET);
            let y = rect.y + self.random_range(PLACEMENT_INSET..rect.height - PLACEMENT_INSET);
            ids.push(self.spawn_agent(category, Position::new(x, y), None));
        }
        Ok(ids)
    }

    pub fn edit_agent(&mut self, agent_id: AgentId, edit: &AgentEdit) -> Result<()> {
        self.ensure_not_running("edit agents")?;
        agent_manager::edit_agent(&mut self.agents, agent_id, edit)
    }

    /// Remove an agent. If that leaves its group fully evacuated, the group
    /// is reported at its last remaining member's evacuation time.
    pub fn remove_agent(&mut self, agent_id: AgentId) -> Result<Agent> {
        self.ensure_not_running("remove agents")?;
        let removed =
            agent_manager::remove_agent(&mut self.agents, agent_id).context("Agent not found")?;

        if let Some(group) = removed.group {
            let time = self
                .agents
                .iter()
                .filter(|a| a.group == Some(group))
                .filter_map(|a| a.evacuated_at)
                .fold(0.0, f32::max);
            if let Some(event) = self.groups.check_group(group, &self.agents, time) {
                self.group_events.push(event);
            }
        }

        Ok(removed)
    }

    /// Place a hazard on the active floor. Paths planned earlier keep their
    /// waypoints.
    pub fn place_hazard(&mut self, kind: HazardKind, position: Position) -> Result<HazardId> {
        if !(position.x.is_finite() && position.y.is_finite()) {
            bail!("Hazard position must be finite");
        }
        let id = self.plan.add_hazard(kind, position, self.current_floor);
        debug!(
            "Placed {} hazard {:?} at ({:.1}, {:.1}) on floor {}",
            kind.label(),
            id.0,
            position.x,
            position.y,
            self.current_floor
        );
        Ok(id)
    }

    pub fn remove_hazard(&mut self, hazard_id: HazardId) -> Result<Hazard> {
        self.plan
            .remove_hazard(hazard_id)
            .context("Hazard not found")
    }

    /// Start a run, resume a paused one, or restart a finished one
    pub fn start(&mut self) -> Result<()> {
        if self.clock.is_running() {
            debug!("Simulation already running at {:.2}s", self.clock.elapsed);
            return Ok(());
        }
        if self.agents.is_empty() {
            bail!("Cannot start a simulation with no agents");
        }
        if self.clock.is_finished() {
            self.reset();
        }
        if self.plan.exits.is_empty() {
            warn!("Floor plan has no exits; agents will not find a path");
        }
        self.clock.start();
        info!(
            "Simulation running with {} agents on floor {}",
            self.agents.len(),
            self.current_floor
        );
        Ok(())
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Stop the run and return every agent to where it was placed
    pub fn reset(&mut self) {
        self.clock.reset();
        agent_manager::reset_agents(&mut self.agents);
        self.groups.reset();
        self.group_events.clear();
    }

    pub fn restart(&mut self) -> Result<()> {
        self.reset();
        self.start()
    }

    pub fn set_speed_scale(&mut self, scale: f32) -> Result<()> {
        if !SimConfig::is_valid_speed_scale(scale) {
            bail!(
                "Speed scale {} outside {}..={}",
                scale,
                MIN_SPEED_SCALE,
                MAX_SPEED_SCALE
            );
        }
        self.config.speed_scale = scale;
        Ok(())
    }

    pub fn switch_floor(&mut self, floor: u32) -> Result<()> {
        if floor == 0 || floor > self.plan.floor_count {
            bail!(
                "Floor {} does not exist (building has {} floors)",
                floor,
                self.plan.floor_count
            );
        }
        self.current_floor = floor;
        Ok(())
    }

    /// Apply a command from the placement layer
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::PlaceAgents {
                category,
                position,
                count,
                group,
            } => self.place_agents(category, position, count, group).map(|_| ()),
            Command::PlaceAgentsInRooms { category, count } => {
                self.place_agents_in_rooms(category, count).map(|_| ())
            }
            Command::EditAgent(agent_id, edit) => self.edit_agent(agent_id, &edit),
            Command::RemoveAgent(agent_id) => self.remove_agent(agent_id).map(|_| ()),
            Command::PlaceHazard { kind, position } => {
                self.place_hazard(kind, position).map(|_| ())
            }
            Command::RemoveHazard(hazard_id) => self.remove_hazard(hazard_id).map(|_| ()),
            Command::Start => self.start(),
            Command::Pause => {
                self.pause();
                Ok(())
            }
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::Restart => self.restart(),
            Command::SetSpeedScale(scale) => self.set_speed_scale(scale),
            Command::SwitchFloor(floor) => self.switch_floor(floor),
        }
    }

    pub fn all_evacuated(&self) -> bool {
        self.agents.iter().all(|a| a.evacuated)
    }

    /// Main simulation tick
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if !self.clock.is_running() {
            return report;
        }

        if self.all_evacuated() {
            self.clock.finish();
            report.finished = true;
            info!(
                "All {} agents evacuated after {:.1}s",
                self.agents.len(),
                self.clock.elapsed
            );
            return report;
        }

        let time = self.clock.elapsed;
        let evacuated = agent_manager::update_agents(
            &mut self.agents,
            &self.plan,
            &self.config,
            self.current_floor,
            time,
        );

        for agent_id in &evacuated {
            if let Some(agent) = self.agents.iter().find(|a| a.id == *agent_id) {
                debug!("Agent {:?} evacuated at {:.2}s", agent_id.0, time);
                if let Some(event) = self.groups.on_agent_evacuated(agent, &self.agents, time) {
                    report.group_events.push(event);
                }
            }
        }

        self.group_events.extend(report.group_events.iter().copied());
        report.evacuated = evacuated;
        self.clock.advance(self.config.speed_scale);
        report
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }

    pub fn state(&self) -> RunState {
        self.clock.state
    }

    pub fn agent(&self, agent_id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    /// Per-agent view for rendering
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|a| AgentSnapshot {
                id: a.id,
                position: a.position,
                category: a.category,
                evacuated: a.evacuated,
                cursor: a.cursor,
                group: a.group,
                floor: a.floor,
            })
            .collect()
    }

    pub fn progress(&self) -> EvacuationProgress {
        let by_category = AgentCategory::ALL
            .iter()
            .map(|&category| {
                let members = self.agents.iter().filter(|a| a.category == category);
                CategoryProgress {
                    category,
                    evacuated: members.clone().filter(|a| a.evacuated).count(),
                    total: members.count(),
                }
            })
            .collect();

        EvacuationProgress {
            evacuated: self.agents.iter().filter(|a| a.evacuated).count(),
            total: self.agents.len(),
            by_category,
        }
    }

    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        summarize_groups(&self.agents, &self.group_events)
    }

    /// Create a demo world with a few agents and groups in the office plan
    pub fn create_demo_world() -> Self {
        Self::build_demo_world(SimWorld::new(FloorPlan::demo_office()))
    }

    /// Create a demo world with a seeded RNG for reproducible simulations
    pub fn create_demo_world_with_seed(seed: u64) -> Self {
        Self::build_demo_world(SimWorld::new_with_seed(FloorPlan::demo_office(), seed))
    }

    /// Internal helper to populate the demo world
    pub fn build_demo_world(mut world: SimWorld) -> Self {
        // Hall 2 and the corridor route towards the east exit
        let _ = world.place_agents(AgentCategory::Adult, Position::new(520.0, 140.0), 5, None);
        let _ = world.place_agents(AgentCategory::Elderly, Position::new(560.0, 380.0), 3, None);
        let _ = world.place_agent(AgentCategory::MobilityImpaired, Position::new(600.0, 200.0));
        let _ = world.place_agent(AgentCategory::Adult, Position::new(620.0, 420.0));

        // Hall 1 routes through its door and back out to the west exit
        let _ = world.place_agent(AgentCategory::Child, Position::new(250.0, 150.0));

        world
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        let progress = self.progress();

        println!("=== Evacuation Simulation Summary ===");
        println!("{}", self.clock.summary());
        println!(
            "Floor: {}/{}, Speed: {:.1}x",
            self.current_floor, self.plan.floor_count, self.config.speed_scale
        );
        println!(
            "Rooms: {}, Exits: {}, Hazards: {}",
            self.plan.rooms.len(),
            self.plan.exits.len(),
            self.plan.hazards.len()
        );
        println!(
            "Evacuated: {}/{} ({:.1}%)",
            progress.evacuated,
            progress.total,
            progress.percent()
        );
        println!();

        println!("--- By Category ---");
        for entry in &progress.by_category {
            if entry.total > 0 {
                println!(
                    "  {}: {}/{}",
                    entry.category.label(),
                    entry.evacuated,
                    entry.total
                );
            }
        }

        let groups = self.group_summaries();
        if !groups.is_empty() {
            println!("--- Groups ---");
            for group in &groups {
                match group.evacuation_time {
                    Some(time) => println!(
                        "  Group {:?}: {} members, evacuated at {:.1}s",
                        group.group.0 .0, group.size, time
                    ),
                    None => println!(
                        "  Group {:?}: {}/{} members out",
                        group.group.0 .0, group.evacuated_members, group.size
                    ),
                }
            }
        }

        if !self.plan.hazards.is_empty() {
            println!("--- Hazards ---");
            for hazard in &self.plan.hazards {
                println!(
                    "  Hazard {:?}: {} at ({:.1}, {:.1}), radius={:.0}, floor={}",
                    hazard.id.0 .0,
                    hazard.kind.label(),
                    hazard.center.x,
                    hazard.center.y,
                    hazard.radius,
                    hazard.floor
                );
            }
        }

        let active: Vec<&Agent> = self.agents.iter().filter(|a| !a.evacuated).collect();
        if !active.is_empty() {
            println!("--- Active Agents ---");
            for agent in active {
                println!(
                    "  Agent {:?}: {} at ({:.1}, {:.1}), waypoint={}/{}",
                    agent.id.0 .0,
                    agent.category.label(),
                    agent.position.x,
                    agent.position.y,
                    agent.cursor,
                    agent.path.len()
                );
            }
        }
    }
}
