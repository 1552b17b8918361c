//! End-to-end evacuation behaviour
//!
//! These tests drive `SimWorld` through whole runs and check the properties
//! every run must keep: agents get out, never walk through foreign rooms,
//! and groups are reported exactly once.

use evac_sim::simulation::{
    plan, AgentCategory, Command, FloorPlan, HazardField, HazardKind, NeighborSearch, PlannerSteps,
    Position, Rect, RunState, SimConfig, SimWorld, TickReport,
};

const EPSILON: f32 = 1e-3;

/// Tick until the run finishes, returning the number of ticks taken
fn run_to_completion(world: &mut SimWorld, max_ticks: u32) -> Option<u32> {
    for tick in 1..=max_ticks {
        if world.tick().finished {
            return Some(tick);
        }
    }
    None
}

fn open_floor_with_exit(x: f32, y: f32) -> FloorPlan {
    let mut plan = FloorPlan::new(1);
    plan.add_exit(x, y, 40.0);
    plan
}

#[test]
fn test_single_agent_leaves_room_and_evacuates() {
    let mut plan = FloorPlan::new(1);
    let room = Rect::new(50.0, 50.0, 300.0, 200.0);
    plan.add_room(room, "Hall");
    plan.add_exit(680.0, 220.0, 40.0);

    let mut world = SimWorld::new(plan);
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 100.0))
        .unwrap();
    world.start().unwrap();

    let mut left_room = false;
    let mut finished = false;
    for _ in 0..2000 {
        let report = world.tick();
        let agent = world.agent(id).unwrap();
        let inside = room.contains(&agent.position);
        if left_room {
            assert!(
                !inside,
                "Agent re-entered the room at ({}, {})",
                agent.position.x, agent.position.y
            );
        }
        left_room |= !inside;
        if report.finished {
            finished = true;
            break;
        }
    }

    assert!(finished, "Agent never evacuated");
    assert!(left_room);
    assert_eq!(world.state(), RunState::Finished);

    let agent = world.agent(id).unwrap();
    assert!(agent.evacuated);
    assert!(agent.evacuated_at.is_some());
    assert_eq!(world.progress().evacuated, 1);
}

#[test]
fn test_two_close_agents_are_separated() {
    let mut world = SimWorld::new(open_floor_with_exit(900.0, 150.0));
    let a = world
        .place_agent(AgentCategory::Adult, Position::new(500.0, 150.0))
        .unwrap();
    let b = world
        .place_agent(AgentCategory::Adult, Position::new(501.0, 150.0))
        .unwrap();
    world.start().unwrap();

    // First tick plans, second tick moves and resolves
    world.tick();
    world.tick();

    let pa = world.agent(a).unwrap().position;
    let pb = world.agent(b).unwrap().position;
    assert!(
        pa.distance(&pb) >= 20.0 - EPSILON,
        "Agents only {} apart",
        pa.distance(&pb)
    );
}

#[test]
fn test_group_time_is_last_member_time() {
    let mut world = SimWorld::new_with_seed(open_floor_with_exit(600.0, 100.0), 11);
    let ids = world
        .place_agents(AgentCategory::Adult, Position::new(100.0, 100.0), 5, None)
        .unwrap();
    assert_eq!(ids.len(), 5);

    let group = world.agent(ids[0]).unwrap().group.expect("batch has a group");
    assert!(ids
        .iter()
        .all(|id| world.agent(*id).unwrap().group == Some(group)));

    world.start().unwrap();
    assert!(run_to_completion(&mut world, 5000).is_some());

    assert_eq!(world.group_events.len(), 1);
    let event = world.group_events[0];
    assert_eq!(event.group, group);

    let times: Vec<f32> = ids
        .iter()
        .map(|id| world.agent(*id).unwrap().evacuated_at.unwrap())
        .collect();
    let last = times.iter().copied().fold(f32::MIN, f32::max);
    let first = times.iter().copied().fold(f32::MAX, f32::min);

    assert_eq!(event.time, last);
    assert!(event.time >= first);

    let summaries = world.group_summaries();
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].all_evacuated());
    assert_eq!(summaries[0].size, 5);
    assert_eq!(summaries[0].evacuation_time, Some(last));
}

#[test]
fn test_planned_path_avoids_hazard() {
    let mut plan = open_floor_with_exit(600.0, 250.0);
    plan.add_hazard(HazardKind::Fire, Position::new(350.0, 250.0), 1);

    let mut world = SimWorld::new(plan);
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 250.0))
        .unwrap();
    world.start().unwrap();
    world.tick();

    let config = SimConfig::default();
    let hazard = &world.plan.hazards[0];
    let clearance = hazard.radius + config.hazard_margin;
    let agent = world.agent(id).unwrap();

    assert!(agent.has_path());
    for waypoint in &agent.path {
        assert!(
            waypoint.distance(&hazard.center) >= clearance - EPSILON,
            "Waypoint ({}, {}) is inside the hazard margin",
            waypoint.x,
            waypoint.y
        );
    }

    let last = agent.path.last().unwrap();
    assert!(last.distance(&Position::new(600.0, 250.0)) < EPSILON);
}

#[test]
fn test_plan_pushes_centre_point_clear() {
    let mut floor_plan = open_floor_with_exit(600.0, 250.0);
    floor_plan.add_hazard(HazardKind::Fire, Position::new(350.0, 250.0), 1);

    let mut world = SimWorld::new(floor_plan);
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 250.0))
        .unwrap();

    let config = SimConfig::default();
    let field = HazardField::from_config(world.plan.hazards_on_floor(1), &config);
    let rooms = world.plan.rooms_on_floor(1);
    let path = plan(
        world.agent(id).unwrap(),
        &world.plan.exits,
        &rooms,
        &field,
        PlannerSteps::default(),
    );

    assert_eq!(path.len(), 20);
    // The midpoint lands on the hazard centre and is pushed straight up
    let midpoint = path[9];
    assert!((midpoint.x - 350.0).abs() < EPSILON);
    assert!((midpoint.y - 115.0).abs() < EPSILON);
}

#[test]
fn test_demo_run_properties() {
    let mut world = SimWorld::create_demo_world_with_seed(42);
    world.start().unwrap();

    let rooms: Vec<Rect> = world.plan.rooms.iter().map(|r| r.rect).collect();
    let mut previous = world.snapshot();
    let mut evacuations = vec![0u32; previous.len()];
    let mut finished = false;

    for _ in 0..3000 {
        let report: TickReport = world.tick();
        let current = world.snapshot();

        for (i, (before, after)) in previous.iter().zip(&current).enumerate() {
            // Evacuation is monotonic and freezes the agent
            if before.evacuated {
                assert!(after.evacuated);
                assert_eq!(before.position, after.position);
                assert_eq!(before.cursor, after.cursor);
            } else {
                assert!(after.cursor >= before.cursor, "Cursor moved backwards");
                if after.evacuated {
                    evacuations[i] += 1;
                }
            }

            // No agent walks into a room it was not already standing in
            for rect in &rooms {
                if rect.contains(&after.position) {
                    assert!(
                        rect.contains(&before.position),
                        "Agent {:?} entered a foreign room at ({}, {})",
                        after.id,
                        after.position.x,
                        after.position.y
                    );
                }
            }
        }

        previous = current;
        if report.finished {
            finished = true;
            break;
        }
    }

    assert!(finished, "Demo run did not finish");
    assert!(evacuations.iter().all(|&n| n == 1));

    // Each group is reported at most once
    let mut groups: Vec<_> = world.group_events.iter().map(|e| e.group).collect();
    let reported = groups.len();
    groups.sort();
    groups.dedup();
    assert_eq!(groups.len(), reported);

    let progress = world.progress();
    assert_eq!(progress.evacuated, progress.total);
    assert_eq!(world.group_summaries().len(), world.group_events.len());
}

#[test]
fn test_finished_run_stops_clock() {
    let mut world = SimWorld::new(open_floor_with_exit(200.0, 100.0));
    world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 100.0))
        .unwrap();
    world.start().unwrap();

    assert!(run_to_completion(&mut world, 1000).is_some());
    let elapsed = world.elapsed();
    let ticks = world.clock.ticks;

    let report = world.tick();
    assert!(!report.finished);
    assert!(report.evacuated.is_empty());
    assert_eq!(world.elapsed(), elapsed);
    assert_eq!(world.clock.ticks, ticks);
}

#[test]
fn test_reset_reports_groups_again() {
    let mut world = SimWorld::new_with_seed(open_floor_with_exit(400.0, 100.0), 5);
    let ids = world
        .place_agents(AgentCategory::Child, Position::new(100.0, 100.0), 3, None)
        .unwrap();
    let spawns: Vec<Position> = ids
        .iter()
        .map(|id| world.agent(*id).unwrap().position)
        .collect();

    world.start().unwrap();
    assert!(run_to_completion(&mut world, 5000).is_some());
    assert_eq!(world.group_events.len(), 1);

    world.reset();
    assert_eq!(world.state(), RunState::Idle);
    assert_eq!(world.elapsed(), 0.0);
    assert!(world.group_events.is_empty());
    for (id, spawn) in ids.iter().zip(&spawns) {
        let agent = world.agent(*id).unwrap();
        assert!(!agent.evacuated);
        assert!(agent.evacuated_at.is_none());
        assert!(!agent.has_path());
        assert_eq!(agent.position, *spawn);
    }

    world.start().unwrap();
    assert!(run_to_completion(&mut world, 5000).is_some());
    assert_eq!(world.group_events.len(), 1);
}

#[test]
fn test_start_after_finish_restarts() {
    let mut world = SimWorld::new(open_floor_with_exit(200.0, 100.0));
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 100.0))
        .unwrap();
    world.start().unwrap();
    assert!(run_to_completion(&mut world, 1000).is_some());

    world.start().unwrap();
    assert_eq!(world.state(), RunState::Running);
    let agent = world.agent(id).unwrap();
    assert!(!agent.evacuated);
    assert_eq!(agent.position, Position::new(100.0, 100.0));
}

#[test]
fn test_second_start_keeps_running_clock() {
    let mut world = SimWorld::new_with_seed(open_floor_with_exit(600.0, 100.0), 4);
    let early = world
        .place_agent(AgentCategory::Adult, Position::new(560.0, 100.0))
        .unwrap();
    world
        .place_agents(AgentCategory::MobilityImpaired, Position::new(100.0, 100.0), 2, None)
        .unwrap();
    world.start().unwrap();
    for _ in 0..200 {
        world.tick();
    }

    let before = world.elapsed();
    let ticks = world.clock.ticks;
    let early_time = world.agent(early).unwrap().evacuated_at;
    assert!(early_time.is_some());

    world.start().unwrap();
    assert_eq!(world.state(), RunState::Running);
    assert_eq!(world.elapsed(), before);
    assert_eq!(world.clock.ticks, ticks);
    assert_eq!(world.agent(early).unwrap().evacuated_at, early_time);

    world.apply(Command::Start).unwrap();
    world.tick();
    assert!(world.elapsed() > before);
}

#[test]
fn test_wall_does_not_count_as_arrival() {
    // The exit sits just inside a room the agent cannot enter
    let mut plan = open_floor_with_exit(215.0, 150.0);
    let room = Rect::new(200.0, 100.0, 100.0, 100.0);
    plan.add_room(room, "Store");

    let mut world = SimWorld::new(plan);
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 150.0))
        .unwrap();
    world.start().unwrap();

    for _ in 0..500 {
        world.tick();
    }

    let agent = world.agent(id).unwrap();
    assert!(!agent.evacuated, "Agent evacuated through a wall");
    assert!(agent.position.x < room.x);
    assert!(agent.position.distance(&Position::new(215.0, 150.0)) > 15.0);
    assert_eq!(world.state(), RunState::Running);
}

#[test]
fn test_agent_stalls_behind_foreign_room() {
    let mut plan = open_floor_with_exit(500.0, 150.0);
    let room = Rect::new(200.0, 100.0, 100.0, 100.0);
    plan.add_room(room, "Store");

    let mut world = SimWorld::new(plan);
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 150.0))
        .unwrap();
    world.start().unwrap();

    for _ in 0..1000 {
        world.tick();
        let agent = world.agent(id).unwrap();
        assert!(!room.contains(&agent.position));
    }

    let agent = world.agent(id).unwrap();
    assert!(!agent.evacuated);
    assert!(agent.position.x < room.x);
    assert_eq!(world.state(), RunState::Running);
}

#[test]
fn test_paused_world_does_not_move() {
    let mut world = SimWorld::new(open_floor_with_exit(600.0, 100.0));
    let id = world
        .place_agent(AgentCategory::Elderly, Position::new(100.0, 100.0))
        .unwrap();
    world.start().unwrap();
    for _ in 0..10 {
        world.tick();
    }

    world.pause();
    let position = world.agent(id).unwrap().position;
    let elapsed = world.elapsed();
    for _ in 0..10 {
        world.tick();
    }
    assert_eq!(world.agent(id).unwrap().position, position);
    assert_eq!(world.elapsed(), elapsed);

    // Resuming keeps the elapsed time
    world.start().unwrap();
    world.tick();
    assert!(world.elapsed() > elapsed);
}

#[test]
fn test_speed_scale_shortens_run() {
    let mut slow = SimWorld::new(open_floor_with_exit(400.0, 100.0));
    slow.place_agent(AgentCategory::Adult, Position::new(100.0, 100.0))
        .unwrap();
    let mut fast = SimWorld::new(open_floor_with_exit(400.0, 100.0));
    fast.place_agent(AgentCategory::Adult, Position::new(100.0, 100.0))
        .unwrap();
    fast.set_speed_scale(3.0).unwrap();

    slow.start().unwrap();
    fast.start().unwrap();
    let slow_ticks = run_to_completion(&mut slow, 2000).unwrap();
    let fast_ticks = run_to_completion(&mut fast, 2000).unwrap();
    assert!(fast_ticks < slow_ticks);
}

#[test]
fn test_live_hazard_avoidance_keeps_agent_out() {
    let mut world = SimWorld::new(open_floor_with_exit(600.0, 250.0));
    let id = world
        .place_agent(AgentCategory::Adult, Position::new(100.0, 250.0))
        .unwrap();
    world.config.avoid_hazards_while_moving = true;
    world.start().unwrap();
    // Plan before the hazard exists so the path runs straight through it
    world.tick();
    let center = Position::new(350.0, 250.0);
    world.place_hazard(HazardKind::Collapse, center).unwrap();

    for _ in 0..200 {
        world.tick();
        let agent = world.agent(id).unwrap();
        assert!(agent.position.distance(&center) > 50.0);
    }
    assert!(!world.agent(id).unwrap().evacuated);
}

#[test]
fn test_scan_and_grid_agree() {
    let run = |neighbor_search: NeighborSearch| {
        let config = SimConfig {
            neighbor_search,
            ..SimConfig::default()
        };
        let mut world = SimWorld::new(open_floor_with_exit(900.0, 150.0)).with_config(config);
        world
            .place_agent(AgentCategory::Adult, Position::new(500.0, 150.0))
            .unwrap();
        world
            .place_agent(AgentCategory::Child, Position::new(505.0, 152.0))
            .unwrap();
        world.start().unwrap();
        for _ in 0..100 {
            world.tick();
        }
        world
            .snapshot()
            .into_iter()
            .map(|a| a.position)
            .collect::<Vec<_>>()
    };

    assert_eq!(run(NeighborSearch::Scan), run(NeighborSearch::Grid));
}
