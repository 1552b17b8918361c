//! Group completion tracking
//!
//! A group is every agent sharing a `GroupId`. When the last member
//! evacuates the coordinator reports the group once per run.

use std::collections::HashMap;

use log::info;

use super::agent::Agent;
use super::types::GroupId;

/// Fired once when every member of a group has evacuated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupEvacuated {
    pub group: GroupId,
    /// Elapsed simulation time when the last member evacuated
    pub time: f32,
}

#[derive(Debug, Clone, Default)]
pub struct GroupCoordinator {
    reported: HashMap<GroupId, bool>,
}

impl GroupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reported(&self, group: GroupId) -> bool {
        self.reported.get(&group).copied().unwrap_or(false)
    }

    /// Check `agent`'s group after it evacuated
    pub fn on_agent_evacuated(
        &mut self,
        agent: &Agent,
        agents: &[Agent],
        time: f32,
    ) -> Option<GroupEvacuated> {
        self.check_group(agent.group?, agents, time)
    }

    /// Report `group` if it has members and all of them are out
    pub fn check_group(
        &mut self,
        group: GroupId,
        agents: &[Agent],
        time: f32,
    ) -> Option<GroupEvacuated> {
        if self.is_reported(group) {
            return None;
        }

        let mut members = agents.iter().filter(|a| a.group == Some(group)).peekable();
        if members.peek().is_none() || !members.all(|a| a.evacuated) {
            return None;
        }

        self.reported.insert(group, true);
        info!("Group {:?} evacuated at {:.1}s", group.0 .0, time);
        Some(GroupEvacuated { group, time })
    }

    /// Forget every report; called when a run is reset or restarted
    pub fn reset(&mut self) {
        self.reported.clear();
    }
}

/// Aggregate view of one group for display
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: GroupId,
    pub size: usize,
    pub evacuated_members: usize,
    /// Set once the group has been reported evacuated
    pub evacuation_time: Option<f32>,
}

impl GroupSummary {
    pub fn all_evacuated(&self) -> bool {
        self.evacuated_members == self.size
    }
}

/// Summarise every group, evacuated groups first and then by evacuation time
pub fn summarize_groups(agents: &[Agent], events: &[GroupEvacuated]) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = Vec::new();

    for agent in agents {
        let Some(group) = agent.group else { continue };
        let index = match summaries.iter().position(|s| s.group == group) {
            Some(index) => index,
            None => {
                summaries.push(GroupSummary {
                    group,
                    size: 0,
                    evacuated_members: 0,
                    evacuation_time: events.iter().find(|e| e.group == group).map(|e| e.time),
                });
                summaries.len() - 1
            }
        };
        summaries[index].size += 1;
        if agent.evacuated {
            summaries[index].evacuated_members += 1;
        }
    }

    summaries.sort_by(|a, b| {
        b.all_evacuated().cmp(&a.all_evacuated()).then_with(|| {
            match (a.evacuation_time, b.evacuation_time) {
                (Some(ta), Some(tb)) => ta.total_cmp(&tb),
                _ => std::cmp::Ordering::Equal,
            }
        })
    });
    summaries
}
