//! Per-game belief of how likely each agent holds each role.
//!
//! The numbers come from a [`ProbabilitySource`]; the player only reads and, for
//! agents it knows better about, overwrites them.
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::agent::{Agent, Role};
use crate::game_info::{GameInfo, GameSetting};

#[derive(Debug, Clone, Default)]
pub struct RoleProbabilities {
    table: BTreeMap<Role, BTreeMap<Agent, f64>>,
    // Tiny per-agent offsets so that ties break the same way all game.
    jitter: BTreeMap<Agent, f64>,
}

impl RoleProbabilities {
    pub fn new() -> Self {
        Self::default()
    }

    // One for our own role, zero elsewhere, plus the jitter.
    pub fn initialize(&mut self, info: &GameInfo, jitter: f64) {
        let mut rng = rand::rng();
        self.table.clear();
        self.jitter = info
            .agent_list()
            .into_iter()
            .map(|agent| (agent, rng.random::<f64>() * jitter))
            .collect();
        let me = info.agent;
        let my_role = info.role();
        for role in Role::ESTIMATED {
            let row = info
                .agent_list()
                .into_iter()
                .map(|agent| {
                    let known = agent == me && my_role == Some(role);
                    (agent, if known { 1.0 } else { 0.0 })
                })
                .collect();
            self.table.insert(role, row);
        }
    }

    pub fn get(&self, agent: Agent, role: Role) -> f64 {
        let value = self
            .table
            .get(&role)
            .and_then(|row| row.get(&agent))
            .copied()
            .unwrap_or(0.0);
        value + self.jitter.get(&agent).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, agent: Agent, role: Role, probability: f64) {
        self.table.entry(role).or_default().insert(agent, probability);
    }

    fn compare(&self, role: Role) -> impl Fn(&Agent, &Agent) -> Ordering + '_ {
        move |a: &Agent, b: &Agent| self.get(*a, role).total_cmp(&self.get(*b, role))
    }

    pub fn max(&self, role: Role, agents: &[Agent], excludes: &[Agent]) -> Option<Agent> {
        agents
            .iter()
            .filter(|a| !excludes.contains(a))
            .copied()
            .max_by(self.compare(role))
    }

    pub fn min(&self, role: Role, agents: &[Agent], excludes: &[Agent]) -> Option<Agent> {
        agents
            .iter()
            .filter(|a| !excludes.contains(a))
            .copied()
            .min_by(self.compare(role))
    }

    pub fn ascending(&self, role: Role, agents: &[Agent]) -> Vec<Agent> {
        let mut sorted = agents.to_vec();
        sorted.sort_by(self.compare(role));
        sorted
    }

    pub fn descending(&self, role: Role, agents: &[Agent]) -> Vec<Agent> {
        let mut sorted = self.ascending(role, agents);
        sorted.reverse();
        sorted
    }
}

// Where the numbers come from. Called once per game and on every update.
pub trait ProbabilitySource: std::fmt::Debug {
    fn initialize(&mut self, _info: &GameInfo, _setting: &GameSetting, _table: &mut RoleProbabilities) {}

    fn update(&mut self, _info: &GameInfo, _table: &mut RoleProbabilities) {}
}

// Spreads the unclaimed role slots evenly over the other agents.
#[derive(Debug, Clone, Default)]
pub struct PriorSource {
    setting: GameSetting,
}

impl PriorSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn spread(&self, info: &GameInfo, table: &mut RoleProbabilities) {
        let others: Vec<_> = info
            .agent_list()
            .into_iter()
            .filter(|a| *a != info.agent)
            .collect();
        if others.is_empty() {
            return;
        }
        let my_role = info.role();
        for role in Role::ESTIMATED {
            let mut slots = self.setting.role_num(role);
            if my_role == Some(role) {
                slots = slots.saturating_sub(1);
            }
            for agent in &others {
                let known = info.role_map.get(agent).copied();
                let probability = match known {
                    Some(r) if r == role => 1.0,
                    Some(_) => 0.0,
                    None => slots as f64 / others.len() as f64,
                };
                table.set(*agent, role, probability);
            }
        }
    }
}

impl ProbabilitySource for PriorSource {
    fn initialize(&mut self, info: &GameInfo, setting: &GameSetting, table: &mut RoleProbabilities) {
        self.setting = setting.clone();
        self.spread(info, table);
    }
}
