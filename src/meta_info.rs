use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::agent::{Agent, Role};
use crate::error::SettingsError;
use crate::game_info::GameInfo;

// Statistics that outlive a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaInfo {
    pub game_count: u32,
    pub role_counts: BTreeMap<Role, u32>,
    pub win_counts: BTreeMap<Agent, u32>,
    // Agents seen to come out as a werewolf-side role, i.e. able to power play.
    pub pp_ability: BTreeSet<Agent>,
}

impl MetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_count(&self, role: Role) -> u32 {
        self.role_counts.get(&role).copied().unwrap_or(0)
    }

    pub fn increment_role_count(&mut self, role: Role) {
        *self.role_counts.entry(role).or_default() += 1;
    }

    pub fn win_count(&self, agent: Agent) -> u32 {
        self.win_counts.get(&agent).copied().unwrap_or(0)
    }

    pub fn increment_win_count(&mut self, agent: Agent) {
        *self.win_counts.entry(agent).or_default() += 1;
    }

    pub fn pp_ability(&self, agent: Agent) -> bool {
        self.pp_ability.contains(&agent)
    }

    pub fn set_pp_ability(&mut self, agent: Agent) {
        self.pp_ability.insert(agent);
    }

    // Share of past games the agent won; 0 before the first game.
    pub fn win_rate(&self, agent: Agent) -> f64 {
        f64::from(self.win_count(agent)) / (f64::from(self.game_count) + 0.01)
    }

    /// Closes a game from its final observation, where every role is revealed.
    ///
    /// The werewolf side (werewolves and possessed) wins iff a werewolf is still
    /// alive; every agent of the winning side gets a win.
    pub fn finish(&mut self, info: &GameInfo) {
        self.game_count += 1;
        let wolves_alive = info
            .alive_agents()
            .iter()
            .any(|a| info.role_map.get(a) == Some(&Role::Werewolf));
        for (agent, role) in &info.role_map {
            let wolf_side = matches!(role, Role::Werewolf | Role::Possessed);
            if wolf_side == wolves_alive {
                self.increment_win_count(*agent);
            }
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path)?;
        let meta = serde_json::from_str(&data)?;
        Ok(meta)
    }

    // A missing file starts a fresh record.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Status;

    fn final_info(wolf_status: Status) -> GameInfo {
        GameInfo {
            status_map: BTreeMap::from([
                (Agent(1), Status::Alive),
                (Agent(2), wolf_status),
                (Agent(3), Status::Alive),
            ]),
            role_map: BTreeMap::from([
                (Agent(1), Role::Villager),
                (Agent(2), Role::Werewolf),
                (Agent(3), Role::Possessed),
            ]),
            ..GameInfo::default()
        }
    }

    #[test]
    fn finish_credits_the_winning_side() {
        let mut meta = MetaInfo::new();
        meta.finish(&final_info(Status::Alive));
        assert_eq!(meta.win_count(Agent(2)), 1);
        assert_eq!(meta.win_count(Agent(3)), 1);
        assert_eq!(meta.win_count(Agent(1)), 0);

        meta.finish(&final_info(Status::Dead));
        assert_eq!(meta.win_count(Agent(1)), 1);
        assert_eq!(meta.game_count, 2);
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meta").join("meta.json");

        let mut meta = MetaInfo::new();
        meta.increment_role_count(Role::Seer);
        meta.set_pp_ability(Agent(4));
        meta.save_to_file(&path).expect("saved");

        let loaded = MetaInfo::load_or_default(&path).expect("loaded");
        assert_eq!(loaded, meta);
        assert!(loaded.pp_ability(Agent(4)));

        let missing = MetaInfo::load_or_default(dir.path().join("none.json")).expect("default");
        assert_eq!(missing, MetaInfo::default());
    }
}
