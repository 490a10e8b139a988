//! What the game server tells a player, as it arrives in JSON.
//!
//! Agents travel as their seat index; `-1` (or `null`) stands for "nobody".
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::{Agent, Role, Status};
use crate::judge::Judge;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Talk {
    pub idx: usize,
    pub day: u32,
    pub turn: u32,
    pub agent: Agent,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub day: u32,
    pub agent: Agent,
    pub target: Agent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameInfo {
    pub day: u32,
    pub agent: Agent,
    #[serde(with = "optional_agent")]
    pub executed_agent: Option<Agent>,
    #[serde(with = "optional_agent")]
    pub latest_executed_agent: Option<Agent>,
    #[serde(with = "optional_agent")]
    pub attacked_agent: Option<Agent>,
    #[serde(with = "optional_agent")]
    pub guarded_agent: Option<Agent>,
    pub divine_result: Option<Judge>,
    pub medium_result: Option<Judge>,
    pub talk_list: Vec<Talk>,
    pub whisper_list: Vec<Talk>,
    pub vote_list: Vec<Vote>,
    pub latest_vote_list: Vec<Vote>,
    pub attack_vote_list: Vec<Vote>,
    pub latest_attack_vote_list: Vec<Vote>,
    pub status_map: BTreeMap<Agent, Status>,
    pub role_map: BTreeMap<Agent, Role>,
    pub remain_talk_map: BTreeMap<Agent, u32>,
    pub remain_whisper_map: BTreeMap<Agent, u32>,
    pub last_dead_agent_list: Vec<Agent>,
    pub existing_role_list: Vec<Role>,
}

impl GameInfo {
    // Our own role, as far as the role map tells.
    pub fn role(&self) -> Option<Role> {
        self.role_map.get(&self.agent).copied()
    }

    pub fn agent_list(&self) -> Vec<Agent> {
        self.status_map.keys().copied().collect()
    }

    pub fn alive_agents(&self) -> Vec<Agent> {
        self.status_map
            .iter()
            .filter(|(_, status)| **status == Status::Alive)
            .map(|(agent, _)| *agent)
            .collect()
    }

    pub fn is_alive(&self, agent: Agent) -> bool {
        self.status_map.get(&agent) == Some(&Status::Alive)
    }

    pub fn is_dead(&self, agent: Agent) -> bool {
        self.status_map.get(&agent) == Some(&Status::Dead)
    }

    pub fn exists(&self, role: Role) -> bool {
        self.existing_role_list.contains(&role)
    }

    // The same observation, as seen by a player whose only known role is `role`.
    pub fn fake_view(&self, role: Role) -> GameInfo {
        GameInfo {
            role_map: BTreeMap::from([(self.agent, role)]),
            ..self.clone()
        }
    }

    pub fn with_divine_result(self, judge: Option<Judge>) -> GameInfo {
        GameInfo {
            divine_result: judge.or(self.divine_result),
            ..self
        }
    }

    pub fn with_medium_result(self, judge: Option<Judge>) -> GameInfo {
        GameInfo {
            medium_result: judge.or(self.medium_result),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSetting {
    pub player_num: usize,
    pub role_num_map: BTreeMap<Role, usize>,
    pub max_talk: u32,
    pub max_talk_turn: u32,
    pub max_whisper: u32,
    pub max_whisper_turn: u32,
    pub max_skip: u32,
    pub max_revote: u32,
    pub max_attack_revote: u32,
    pub is_enable_no_attack: bool,
    pub is_vote_visible: bool,
    pub is_talk_on_first_day: bool,
}

impl GameSetting {
    pub fn with_roles(roles: impl IntoIterator<Item = (Role, usize)>) -> Self {
        let role_num_map: BTreeMap<_, _> = roles.into_iter().collect();
        Self {
            player_num: role_num_map.values().sum(),
            role_num_map,
            ..Self::default()
        }
    }

    pub fn role_num(&self, role: Role) -> usize {
        self.role_num_map.get(&role).copied().unwrap_or(0)
    }
}

// `-1` and `null` both mean no agent.
mod optional_agent {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::agent::Agent;

    pub fn serialize<S: Serializer>(agent: &Option<Agent>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(agent.map_or(-1, |a| i32::from(a.index())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Agent>, D::Error> {
        let index = Option::<i32>::deserialize(deserializer)?;
        Ok(index
            .and_then(|i| u8::try_from(i).ok())
            .filter(|i| *i > 0)
            .map(Agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Species;

    const SAMPLE: &str = r#"{
        "day": 1,
        "agent": 2,
        "executedAgent": -1,
        "latestExecutedAgent": 4,
        "divineResult": {"day": 1, "agent": 2, "target": 3, "result": "WEREWOLF"},
        "talkList": [{"idx": 0, "day": 1, "turn": 0, "agent": 1, "text": "COMINGOUT Agent[01] SEER"}],
        "statusMap": {"1": "ALIVE", "2": "ALIVE", "3": "ALIVE", "4": "DEAD"},
        "roleMap": {"2": "SEER"},
        "existingRoleList": ["SEER", "VILLAGER", "WEREWOLF"]
    }"#;

    #[test]
    fn reads_server_json() {
        let info: GameInfo = serde_json::from_str(SAMPLE).expect("valid game info");
        assert_eq!(info.agent, Agent(2));
        assert_eq!(info.role(), Some(Role::Seer));
        assert_eq!(info.executed_agent, None);
        assert_eq!(info.latest_executed_agent, Some(Agent(4)));
        assert_eq!(info.divine_result.map(|j| j.result), Some(Species::Werewolf));
        assert_eq!(info.alive_agents(), vec![Agent(1), Agent(2), Agent(3)]);
        assert!(info.is_dead(Agent(4)));
        assert_eq!(info.talk_list[0].text, "COMINGOUT Agent[01] SEER");
    }

    #[test]
    fn fake_view_hides_everything_but_the_fake_role() {
        let mut info: GameInfo = serde_json::from_str(SAMPLE).expect("valid game info");
        info.role_map.insert(Agent(3), Role::Werewolf);

        let judge = Judge::new(1, Agent(2), Agent(1), Species::Human);
        let fake = info.fake_view(Role::Medium).with_medium_result(Some(judge));
        assert_eq!(fake.role(), Some(Role::Medium));
        assert_eq!(fake.role_map.len(), 1);
        assert_eq!(fake.medium_result, Some(judge));
        assert_eq!(fake.talk_list, info.talk_list);

        // the source view is left as it was
        assert_eq!(info.role_map.len(), 2);
        assert_eq!(info.medium_result, None);
    }

    #[test]
    fn none_agents_are_written_as_minus_one() {
        let info = GameInfo::default();
        let json = serde_json::to_value(&info).expect("serializable");
        assert_eq!(json["executedAgent"], -1);
    }
}
