// Vocabulary shared by the whole protocol: seats, roles, species and talk channels.
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::error::ContentError;

// A seat at the table. Two agents are the same player iff they share the index.
#[derive(
    Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("Agent[{_0:02}]")]
#[serde(transparent)]
pub struct Agent(pub u8);

impl Agent {
    pub fn index(self) -> u8 {
        self.0
    }
}

impl FromStr for Agent {
    type Err = ContentError;

    // Parses the wire form `Agent[NN]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("Agent[")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ContentError::InvalidAgent(s.to_string()))?;
        digits
            .parse::<u8>()
            .map(Agent)
            .map_err(|_| ContentError::InvalidAgent(s.to_string()))
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Villager,
    Seer,
    Medium,
    Bodyguard,
    Possessed,
    Werewolf,
    Freemason,
    Fox,
    Any,
}

impl Role {
    // The species a divination of this role reveals.
    pub fn species(self) -> Species {
        match self {
            Role::Werewolf => Species::Werewolf,
            Role::Any => Species::Any,
            _ => Species::Human,
        }
    }

    // The six roles the probability table tracks.
    pub const ESTIMATED: [Role; 6] = [
        Role::Werewolf,
        Role::Villager,
        Role::Seer,
        Role::Possessed,
        Role::Medium,
        Role::Bodyguard,
    ];
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Human,
    Werewolf,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Alive,
    Dead,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TalkType {
    Talk,
    Whisper,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_wire_form() {
        assert_eq!(Agent(3).to_string(), "Agent[03]");
        assert_eq!(Agent(12).to_string(), "Agent[12]");
        assert_eq!("Agent[07]".parse::<Agent>(), Ok(Agent(7)));
        assert!("Agent7".parse::<Agent>().is_err());
        assert!("Agent[x]".parse::<Agent>().is_err());
    }

    #[test]
    fn role_keywords() {
        assert_eq!(Role::Bodyguard.to_string(), "BODYGUARD");
        assert_eq!("POSSESSED".parse::<Role>(), Ok(Role::Possessed));
        assert_eq!(Species::Werewolf.as_ref(), "WEREWOLF");
        assert_eq!(Role::Possessed.species(), Species::Human);
    }
}
