use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Species};

// A divination or identification result, as reported or as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Judge {
    pub day: u32,
    pub agent: Agent,
    pub target: Agent,
    pub result: Species,
}

impl Judge {
    pub fn new(day: u32, agent: Agent, target: Agent, result: Species) -> Self {
        Self {
            day,
            agent,
            target,
            result,
        }
    }

    pub fn is_werewolf(&self) -> bool {
        self.result == Species::Werewolf
    }
}
