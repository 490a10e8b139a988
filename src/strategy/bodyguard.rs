use crate::agent::{Agent, Role};
use crate::error::AgentError;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::villager::Villager;
use super::{Strategy, max_by_score};

#[derive(Debug, Clone, Copy, Default)]
pub struct Bodyguard;

impl Strategy for Bodyguard {
    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, meta: &MetaInfo, is_last: bool) {
        Villager.choose_vote_candidate(core, meta, is_last);
    }

    fn guard(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Ok(max_by_score(&core.alive_others(), |agent| guard_value(core, meta, agent)))
    }
}

// Village-side likelihood, claimed abilities and past strength.
fn guard_value(core: &PlayerCore, meta: &MetaInfo, agent: Agent) -> f64 {
    let mut value = core.prob(agent, Role::Villager)
        + core.prob(agent, Role::Seer)
        + core.prob(agent, Role::Medium)
        - core.prob(agent, Role::Possessed)
        - core.prob(agent, Role::Werewolf);
    match core.co_role(agent) {
        Some(Role::Seer) => value += 1.0,
        Some(Role::Medium) => value += 1.0,
        _ => {}
    }
    if core.is_fake_seer(agent) {
        value -= 2.0;
    }
    if core.is_fake_medium(agent) {
        value -= 2.0;
    }
    value + 3.0 * meta.win_rate(agent)
}
