use crate::agent::{Agent, Role};
use crate::content::Topic;
use crate::error::AgentError;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::villager::{declare_ballot, report_judges, settle_or_declare, suspicion};
use super::{Strategy, max_by_score};

// Comes out on this day at the latest.
const CO_DATE: u32 = 3;

// A single fresh divination is reported plainly, without its DAY.
const SUMMARY_FROM: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct Seer {
    has_co: bool,
    divination_head: usize,
}

impl Seer {
    pub fn has_co(&self) -> bool {
        self.has_co
    }
}

impl Strategy for Seer {
    fn initialize(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) -> Result<(), AgentError> {
        *self = Self::default();
        Ok(())
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        let candidate = max_by_score(&core.alive_others(), |agent| suspicion(core, agent));
        declare_ballot(core, candidate);
        let like_wolf = core.is_like_wolf(core.vote_candidate);
        settle_or_declare(core, is_last, like_wolf);
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        if core.alive_count() <= 3 {
            if !core.is_pp && core.found_possessed() {
                core.is_pp = true;
                core.talk_co(Role::Werewolf);
            }
        } else {
            if !self.has_co
                && (core.day() >= CO_DATE || core.is_co_role(Role::Seer) || core.found_wolf())
            {
                core.talk_co(Role::Seer);
                self.has_co = true;
            }
            if self.has_co {
                self.divination_head = report_judges(core, self.divination_head, Topic::Divined, SUMMARY_FROM);
            }
        }
        self.choose_vote_candidate(core, meta, false);
        core.finish_talk()
    }

    // The gray agent most likely to be a werewolf.
    fn divine(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        let grays = core.grays(&core.alive_others());
        Ok(core.select_max(Role::Werewolf, &grays))
    }
}
