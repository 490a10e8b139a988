use crate::agent::Role;
use crate::content::Topic;
use crate::error::AgentError;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::villager::{Villager, report_judges};
use super::Strategy;

const CO_DATE: u32 = 3;

// Votes like a villager; comes out to report identifications.
#[derive(Debug, Clone, Default)]
pub struct Medium {
    has_co: bool,
    ident_head: usize,
}

impl Strategy for Medium {
    fn initialize(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) -> Result<(), AgentError> {
        *self = Self::default();
        Ok(())
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, meta: &MetaInfo, is_last: bool) {
        Villager.choose_vote_candidate(core, meta, is_last);
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        if !self.has_co
            && (core.day() >= CO_DATE || core.is_co_role(Role::Medium) || core.found_wolf())
        {
            core.talk_co(Role::Medium);
            self.has_co = true;
        }
        if self.has_co {
            self.ident_head = report_judges(core, self.ident_head, Topic::Identified, 1);
        }
        self.choose_vote_candidate(core, meta, false);
        core.finish_talk()
    }
}
