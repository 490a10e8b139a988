use crate::agent::{Agent, Role, Species};
use crate::content::Content;
use crate::error::AgentError;
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};

use super::five::{declare_vote, estimated, power_play, select_min_except, SeerReplay};
use super::Strategy;

/// Poses as the seer of a five-player village.
///
/// The agent judged likeliest to be the werewolf is announced as divined human
/// on day 1 and protected from the vote; on day 2 the possessed names its own
/// victim as a werewolf and asks the werewolf to vote with it.
#[derive(Debug)]
pub struct Possessed5 {
    replay: SeerReplay,
}

impl Possessed5 {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            replay: SeerReplay::new(config),
        }
    }

    pub fn replay(&self) -> &SeerReplay {
        &self.replay
    }

    fn day_two_candidate(core: &PlayerCore, werewolf: Option<Agent>) -> Option<Agent> {
        select_min_except(core, Role::Werewolf, &core.alive_others(), werewolf)
    }
}

impl Strategy for Possessed5 {
    fn initialize(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<(), AgentError> {
        self.replay.initialize(core.game_info(), core.setting(), meta)
    }

    fn update(&mut self, core: &mut PlayerCore, _day_opened: bool, meta: &MetaInfo) {
        self.replay.observe(core.game_info(), meta);
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if !is_last {
            return;
        }
        let werewolf = estimated(core, Role::Werewolf);
        core.vote_candidate = Self::day_two_candidate(core, werewolf);
        core.settle_vote_with(werewolf.unwrap_or(core.me()), 1.0);
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        let werewolf = estimated(core, Role::Werewolf);
        match core.day() {
            1 => self.replay.day_one_talk(core, werewolf, meta),
            2 => {
                let candidate = Self::day_two_candidate(core, werewolf);
                if core.turn() == 0 {
                    if let Some(target) = candidate {
                        let me = core.me();
                        core.enqueue(Content::divined(me, target, Species::Werewolf));
                    }
                }
                declare_vote(core, candidate, werewolf);
                let claim_seen = meta.role_count(Role::Possessed) == 1
                    || werewolf.is_some_and(|w| meta.pp_ability(w));
                power_play(core, claim_seen);
            }
            _ => {}
        }
        core.speak()
    }
}
