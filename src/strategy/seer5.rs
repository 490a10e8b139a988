use rand::seq::IndexedRandom;

use crate::agent::{Agent, Role};
use crate::content::Content;
use crate::error::AgentError;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::Strategy;
use super::five::{declare_vote, estimated, power_play, select_min_except};

/// Comes out at once and reports each day's divination on the turn after.
///
/// Day 1 votes for the estimated werewolf, day 2 for the likeliest werewolf
/// left, with the likeliest human asked to join.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seer5;

fn report_divination(core: &mut PlayerCore) {
    let day = core.day();
    if let Some(judge) = core.my_divination_on(day).copied() {
        let me = core.me();
        core.enqueue(Content::divined(me, judge.target, judge.result));
    }
}

impl Strategy for Seer5 {
    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if is_last && core.day() == 1 {
            core.settle_vote_with(core.me(), 1.0);
        }
    }

    fn talk(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> String {
        match core.day() {
            1 => {
                let candidate = estimated(core, Role::Werewolf);
                match core.turn() {
                    0 => {
                        core.vote_candidate = candidate;
                        core.talk_co(Role::Seer);
                    }
                    1 => {
                        core.vote_candidate = candidate;
                        report_divination(core);
                    }
                    _ => declare_vote(core, candidate, None),
                }
            }
            2 => {
                let others = core.alive_others();
                let candidate = core.select_max(Role::Werewolf, &others);
                if core.turn() == 0 {
                    core.vote_candidate = candidate;
                    report_divination(core);
                } else {
                    let human = select_min_except(core, Role::Werewolf, &others, candidate);
                    declare_vote(core, candidate, human);
                }
                power_play(core, false);
            }
            _ => {}
        }
        core.speak()
    }

    fn divine(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Ok(core.alive_others().choose(&mut rand::rng()).copied())
    }
}
