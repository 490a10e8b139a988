use crate::agent::Role;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::Strategy;
use super::five::{declare_vote, estimated, power_play, select_min_except};

// Votes for the werewolf of the likeliest role assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Villager5;

impl Strategy for Villager5 {
    // Only the first day's ballot follows the declared votes.
    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if is_last && core.day() == 1 {
            core.settle_vote_with(core.me(), 1.0);
        }
    }

    fn talk(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> String {
        let candidate = estimated(core, Role::Werewolf);
        match core.day() {
            1 => declare_vote(core, candidate, None),
            2 => {
                let others = core.alive_others();
                let ally = select_min_except(core, Role::Werewolf, &others, candidate);
                declare_vote(core, candidate, ally);
                power_play(core, false);
            }
            _ => core.vote_candidate = candidate,
        }
        core.speak()
    }
}
