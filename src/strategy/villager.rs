use crate::agent::{Agent, Role};
use crate::content::Topic;
use crate::meta_info::MetaInfo;
use crate::player::PlayerCore;

use super::{Strategy, max_by_score};

// Votes for whoever looks most like a werewolf and says so once the talk warms up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Villager;

impl Strategy for Villager {
    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if !follow_votes(core, |core, agent| core.prob(agent, Role::Werewolf)) {
            let candidate = max_by_score(&core.alive_others(), |agent| suspicion(core, agent));
            declare_ballot(core, candidate);
        }
        let like_wolf = core.is_like_wolf(core.vote_candidate);
        settle_or_declare(core, is_last, like_wolf);
    }
}

/// Picks the agent with the most declared votes, werewolf likelihood breaking
/// ties, and records it as our ballot.
///
/// Returns whether enough alive others already back it.
pub(crate) fn follow_votes(
    core: &mut PlayerCore,
    wolf_prob: impl Fn(&PlayerCore, Agent) -> f64,
) -> bool {
    let candidate = max_by_score(&core.alive_others(), |agent| {
        core.vote_map().vote_count(agent) as f64 + wolf_prob(core, agent)
    });
    declare_ballot(core, candidate);
    let support = candidate.map_or(0, |c| core.vote_map().vote_count(c)) as f64;
    support >= core.alive_others().len() as f64 * core.config().vote_threshold
}

pub(crate) fn declare_ballot(core: &mut PlayerCore, candidate: Option<Agent>) {
    core.vote_candidate = candidate;
    let me = core.me();
    core.vote_map_mut().put(me, candidate, None);
}

// How strongly we would like to see the agent executed.
pub(crate) fn suspicion(core: &PlayerCore, agent: Agent) -> f64 {
    let mut score = core.prob(agent, Role::Werewolf) + 0.1 * core.prob(agent, Role::Possessed);
    if core.is_wolf(agent) {
        score += 1.0;
    }
    if core.is_human(agent) {
        score -= 1.0;
    }
    if core.is_fake_seer(agent) {
        score += 0.5;
    }
    if core.is_fake_medium(agent) {
        score += 0.5;
    }
    score
}

/// Closes the candidate choice of a turn.
///
/// The last call of the day settles the ballot. Before that nothing is declared
/// during the first turn; later on a wolf-like candidate is announced as a
/// werewolf estimate, replacing the previous one.
pub(crate) fn settle_or_declare(core: &mut PlayerCore, is_last: bool, like_wolf: bool) {
    if is_last {
        core.settle_vote();
        return;
    }
    if core.turn() <= 1 {
        core.vote_candidate = None;
        return;
    }
    if like_wolf && core.vote_candidate != core.declared_wolf {
        if let Some(candidate) = core.vote_candidate {
            core.cancel_estimate(core.declared_wolf);
            core.talk_estimate(candidate, Role::Werewolf);
            core.declared_wolf = Some(candidate);
        }
    }
}

/// Queues the own judges from `head` on, first all together under their days
/// when there are at least `summary_from` of them, then one plain report each.
/// Returns the new head.
pub(crate) fn report_judges(
    core: &mut PlayerCore,
    head: usize,
    topic: Topic,
    summary_from: usize,
) -> usize {
    let all = if topic == Topic::Identified {
        core.my_identifications()
    } else {
        core.my_divinations()
    };
    let fresh = all.get(head..).unwrap_or_default().to_vec();
    let next = all.len();

    if fresh.len() >= summary_from {
        core.talk_judges(&fresh, topic);
    }
    for judge in &fresh {
        if topic == Topic::Identified {
            core.talk_identified(judge.target, judge.result);
        } else {
            core.talk_divined(judge.target, judge.result);
        }
    }
    next.max(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerConfig;
    use crate::strategy::fixtures::*;
    use crate::strategy::Player;

    fn villager_on_day_one() -> (Player, crate::game_info::GameInfo) {
        let meta = MetaInfo::default();
        let mut info = village(1, Role::Villager);
        let mut player = Player::new(Villager.into(), PlayerConfig::default());
        player.initialize(&info, &setting(), &meta).expect("initialized");
        player.update(&info, &meta);
        player.day_start(&meta);
        info.day = 1;
        player.update(&info, &meta);
        player.day_start(&meta);
        (player, info)
    }

    #[test]
    fn first_turn_declares_nothing() {
        let meta = MetaInfo::default();
        let (mut player, _) = villager_on_day_one();
        assert_eq!(player.talk(&meta), "Skip");
        assert_eq!(player.core().declared_vote_candidate, None);
    }

    #[test]
    fn follows_a_majority_once_talk_warms_up() {
        let meta = MetaInfo::default();
        let (mut player, mut info) = villager_on_day_one();
        assert_eq!(player.talk(&meta), "Skip");
        assert_eq!(player.talk(&meta), "Skip");

        info.talk_list = vec![
            talk(0, 1, 2, "VOTE Agent[05]"),
            talk(1, 1, 3, "VOTE Agent[05]"),
            talk(2, 1, 4, "VOTE Agent[05]"),
            talk(3, 1, 6, "VOTE Agent[05]"),
        ];
        player.update(&info, &meta);
        assert_eq!(player.talk(&meta), "ESTIMATE Agent[05] WEREWOLF");
        assert_eq!(player.talk(&meta), "VOTE Agent[05]");
        assert_eq!(player.core().declared_vote_candidate, Some(Agent(5)));
        assert_eq!(player.vote(&meta), Some(Agent(5)));
        assert!(player.core().is_revote);
    }

    #[test]
    fn suspicion_rewards_known_wolves_and_fakes() {
        let (mut player, _) = villager_on_day_one();
        let core = player.core_mut();
        core.set_wolf(Agent(3));
        core.set_human(Agent(4));
        assert!(suspicion(core, Agent(3)) > suspicion(core, Agent(2)));
        assert!(suspicion(core, Agent(4)) < suspicion(core, Agent(2)));
    }

    #[test]
    fn wolf_estimate_is_declared_after_the_first_turn() {
        let (mut player, _) = villager_on_day_one();
        let core = player.core_mut();
        core.finish_talk();
        core.finish_talk();
        core.vote_candidate = Some(Agent(3));
        settle_or_declare(core, false, true);
        assert_eq!(core.declared_wolf, Some(Agent(3)));
        assert_eq!(core.dequeue(), "ESTIMATE Agent[03] WEREWOLF");

        core.vote_candidate = Some(Agent(4));
        settle_or_declare(core, false, false);
        assert_eq!(core.declared_wolf, Some(Agent(3)));
        assert!(core.talk_queue().is_empty());
    }
}
