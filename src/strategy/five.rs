//! Shared ground of the five-player strategies.
//!
//! With one seer, one werewolf and one possessed among five, a player can score
//! every way of handing those roles to the others and commit to the best one.
//! The fake seers of the five-player village also keep an inner seer that lags
//! behind the game and is caught up in bursts.
use std::collections::{BTreeMap, VecDeque};

use crate::agent::{Agent, Role, Species};
use crate::content::Content;
use crate::error::AgentError;
use crate::game_info::{GameInfo, GameSetting};
use crate::judge::Judge;
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};

use super::{Player, Seer5};

pub const SMALL_VILLAGE: usize = 5;

// Roles held by exactly one agent in a five-player village.
const SINGLE_ROLES: [Role; 3] = [Role::Seer, Role::Werewolf, Role::Possessed];

// Observations the inner seer may fall behind by.
const MAX_PENDING: usize = 32;

// Observations replayed within one real turn.
const MAX_REPLAY: usize = 8;

/// The likeliest assignment of the single roles other than our own to the other
/// agents, everybody else a villager.
///
/// With `restriction`, that role may only go to the listed agents. Empty when
/// no assignment fits.
pub(crate) fn forward_estimate(
    core: &PlayerCore,
    restriction: Option<(Role, &[Agent])>,
) -> BTreeMap<Agent, Role> {
    let others = core.others();
    let roles: Vec<Role> = SINGLE_ROLES
        .into_iter()
        .filter(|role| *role != core.my_role())
        .collect();
    let candidates: Vec<Vec<Agent>> = roles
        .iter()
        .map(|role| match restriction {
            Some((restricted, allowed)) if restricted == *role => others
                .iter()
                .copied()
                .filter(|a| allowed.contains(a))
                .collect(),
            _ => others.clone(),
        })
        .collect();

    let mut best = None;
    search(core, &others, &roles, &candidates, &mut Vec::new(), &mut best);
    best.map(|(_, assignment)| assignment).unwrap_or_default()
}

fn search(
    core: &PlayerCore,
    others: &[Agent],
    roles: &[Role],
    candidates: &[Vec<Agent>],
    picked: &mut Vec<Agent>,
    best: &mut Option<(f64, BTreeMap<Agent, Role>)>,
) {
    let depth = picked.len();
    if depth == roles.len() {
        let assignment: BTreeMap<Agent, Role> = others
            .iter()
            .map(|a| (*a, Role::Villager))
            .chain(picked.iter().copied().zip(roles.iter().copied()))
            .collect();
        let value: f64 = assignment.iter().map(|(a, r)| core.prob(*a, *r)).sum();
        if best.as_ref().is_none_or(|(top, _)| value > *top) {
            *best = Some((value, assignment));
        }
        return;
    }
    for agent in &candidates[depth] {
        if picked.contains(agent) {
            continue;
        }
        picked.push(*agent);
        search(core, others, roles, candidates, picked, best);
        picked.pop();
    }
}

// Every agent the likeliest assignment gives `role`.
pub(crate) fn estimated_all(core: &PlayerCore, role: Role) -> Vec<Agent> {
    forward_estimate(core, None)
        .into_iter()
        .filter(|(_, r)| *r == role)
        .map(|(agent, _)| agent)
        .collect()
}

pub(crate) fn estimated(core: &PlayerCore, role: Role) -> Option<Agent> {
    estimated_except(core, role, &[])
}

// The holder of `role` when none of `excluded` may hold it.
pub(crate) fn estimated_except(core: &PlayerCore, role: Role, excluded: &[Agent]) -> Option<Agent> {
    let allowed: Vec<Agent> = core
        .others()
        .into_iter()
        .filter(|a| !excluded.contains(a))
        .collect();
    forward_estimate(core, Some((role, &allowed)))
        .into_iter()
        .find(|(_, r)| *r == role)
        .map(|(agent, _)| agent)
}

/// Makes `candidate` our vote and announces it if it moved, asking `ally` to
/// vote the same way.
pub(crate) fn declare_vote(core: &mut PlayerCore, candidate: Option<Agent>, ally: Option<Agent>) {
    core.vote_candidate = candidate;
    if candidate == core.declared_vote_candidate {
        return;
    }
    if let Some(target) = candidate {
        let me = core.me();
        core.enqueue(Content::vote(me, target));
        if let Some(ally) = ally {
            core.enqueue(Content::request(me, ally, Content::vote(ally, target)));
        }
    }
    core.declared_vote_candidate = candidate;
}

// Two others left and a werewolf-side claim in the air: come out as a werewolf.
pub(crate) fn power_play(core: &mut PlayerCore, claim_seen: bool) {
    if core.is_pp {
        return;
    }
    core.is_pp = core.alive_others().len() == 2
        && (claim_seen || core.is_co_role(Role::Werewolf) || core.is_co_role(Role::Possessed));
    if core.is_pp {
        core.cancel_all();
        core.talk_co(Role::Werewolf);
        core.declared_vote_candidate = None;
    }
}

// The lowest of `role` among `agents`, never `excluded`.
pub(crate) fn select_min_except(
    core: &PlayerCore,
    role: Role,
    agents: &[Agent],
    excluded: Option<Agent>,
) -> Option<Agent> {
    let excludes: Vec<Agent> = excluded.into_iter().collect();
    core.probabilities().min(role, agents, &excludes)
}

pub(crate) fn select_max_except(
    core: &PlayerCore,
    role: Role,
    agents: &[Agent],
    excluded: Option<Agent>,
) -> Option<Agent> {
    let excludes: Vec<Agent> = excluded.into_iter().collect();
    core.probabilities().max(role, agents, &excludes)
}

/// A seer played from the inside by a werewolf-side agent.
///
/// From day 1 on the inner seer does not see observations as they arrive. They
/// are buffered and replayed in order when the outer player talks, each with
/// the made-up divination: one that opens a day starts it, every other one is
/// a talk turn of the inner seer. Both the buffer and a single replay are
/// bounded.
#[derive(Debug)]
pub struct SeerReplay {
    config: PlayerConfig,
    inner: Box<Player>,
    pending: VecDeque<GameInfo>,
    divination: Option<Judge>,
    divined_human: Option<Agent>,
}

impl SeerReplay {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            inner: Box::new(Player::new(Seer5.into(), config)),
            pending: VecDeque::new(),
            divination: None,
            divined_human: None,
        }
    }

    pub fn inner(&self) -> &Player {
        &self.inner
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn divined_human(&self) -> Option<Agent> {
        self.divined_human
    }

    fn fake_info(&self, info: &GameInfo) -> GameInfo {
        info.fake_view(Role::Seer)
            .with_divine_result(self.divination)
    }

    pub fn initialize(
        &mut self,
        info: &GameInfo,
        setting: &GameSetting,
        meta: &MetaInfo,
    ) -> Result<(), AgentError> {
        *self = Self::new(self.config);
        let fake = self.fake_info(info);
        self.inner.initialize(&fake, setting, meta)
    }

    // Day 0 goes straight through; later observations wait for the next replay.
    pub fn observe(&mut self, info: &GameInfo, meta: &MetaInfo) {
        if info.day == 0 {
            let fake = self.fake_info(info);
            self.inner.update(&fake, meta);
            return;
        }
        if self.pending.len() >= MAX_PENDING {
            log::warn!("inner seer is {MAX_PENDING} observations behind, dropping the oldest");
            self.pending.pop_front();
        }
        self.pending.push_back(info.clone());
    }

    // Returns how many observations were replayed.
    pub fn replay(&mut self, meta: &MetaInfo) -> usize {
        let mut replayed = 0;
        while replayed < MAX_REPLAY {
            let Some(info) = self.pending.pop_front() else {
                break;
            };
            let fake = self.fake_info(&info);
            if self.inner.update(&fake, meta) {
                self.inner.day_start(meta);
            } else {
                self.inner.talk(meta);
            }
            replayed += 1;
        }
        replayed
    }

    /// Day 1 of a fake seer: come out, report `human` as divined on the second
    /// turn, then vote for the werewolf the inner seer sees besides that agent.
    pub fn day_one_talk(&mut self, core: &mut PlayerCore, human: Option<Agent>, meta: &MetaInfo) {
        let me = core.me();
        match core.turn() {
            0 => core.talk_co(Role::Seer),
            1 => {
                self.divined_human = human;
                if let Some(human) = human {
                    core.enqueue(Content::divined(me, human, Species::Human));
                    self.divination = Some(Judge::new(core.day(), me, human, Species::Human));
                }
                self.replay(meta);
            }
            _ => {
                self.replay(meta);
                let excluded: Vec<Agent> = self.divined_human.into_iter().collect();
                let candidate = estimated_except(self.inner.core(), Role::Werewolf, &excluded);
                declare_vote(core, candidate, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::*;

    fn core_of(me: u8, role: Role) -> PlayerCore {
        let mut core = PlayerCore::new(PlayerConfig::default());
        core.initialize(&small_village(me, role), &small_setting())
            .expect("initialized");
        core
    }

    #[test]
    fn forward_estimate_takes_the_likeliest_assignment() {
        let mut core = core_of(1, Role::Villager);
        core.set_prob(Agent(2), Role::Seer, 0.9);
        core.set_prob(Agent(3), Role::Werewolf, 0.8);
        core.set_prob(Agent(4), Role::Possessed, 0.7);

        let assignment = forward_estimate(&core, None);
        assert_eq!(assignment.len(), 4);
        assert_eq!(assignment[&Agent(2)], Role::Seer);
        assert_eq!(assignment[&Agent(3)], Role::Werewolf);
        assert_eq!(assignment[&Agent(4)], Role::Possessed);
        assert_eq!(assignment[&Agent(5)], Role::Villager);
        assert_eq!(estimated_all(&core, Role::Villager), vec![Agent(5)]);
    }

    #[test]
    fn excluded_agents_never_get_the_role() {
        let mut core = core_of(1, Role::Villager);
        core.set_prob(Agent(2), Role::Seer, 0.9);
        core.set_prob(Agent(3), Role::Werewolf, 0.8);
        core.set_prob(Agent(4), Role::Possessed, 0.7);

        assert_eq!(estimated(&core, Role::Werewolf), Some(Agent(3)));
        assert_eq!(estimated_except(&core, Role::Werewolf, &[Agent(3)]), Some(Agent(5)));
        assert_eq!(estimated_except(&core, Role::Werewolf, &[Agent(2), Agent(3), Agent(4), Agent(5)]), None);
    }

    #[test]
    fn own_role_is_left_out_of_the_search() {
        let mut core = core_of(1, Role::Seer);
        core.set_prob(Agent(2), Role::Seer, 0.9);
        core.set_prob(Agent(4), Role::Werewolf, 0.6);
        let assignment = forward_estimate(&core, None);
        assert!(!assignment.values().any(|r| *r == Role::Seer));
        assert_eq!(assignment[&Agent(4)], Role::Werewolf);
    }

    #[test]
    fn power_play_needs_two_others_and_a_claim() {
        let mut core = core_of(1, Role::Villager);
        power_play(&mut core, true);
        assert!(!core.is_pp);

        let mut info = small_village(1, Role::Villager);
        kill(&mut info, 4);
        kill(&mut info, 5);
        core.update(&info);
        power_play(&mut core, false);
        assert!(!core.is_pp);
        power_play(&mut core, true);
        assert!(core.is_pp);
        assert_eq!(core.dequeue(), "COMINGOUT Agent[01] WEREWOLF");
    }

    #[test]
    fn replay_catches_the_inner_seer_up_in_order() {
        let meta = MetaInfo::default();
        let mut info = small_village(1, Role::Possessed);
        let mut replay = SeerReplay::new(PlayerConfig::default());
        replay
            .initialize(&info, &small_setting(), &meta)
            .expect("initialized");
        replay.observe(&info, &meta);
        assert_eq!(replay.pending(), 0);

        // day 1 opens, then two talk turns
        info.day = 1;
        replay.observe(&info, &meta);
        replay.observe(&info, &meta);
        info.talk_list = vec![talk(0, 1, 3, "COMINGOUT Agent[03] SEER")];
        replay.observe(&info, &meta);
        assert_eq!(replay.pending(), 3);
        assert_eq!(replay.inner().core().day(), 0);

        replay.divination = Some(Judge::new(1, Agent(1), Agent(2), Species::Human));
        assert_eq!(replay.replay(&meta), 3);
        assert_eq!(replay.pending(), 0);

        let seer = replay.inner().core();
        assert_eq!(seer.day(), 1);
        assert_eq!(seer.turn(), 2);
        assert_eq!(seer.my_divinations().len(), 1);
        assert!(seer.is_human(Agent(2)));
        assert_eq!(seer.co_role(Agent(3)), Some(Role::Seer));
        assert_eq!(replay.replay(&meta), 0);
    }

    #[test]
    fn replay_stays_bounded() {
        let meta = MetaInfo::default();
        let mut info = small_village(1, Role::Possessed);
        let mut replay = SeerReplay::new(PlayerConfig::default());
        replay
            .initialize(&info, &small_setting(), &meta)
            .expect("initialized");
        replay.observe(&info, &meta);

        info.day = 1;
        for _ in 0..(MAX_PENDING + 10) {
            replay.observe(&info, &meta);
        }
        assert_eq!(replay.pending(), MAX_PENDING);
        assert_eq!(replay.replay(&meta), MAX_REPLAY);
        assert_eq!(replay.pending(), MAX_PENDING - MAX_REPLAY);
    }
}
