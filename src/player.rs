//! Game-scoped bookkeeping shared by every role strategy.
//!
//! [`PlayerCore`] reads the talk log, keeps the estimate, vote and request
//! aggregates, remembers coming-outs and judge reports, and runs the per-day
//! turn cycle: pick a vote candidate, (re)declare it, speak one queued utterance.
use std::collections::{BTreeMap, BTreeSet};

use crate::agent::{Agent, Role, Species};
use crate::content::{Body, Content, Subject, Target, Topic};
use crate::error::AgentError;
use crate::estimate::Estimate;
use crate::estimate_map::{EstimatePolicy, EstimateReasonMap};
use crate::game_info::{GameInfo, GameSetting};
use crate::judge::Judge;
use crate::meta_info::MetaInfo;
use crate::probabilities::RoleProbabilities;
use crate::talk_queue::TalkQueue;
use crate::vote_map::VoteReasonMap;
use crate::vote_request::VoteRequestCounter;

// Tunables a player is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    // Share of alive others that must have declared before votes are adjusted.
    pub vote_threshold: f64,
    pub estimate_policy: EstimatePolicy,
    pub probability_jitter: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            vote_threshold: 0.5,
            estimate_policy: EstimatePolicy::Merge,
            probability_jitter: 1e-7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerCore {
    config: PlayerConfig,
    me: Agent,
    my_role: Role,
    date: Option<u32>,
    turn: u32,
    last_talk_idx: Option<usize>,
    talk_list_head: usize,
    info: GameInfo,
    setting: GameSetting,

    pub is_revote: bool,
    pub is_pp: bool,
    pub vote_candidate: Option<Agent>,
    pub declared_vote_candidate: Option<Agent>,
    pub declared_wolf: Option<Agent>,

    executed: BTreeSet<Agent>,
    killed: BTreeSet<Agent>,
    divination_reports: Vec<Judge>,
    divination_map: BTreeMap<Agent, Judge>,
    my_divinations: Vec<Judge>,
    ident_reports: Vec<Judge>,
    ident_map: BTreeMap<Agent, Judge>,
    my_identifications: Vec<Judge>,
    comingout_map: BTreeMap<Agent, Role>,
    species: BTreeMap<Agent, Species>,
    pp_observed: BTreeSet<Agent>,

    talk_queue: TalkQueue,
    estimate_map: EstimateReasonMap,
    vote_map: VoteReasonMap,
    vote_requests: VoteRequestCounter,
    probabilities: RoleProbabilities,
}

impl PlayerCore {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            me: Agent::default(),
            my_role: Role::Any,
            date: None,
            turn: 0,
            last_talk_idx: None,
            talk_list_head: 0,
            info: GameInfo::default(),
            setting: GameSetting::default(),
            is_revote: false,
            is_pp: false,
            vote_candidate: None,
            declared_vote_candidate: None,
            declared_wolf: None,
            executed: BTreeSet::new(),
            killed: BTreeSet::new(),
            divination_reports: Vec::new(),
            divination_map: BTreeMap::new(),
            my_divinations: Vec::new(),
            ident_reports: Vec::new(),
            ident_map: BTreeMap::new(),
            my_identifications: Vec::new(),
            comingout_map: BTreeMap::new(),
            species: BTreeMap::new(),
            pp_observed: BTreeSet::new(),
            talk_queue: TalkQueue::new(),
            estimate_map: EstimateReasonMap::new(config.estimate_policy),
            vote_map: VoteReasonMap::default(),
            vote_requests: VoteRequestCounter::new(),
            probabilities: RoleProbabilities::new(),
        }
    }

    // Starts a new game. Fails when the observation does not tell our role.
    pub fn initialize(&mut self, info: &GameInfo, setting: &GameSetting) -> Result<(), AgentError> {
        let role = info.role().ok_or(AgentError::NotInitialized)?;
        *self = Self::new(self.config);
        self.me = info.agent;
        self.my_role = role;
        self.info = info.clone();
        self.setting = setting.clone();

        if role == Role::Werewolf {
            for agent in info.agent_list() {
                self.species.insert(agent, Species::Human);
            }
            for agent in info.role_map.keys() {
                self.species.insert(*agent, Species::Werewolf);
            }
        } else {
            for agent in info.agent_list() {
                self.species.insert(agent, Species::Any);
            }
            self.species.insert(self.me, Species::Human);
        }
        self.probabilities
            .initialize(info, self.config.probability_jitter);
        log::info!("{} starts a game as {role}", self.me);
        Ok(())
    }

    /// Reads a new observation. Returns true when it opened a new day, in which
    /// case the talk log is not read yet.
    pub fn update(&mut self, info: &GameInfo) -> bool {
        self.info = info.clone();

        let next_day = self.date.map_or(0, |d| d + 1);
        if info.day == next_day {
            self.date = Some(info.day);
            return true;
        }

        if let Some(executed) = info.latest_executed_agent {
            self.executed.insert(executed);
        }

        let talks = info.talk_list.get(self.talk_list_head..).unwrap_or_default();
        for talk in talks {
            self.last_talk_idx = Some(talk.idx);
            if talk.agent == self.me {
                continue;
            }
            match talk.text.parse::<Content>() {
                Ok(content) => {
                    let content = if content.subject() == Subject::Unspecified {
                        content.with_subject(talk.agent)
                    } else {
                        content
                    };
                    self.parse_sentence(&content);
                }
                Err(e) => log::debug!("dropping {:?} from {}: {e}", talk.text, talk.agent),
            }
        }

        if info.agent_list().len() == 5 {
            for agent in self.dead(&self.others()) {
                self.set_human(agent);
            }
        }

        self.talk_list_head = info.talk_list.len();
        false
    }

    // Registers one utterance into whichever aggregate understands it.
    pub fn parse_sentence(&mut self, content: &Content) {
        if self.estimate_map.put_content(content) {
            if let Body::And(list) = content.body() {
                for sibling in list.iter().filter(|c| c.topic() != Topic::Estimate) {
                    self.parse_sentence(sibling);
                }
            }
            return;
        }
        if self.vote_map.put_content(content) {
            return;
        }
        let speaker = content.subject().agent();
        match content.body() {
            Body::Comingout { target, role } => {
                if let Target::Agent(target) = *target {
                    self.comingout_map.insert(target, *role);
                    if matches!(role, Role::Werewolf | Role::Possessed) {
                        self.pp_observed.insert(target);
                    }
                }
            }
            Body::Divined { target, result } => {
                if let (Some(reporter), Target::Agent(target)) = (speaker, *target) {
                    let judge = Judge::new(self.info.day, reporter, target, *result);
                    self.divination_reports.push(judge);
                    self.divination_map.insert(reporter, judge);
                }
            }
            Body::Identified { target, result } => {
                if let (Some(reporter), Target::Agent(target)) = (speaker, *target) {
                    let judge = Judge::new(self.info.day, reporter, target, *result);
                    self.ident_reports.push(judge);
                    self.ident_map.insert(reporter, judge);
                }
            }
            _ if content.operator().is_some() => self.parse_operator(content),
            _ => {}
        }
    }

    pub fn parse_operator(&mut self, content: &Content) {
        match content.body() {
            Body::Because { action, .. } => self.parse_sentence(action),
            Body::Day { content, .. } => self.parse_sentence(content),
            Body::And(list) | Body::Or(list) => {
                for child in list {
                    self.parse_sentence(child);
                }
            }
            Body::Xor(first, second) => {
                self.parse_sentence(first);
                self.parse_sentence(second);
            }
            Body::Request { .. } => {
                self.vote_requests.add(content);
            }
            _ => {}
        }
    }

    // Opens a day from the observation last passed to `update`.
    pub fn day_start(&mut self) {
        if let Some(executed) = self.info.executed_agent {
            self.executed.insert(executed);
        }
        for agent in self.info.last_dead_agent_list.clone() {
            self.killed.insert(agent);
            self.set_human(agent);
        }
        if let Some(judge) = self.info.divine_result {
            self.my_divinations.push(judge);
            self.learn(judge);
        }
        if let Some(judge) = self.info.medium_result {
            self.my_identifications.push(judge);
            self.learn(judge);
        }

        self.is_revote = false;
        self.talk_queue.clear();
        self.declared_vote_candidate = None;
        self.declared_wolf = None;
        self.vote_candidate = None;
        self.talk_list_head = 0;
        self.vote_map.clear();
        self.vote_requests.clear();
        self.turn = 0;
        self.last_talk_idx = None;
        log::debug!("{} opens day {}", self.me, self.info.day);
    }

    fn learn(&mut self, judge: Judge) {
        if judge.is_werewolf() {
            self.set_wolf(judge.target);
        } else {
            self.set_human(judge.target);
        }
    }

    /// Decides the ballot from the declared votes in `map`.
    ///
    /// Until enough alive others have declared, our own declaration stands. After
    /// that, if the agent we protect leads the count while our vote goes
    /// elsewhere, the vote moves to the strongest competing target.
    pub fn adjust_vote(&self, map: &VoteReasonMap, protected: Agent, threshold: f64) -> Option<Agent> {
        let voted = map.target(self.me);
        let needed = self.alive_others().len() as f64 * threshold;
        if (map.total_votes() as f64) < needed {
            return voted;
        }

        let others = map.excluding_voter(self.me);
        let winners = others.winners();
        let mut excludes = vec![protected, self.me];
        excludes.extend(voted);
        let ordered = others.ordered_list(&excludes);

        let voted_leads = voted.is_some_and(|v| winners.contains(&v));
        if !voted_leads && winners.contains(&protected) {
            if let Some(first) = ordered.first() {
                return Some(*first);
            }
        }
        voted
    }

    // Final vote: on a revote the map is rebuilt from the ballots just cast.
    pub fn settle_vote(&mut self) {
        self.settle_vote_with(self.me, self.config.vote_threshold);
    }

    pub fn settle_vote_with(&mut self, protected: Agent, threshold: f64) {
        self.vote_candidate = if self.is_revote {
            let ballots = VoteReasonMap::from_ballots(
                self.info
                    .latest_vote_list
                    .iter()
                    .map(|vote| (vote.agent, vote.target)),
            );
            self.adjust_vote(&ballots, protected, threshold)
        } else {
            self.vote_map.put(self.me, self.vote_candidate, None);
            self.adjust_vote(&self.vote_map, protected, threshold)
        };
    }

    // Redeclares the vote candidate if it moved, then speaks one utterance.
    pub fn finish_talk(&mut self) -> String {
        if self.vote_candidate != self.declared_vote_candidate {
            self.cancel_voting();
            let declared = Target::from(self.declared_vote_candidate);
            self.cancel(&Content::request(
                self.me,
                Target::Any,
                Content::vote(Subject::Any, declared),
            ));
            if let Some(candidate) = self.vote_candidate {
                self.enqueue(Content::vote(self.me, candidate));
                self.enqueue(Content::request(
                    self.me,
                    Target::Any,
                    Content::vote(Subject::Any, candidate),
                ));
            }
            self.declared_vote_candidate = self.vote_candidate;
        }
        self.speak()
    }

    // Ends the turn with the next queued utterance.
    pub fn speak(&mut self) -> String {
        self.turn += 1;
        self.dequeue()
    }

    pub fn finish_vote(&mut self) -> Option<Agent> {
        self.is_revote = true;
        self.vote_candidate
    }

    pub fn unsupported(&self, action: &'static str) -> AgentError {
        log::error!("{} was asked to {action} as {}", self.me, self.my_role);
        AgentError::UnsupportedAction {
            role: self.my_role,
            action,
        }
    }

    pub fn enqueue(&mut self, content: Content) {
        self.talk_queue.enqueue(content, self.me);
    }

    pub fn dequeue(&mut self) -> String {
        self.talk_queue.dequeue(self.me)
    }

    pub fn cancel(&mut self, content: &Content) {
        self.talk_queue.cancel(content);
    }

    pub fn cancel_all(&mut self) {
        self.talk_queue.clear();
    }

    pub fn talk_queue(&self) -> &TalkQueue {
        &self.talk_queue
    }

    pub fn talk_co(&mut self, role: Role) {
        self.cancel_co();
        self.enqueue(Content::comingout(self.me, self.me, role));
    }

    pub fn cancel_co(&mut self) {
        self.cancel(&Content::comingout(self.me, self.me, Role::Any));
    }

    pub fn talk_estimate(&mut self, target: Agent, role: Role) {
        self.cancel_estimate(Some(target));
        self.enqueue(Content::estimate(self.me, target, role));
    }

    pub fn cancel_estimate(&mut self, target: Option<Agent>) {
        self.cancel(&Content::estimate(self.me, Target::from(target), Role::Any));
    }

    pub fn talk_voting(&mut self, target: Agent) {
        self.cancel_voting();
        self.enqueue(Content::vote(self.me, target));
    }

    pub fn cancel_voting(&mut self) {
        self.cancel(&Content::vote(self.me, Target::Any));
    }

    pub fn talk_divined(&mut self, target: Agent, result: Species) {
        self.cancel_divined(target);
        self.enqueue(Content::divined(self.me, target, result));
    }

    pub fn cancel_divined(&mut self, target: Agent) {
        self.cancel(&Content::divined(self.me, target, Species::Any));
    }

    pub fn talk_identified(&mut self, target: Agent, result: Species) {
        self.cancel_identified(target);
        self.enqueue(Content::identified(self.me, target, result));
    }

    pub fn cancel_identified(&mut self, target: Agent) {
        self.cancel(&Content::identified(self.me, target, Species::Any));
    }

    // Queues our own judges of `judges`, each under its DAY, as one utterance.
    pub fn talk_judges(&mut self, judges: &[Judge], topic: Topic) {
        let me = self.me;
        let dated: Vec<_> = judges
            .iter()
            .map(|j| {
                let report = if topic == Topic::Identified {
                    Content::identified(me, j.target, j.result)
                } else {
                    Content::divined(me, j.target, j.result)
                };
                Content::day(me, j.day, report)
            })
            .collect();
        match dated.len() {
            0 => {}
            1 => self.enqueue(dated[0].clone()),
            _ => {
                if let Some(all) = Content::and(me, dated) {
                    self.enqueue(all);
                }
            }
        }
    }

    pub fn me(&self) -> Agent {
        self.me
    }

    pub fn my_role(&self) -> Role {
        self.my_role
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn day(&self) -> u32 {
        self.info.day
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn last_talk_idx(&self) -> Option<usize> {
        self.last_talk_idx
    }

    pub fn game_info(&self) -> &GameInfo {
        &self.info
    }

    pub fn setting(&self) -> &GameSetting {
        &self.setting
    }

    pub fn estimate_map(&self) -> &EstimateReasonMap {
        &self.estimate_map
    }

    pub fn estimate_map_mut(&mut self) -> &mut EstimateReasonMap {
        &mut self.estimate_map
    }

    pub fn vote_map(&self) -> &VoteReasonMap {
        &self.vote_map
    }

    pub fn vote_map_mut(&mut self) -> &mut VoteReasonMap {
        &mut self.vote_map
    }

    pub fn vote_requests(&self) -> &VoteRequestCounter {
        &self.vote_requests
    }

    pub fn vote_requests_mut(&mut self) -> &mut VoteRequestCounter {
        &mut self.vote_requests
    }

    pub fn probabilities(&self) -> &RoleProbabilities {
        &self.probabilities
    }

    pub fn probabilities_mut(&mut self) -> &mut RoleProbabilities {
        &mut self.probabilities
    }

    pub fn prob(&self, agent: Agent, role: Role) -> f64 {
        self.probabilities.get(agent, role)
    }

    pub fn set_prob(&mut self, agent: Agent, role: Role, probability: f64) {
        self.probabilities.set(agent, role, probability);
    }

    pub fn select_max(&self, role: Role, agents: &[Agent]) -> Option<Agent> {
        self.probabilities.max(role, agents, &[])
    }

    pub fn select_min(&self, role: Role, agents: &[Agent]) -> Option<Agent> {
        self.probabilities.min(role, agents, &[])
    }

    // The existing role the agent most probably holds.
    pub fn max_role(&self, agent: Agent) -> Option<Role> {
        self.info
            .existing_role_list
            .iter()
            .copied()
            .max_by(|a, b| self.prob(agent, *a).total_cmp(&self.prob(agent, *b)))
    }

    pub fn is_like_seer(&self, agent: Option<Agent>) -> bool {
        agent.is_some_and(|a| self.max_role(a) == Some(Role::Seer))
    }

    pub fn is_like_wolf(&self, agent: Option<Agent>) -> bool {
        agent.is_some_and(|a| self.is_gray(a) && self.max_role(a) == Some(Role::Werewolf))
    }

    pub fn others(&self) -> Vec<Agent> {
        self.info
            .agent_list()
            .into_iter()
            .filter(|a| *a != self.me)
            .collect()
    }

    pub fn alive_others(&self) -> Vec<Agent> {
        self.alive(&self.others())
    }

    pub fn alive_count(&self) -> usize {
        self.info.alive_agents().len()
    }

    pub fn is_alive(&self, agent: Agent) -> bool {
        self.info.is_alive(agent)
    }

    pub fn is_dead(&self, agent: Agent) -> bool {
        self.info.is_dead(agent)
    }

    pub fn alive(&self, agents: &[Agent]) -> Vec<Agent> {
        agents.iter().copied().filter(|a| self.is_alive(*a)).collect()
    }

    pub fn dead(&self, agents: &[Agent]) -> Vec<Agent> {
        agents.iter().copied().filter(|a| self.is_dead(*a)).collect()
    }

    pub fn exists(&self, role: Role) -> bool {
        self.info.exists(role)
    }

    pub fn is_executed(&self, agent: Agent) -> bool {
        self.executed.contains(&agent)
    }

    pub fn is_killed(&self, agent: Agent) -> bool {
        self.killed.contains(&agent)
    }

    pub fn divination_reports(&self) -> &[Judge] {
        &self.divination_reports
    }

    pub fn divination_by(&self, reporter: Agent) -> Option<&Judge> {
        self.divination_map.get(&reporter)
    }

    pub fn my_divinations(&self) -> &[Judge] {
        &self.my_divinations
    }

    pub fn my_divination_on(&self, day: u32) -> Option<&Judge> {
        self.my_divinations.iter().find(|j| j.day == day)
    }

    pub fn ident_reports(&self) -> &[Judge] {
        &self.ident_reports
    }

    pub fn ident_by(&self, reporter: Agent) -> Option<&Judge> {
        self.ident_map.get(&reporter)
    }

    pub fn my_identifications(&self) -> &[Judge] {
        &self.my_identifications
    }

    pub fn is_co(&self, agent: Agent) -> bool {
        self.comingout_map.contains_key(&agent)
    }

    pub fn is_co_role(&self, role: Role) -> bool {
        self.comingout_map.values().any(|r| *r == role)
    }

    pub fn co_role(&self, agent: Agent) -> Option<Role> {
        self.comingout_map.get(&agent).copied()
    }

    pub fn professed(&self, role: Role) -> Vec<Agent> {
        self.comingout_map
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(agent, _)| *agent)
            .collect()
    }

    fn species_of(&self, agent: Agent) -> Species {
        self.species.get(&agent).copied().unwrap_or(Species::Any)
    }

    pub fn is_human(&self, agent: Agent) -> bool {
        self.species_of(agent) == Species::Human
    }

    pub fn is_gray(&self, agent: Agent) -> bool {
        self.species_of(agent) == Species::Any
    }

    pub fn is_wolf(&self, agent: Agent) -> bool {
        self.species_of(agent) == Species::Werewolf
    }

    pub fn set_human(&mut self, agent: Agent) {
        self.species.insert(agent, Species::Human);
    }

    pub fn set_gray(&mut self, agent: Agent) {
        self.species.insert(agent, Species::Any);
    }

    pub fn set_wolf(&mut self, agent: Agent) {
        self.species.insert(agent, Species::Werewolf);
    }

    pub fn humans(&self, agents: &[Agent]) -> Vec<Agent> {
        agents.iter().copied().filter(|a| self.is_human(*a)).collect()
    }

    pub fn grays(&self, agents: &[Agent]) -> Vec<Agent> {
        agents.iter().copied().filter(|a| self.is_gray(*a)).collect()
    }

    pub fn wolves(&self, agents: &[Agent]) -> Vec<Agent> {
        agents.iter().copied().filter(|a| self.is_wolf(*a)).collect()
    }

    pub fn found_wolf(&self) -> bool {
        self.species.values().any(|s| *s == Species::Werewolf)
    }

    // Most of the possessed likelihood still sits on alive agents, or one came out.
    pub fn found_possessed(&self) -> bool {
        let sum = |agents: Vec<Agent>| -> f64 {
            agents.iter().map(|a| self.prob(*a, Role::Possessed)).sum()
        };
        sum(self.alive_others()) > 0.5 * sum(self.others()) || self.is_co_role(Role::Possessed)
    }

    // A judge contradicting what we know for sure.
    pub fn conflicts(&self, judge: &Judge) -> bool {
        (self.is_human(judge.target) && judge.result == Species::Werewolf)
            || (self.is_wolf(judge.target) && judge.result == Species::Human)
    }

    fn fakes(&self, own: Role, reports: &[Judge]) -> Vec<Agent> {
        if self.my_role == own {
            return self.professed(own);
        }
        let mut fakes: Vec<Agent> = Vec::new();
        for judge in reports.iter().filter(|j| self.conflicts(j)) {
            if !fakes.contains(&judge.agent) {
                fakes.push(judge.agent);
            }
        }
        fakes
    }

    pub fn fake_seers(&self) -> Vec<Agent> {
        self.fakes(Role::Seer, &self.divination_reports)
    }

    pub fn is_fake_seer(&self, agent: Agent) -> bool {
        self.fake_seers().contains(&agent)
    }

    pub fn fake_mediums(&self) -> Vec<Agent> {
        self.fakes(Role::Medium, &self.ident_reports)
    }

    pub fn is_fake_medium(&self, agent: Agent) -> bool {
        self.fake_mediums().contains(&agent)
    }

    // Agents we currently estimate as `role`.
    pub fn estimates(&self, role: Role) -> Vec<Agent> {
        self.estimate_map.estimated(self.me, role)
    }

    // `None` forgets our estimate of the target.
    pub fn set_estimate(&mut self, target: Agent, role: Option<Role>) {
        match role {
            Some(role) => self.estimate_map.put(Estimate::new(self.me, target, role)),
            None => {
                self.estimate_map.remove(self.me, target);
            }
        }
    }

    pub fn is_estimated(&self, agent: Agent, role: Role) -> bool {
        self.estimate_map.is_estimated(self.me, agent, role)
    }

    pub fn pp_observed(&self) -> &BTreeSet<Agent> {
        &self.pp_observed
    }

    // Known able to power play, from past games or from this one.
    pub fn pp_ability(&self, agent: Agent, meta: &MetaInfo) -> bool {
        meta.pp_ability(agent) || self.pp_observed.contains(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Status;
    use crate::game_info::{Talk, Vote};

    fn village(me: u8, role: Role, size: u8) -> GameInfo {
        GameInfo {
            agent: Agent(me),
            status_map: (1..=size).map(|i| (Agent(i), Status::Alive)).collect(),
            role_map: BTreeMap::from([(Agent(me), role)]),
            existing_role_list: vec![Role::Villager, Role::Seer, Role::Werewolf, Role::Possessed],
            ..GameInfo::default()
        }
    }

    fn talk(idx: usize, agent: u8, text: &str) -> Talk {
        Talk {
            idx,
            day: 1,
            turn: 0,
            agent: Agent(agent),
            text: text.to_string(),
        }
    }

    // A core that has seen day 0 and the opening of day 1.
    fn core_on_day_one(info: &mut GameInfo) -> PlayerCore {
        let mut core = PlayerCore::new(PlayerConfig::default());
        core.initialize(info, &GameSetting::default()).expect("role known");
        assert!(core.update(info));
        info.day = 1;
        assert!(core.update(info));
        core.day_start();
        core
    }

    #[test]
    fn first_update_of_a_day_only_advances_the_date() {
        let mut info = village(1, Role::Villager, 5);
        let mut core = core_on_day_one(&mut info);

        info.talk_list = vec![talk(0, 2, "COMINGOUT Agent[02] SEER")];
        assert!(!core.update(&info));
        assert_eq!(core.co_role(Agent(2)), Some(Role::Seer));

        info.day = 2;
        info.talk_list.push(talk(1, 3, "COMINGOUT Agent[03] MEDIUM"));
        assert!(core.update(&info));
        assert!(!core.is_co(Agent(3)));
    }

    #[test]
    fn own_and_seen_talks_are_skipped() {
        let mut info = village(1, Role::Villager, 5);
        let mut core = core_on_day_one(&mut info);

        info.talk_list = vec![
            talk(0, 1, "VOTE Agent[02]"),
            talk(1, 3, "VOTE Agent[02]"),
            talk(2, 4, "not a sentence"),
        ];
        core.update(&info);
        assert_eq!(core.vote_map().target(Agent(1)), None);
        assert_eq!(core.vote_map().target(Agent(3)), Some(Agent(2)));
        assert_eq!(core.last_talk_idx(), Some(2));

        // the same log again changes nothing
        core.vote_map_mut().cancel(Agent(3));
        core.update(&info);
        assert_eq!(core.vote_map().target(Agent(3)), None);
    }

    #[test]
    fn nested_sentences_reach_every_aggregate() {
        let mut info = village(1, Role::Villager, 6);
        let mut core = core_on_day_one(&mut info);

        info.talk_list = vec![
            talk(0, 2, "AND (ESTIMATE Agent[03] WEREWOLF) (Agent[02] COMINGOUT Agent[02] SEER)"),
            talk(1, 2, "DAY 1 (Agent[02] DIVINED Agent[03] WEREWOLF)"),
            talk(2, 4, "REQUEST ANY (ANY VOTE Agent[03])"),
            talk(3, 5, "Agent[05] COMINGOUT Agent[05] POSSESSED"),
        ];
        core.update(&info);

        // the unspecified inner subject stays unresolved, so only the outer one is usable
        assert!(core.estimate_map().estimated(Agent(2), Role::Werewolf).is_empty());
        assert_eq!(core.co_role(Agent(2)), Some(Role::Seer));
        assert_eq!(core.divination_by(Agent(2)).map(|j| j.target), Some(Agent(3)));
        assert_eq!(core.vote_requests().count(Agent(3)), 1);
        assert!(core.pp_observed().contains(&Agent(5)));
        assert!(core.pp_ability(Agent(5), &MetaInfo::default()));
    }

    #[test]
    fn and_siblings_of_estimates_are_parsed() {
        let mut info = village(1, Role::Villager, 6);
        let mut core = core_on_day_one(&mut info);

        info.talk_list = vec![talk(
            0,
            2,
            "AND (Agent[02] ESTIMATE Agent[03] WEREWOLF) (Agent[02] COMINGOUT Agent[02] SEER)",
        )];
        core.update(&info);
        assert_eq!(core.estimate_map().estimated(Agent(2), Role::Werewolf), vec![Agent(3)]);
        assert_eq!(core.co_role(Agent(2)), Some(Role::Seer));
    }

    #[test]
    fn day_start_records_results_and_resets_the_day() {
        let mut info = village(1, Role::Seer, 5);
        let mut core = core_on_day_one(&mut info);
        core.vote_map_mut().put(Agent(2), Some(Agent(3)), None);
        core.talk_co(Role::Seer);

        info.day = 2;
        info.divine_result = Some(Judge::new(1, Agent(1), Agent(4), Species::Werewolf));
        info.executed_agent = Some(Agent(5));
        info.last_dead_agent_list = vec![Agent(2)];
        core.update(&info);
        core.day_start();

        assert!(core.is_wolf(Agent(4)));
        assert!(core.found_wolf());
        assert!(core.is_human(Agent(2)));
        assert!(core.is_killed(Agent(2)));
        assert!(core.is_executed(Agent(5)));
        assert_eq!(core.my_divinations().len(), 1);
        assert_eq!(core.vote_map().total_votes(), 0);
        assert!(core.talk_queue().is_empty());
        assert_eq!(core.turn(), 0);
    }

    #[test]
    fn gate_opens_once_enough_votes_are_declared() {
        let mut info = village(1, Role::Villager, 5);
        let core = core_on_day_one(&mut info);

        // three declared votes for Agent[04] against a threshold of 0.5 x 4 others
        let map = VoteReasonMap::from_ballots([
            (Agent(2), Agent(4)),
            (Agent(3), Agent(4)),
            (Agent(5), Agent(4)),
            (Agent(4), Agent(2)),
        ]);
        assert_eq!(core.adjust_vote(&map, Agent(4), 0.5), Some(Agent(2)));

        // a single declaration keeps our own choice
        let sparse = VoteReasonMap::from_ballots([(Agent(2), Agent(4))]);
        assert_eq!(core.adjust_vote(&sparse, Agent(4), 0.5), None);
    }

    #[test]
    fn vote_moves_off_a_protected_leader() {
        let mut info = village(1, Role::Villager, 5);
        let core = core_on_day_one(&mut info);

        let mut map = VoteReasonMap::from_ballots([
            (Agent(1), Agent(3)),
            (Agent(2), Agent(4)),
            (Agent(3), Agent(4)),
            (Agent(5), Agent(2)),
        ]);
        map.is_changed();
        assert_eq!(core.adjust_vote(&map, Agent(4), 0.5), Some(Agent(2)));

        // our own ballot is still counted and the flag untouched
        assert_eq!(map.target(Agent(1)), Some(Agent(3)));
        assert_eq!(map.total_votes(), 4);
        assert!(!map.is_changed());

        // not protecting the leader keeps the vote
        assert_eq!(core.adjust_vote(&map, Agent(5), 0.5), Some(Agent(3)));
    }

    #[test]
    fn revote_uses_cast_ballots() {
        let mut info = village(1, Role::Villager, 5);
        let mut core = core_on_day_one(&mut info);
        info.latest_vote_list = vec![
            Vote { day: 1, agent: Agent(1), target: Agent(2) },
            Vote { day: 1, agent: Agent(2), target: Agent(1) },
            Vote { day: 1, agent: Agent(3), target: Agent(1) },
            Vote { day: 1, agent: Agent(4), target: Agent(5) },
        ];
        core.update(&info);
        core.is_revote = true;
        core.settle_vote();
        assert_eq!(core.vote_candidate, Some(Agent(5)));
    }

    #[test]
    fn talk_declares_and_redeclares_the_candidate() {
        let mut info = village(1, Role::Villager, 5);
        let mut core = core_on_day_one(&mut info);

        core.vote_candidate = Some(Agent(3));
        assert_eq!(core.finish_talk(), "VOTE Agent[03]");
        assert_eq!(core.turn(), 1);

        core.vote_candidate = Some(Agent(4));
        assert_eq!(core.finish_talk(), "VOTE Agent[04]");
        assert_eq!(core.finish_talk(), "REQUEST ANY (ANY VOTE Agent[04])");
        assert_eq!(core.finish_talk(), "Skip");
        assert_eq!(core.declared_vote_candidate, Some(Agent(4)));
    }

    #[test]
    fn judges_are_reported_under_their_day() {
        let mut info = village(1, Role::Medium, 5);
        let mut core = core_on_day_one(&mut info);
        let judges = [
            Judge::new(1, Agent(1), Agent(2), Species::Human),
            Judge::new(2, Agent(1), Agent(3), Species::Werewolf),
        ];
        core.talk_judges(&judges, Topic::Identified);
        core.talk_judges(&judges[..1], Topic::Identified);
        // only the outermost subject is implicit
        assert_eq!(
            core.dequeue(),
            "AND (Agent[01] DAY 1 (Agent[01] IDENTIFIED Agent[02] HUMAN)) \
             (Agent[01] DAY 2 (Agent[01] IDENTIFIED Agent[03] WEREWOLF))"
        );
        assert_eq!(core.dequeue(), "DAY 1 (Agent[01] IDENTIFIED Agent[02] HUMAN)");
    }

    #[test]
    fn own_estimates() {
        let mut info = village(1, Role::Villager, 5);
        let mut core = core_on_day_one(&mut info);
        core.set_estimate(Agent(3), Some(Role::Werewolf));
        assert!(core.is_estimated(Agent(3), Role::Werewolf));
        assert_eq!(core.estimates(Role::Werewolf), vec![Agent(3)]);
        core.set_estimate(Agent(3), None);
        assert!(!core.is_estimated(Agent(3), Role::Werewolf));
    }
}
