use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeMap;

use crate::agent::{Agent, Role, Species};
use crate::content::{Body, Content, Subject};
use crate::error::AgentError;
use crate::game_info::GameInfo;
use crate::judge::Judge;
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};
use crate::talk_queue::TalkQueue;
use crate::vote_map::VoteReasonMap;

use super::villager::{declare_ballot, follow_votes, settle_or_declare};
use super::{Medium, Player, Seer, Strategy, Villager, max_by_score};

/// Hides behind a fake village role played by an inner player.
///
/// Fellow werewolves are coordinated over whispers: fake-role claims on day 0,
/// attack declarations afterwards, and the agent suspected to be the possessed.
#[derive(Debug)]
pub struct Werewolf {
    config: PlayerConfig,
    fake_role: Role,
    inner: Box<Player>,
    initial_info: GameInfo,
    whisper_head: usize,
    whisper_queue: TalkQueue,
    our_comingouts: BTreeMap<Agent, Role>,
    attack_votes: VoteReasonMap,
    attack_vote_candidate: Option<Agent>,
    declared_attack_vote_candidate: Option<Agent>,
    possessed: Option<Agent>,
    declared_possessed: Option<Agent>,
    fake_divine_target: Option<Agent>,
    fake_result: Option<Species>,
}

impl Werewolf {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            fake_role: Role::Villager,
            inner: Box::new(Player::new(Villager.into(), config)),
            initial_info: GameInfo::default(),
            whisper_head: 0,
            whisper_queue: TalkQueue::new(),
            our_comingouts: BTreeMap::new(),
            attack_votes: VoteReasonMap::attack(),
            attack_vote_candidate: None,
            declared_attack_vote_candidate: None,
            possessed: None,
            declared_possessed: None,
            fake_divine_target: None,
            fake_result: None,
        }
    }

    pub fn fake_role(&self) -> Role {
        self.fake_role
    }

    pub fn inner(&self) -> &Player {
        &self.inner
    }

    pub fn attack_votes(&self) -> &VoteReasonMap {
        &self.attack_votes
    }

    pub fn possessed(&self) -> Option<Agent> {
        self.possessed
    }

    // Starts a fresh inner player for the current fake role and claims it to the pack.
    fn setup_fake_role(&mut self, core: &PlayerCore, meta: &MetaInfo) -> Result<(), AgentError> {
        let strategy = match self.fake_role {
            Role::Seer => Seer::default().into(),
            Role::Medium => Medium::default().into(),
            _ => Villager.into(),
        };
        self.inner = Box::new(Player::new(strategy, self.config));
        let fake = self.fake_info(&self.initial_info, core.me());
        self.inner.initialize(&fake, core.setting(), meta)?;
        let me = core.me();
        self.whisper_queue
            .enqueue(Content::comingout(me, me, self.fake_role), me);
        log::info!("{me} plays {} as a werewolf", self.fake_role);
        Ok(())
    }

    fn fake_info(&self, info: &GameInfo, me: Agent) -> GameInfo {
        let fake = info.fake_view(self.fake_role);
        match (self.fake_role, self.fake_result) {
            (Role::Seer, Some(result)) => {
                let judge = self
                    .fake_divine_target
                    .map(|target| Judge::new(info.day, me, target, result));
                fake.with_divine_result(judge)
            }
            (Role::Medium, Some(result)) => {
                let judge = info
                    .executed_agent
                    .map(|target| Judge::new(info.day, me, target, result));
                fake.with_medium_result(judge)
            }
            _ => fake,
        }
    }

    // Black at even odds while the fake role has not exposed every other werewolf yet.
    fn next_judge(&self, core: &PlayerCore) -> Species {
        let agents = core.game_info().agent_list();
        let exposed = self.inner.core().wolves(&agents).len();
        let hidden = core.setting().role_num(Role::Werewolf) as i64 - 1 - exposed as i64;
        if hidden > 0 && rand::rng().random::<f64>() < 0.5 {
            Species::Werewolf
        } else {
            Species::Human
        }
    }

    fn process_whispers(&mut self, core: &mut PlayerCore) {
        let info = core.game_info();
        let whispers = info
            .whisper_list
            .get(self.whisper_head..)
            .unwrap_or_default()
            .to_vec();
        self.whisper_head = info.whisper_list.len();

        for whisper in whispers {
            if whisper.agent == core.me() {
                continue;
            }
            match whisper.text.parse::<Content>() {
                Ok(content) => {
                    let content = if content.subject() == Subject::Unspecified {
                        content.with_subject(whisper.agent)
                    } else {
                        content
                    };
                    self.parse_whisper(core, &content);
                }
                Err(e) => log::debug!("dropping whisper {:?} from {}: {e}", whisper.text, whisper.agent),
            }
        }
    }

    fn parse_whisper(&mut self, core: &mut PlayerCore, content: &Content) {
        if core.estimate_map_mut().put_content(content) {
            return;
        }
        if self.attack_votes.put_content(content) {
            return;
        }
        if let (Body::Comingout { role, .. }, Some(speaker)) = (content.body(), content.subject().agent()) {
            self.our_comingouts.insert(speaker, *role);
        }
    }

    // Fake judges that cannot come from a werewolf point at the possessed.
    fn find_possessed(&mut self, core: &PlayerCore) {
        let mut fake_judges = core.alive(&core.fake_seers());
        fake_judges.extend(core.alive(&core.fake_mediums()));
        fake_judges.retain(|a| !core.is_wolf(*a));

        self.possessed = core.select_max(Role::Possessed, &fake_judges);
        if let Some(possessed) = self.possessed {
            self.inner
                .core_mut()
                .set_prob(possessed, Role::Werewolf, 0.0);
            if self.declared_possessed != Some(possessed) {
                let me = core.me();
                self.whisper_queue
                    .enqueue(Content::estimate(me, possessed, Role::Possessed), me);
                self.declared_possessed = Some(possessed);
            }
        }
    }

    fn found_possessed(core: &PlayerCore) -> bool {
        core.found_possessed() || core.is_co_role(Role::Werewolf)
    }

    fn attack_value(&self, core: &PlayerCore, meta: &MetaInfo, agent: Agent) -> f64 {
        let mut value = 0.2 * core.prob(agent, Role::Seer) - core.prob(agent, Role::Possessed);
        if core.exists(Role::Bodyguard) {
            value += 0.1 * core.prob(agent, Role::Bodyguard);
        }
        if core.exists(Role::Medium) {
            value += 0.1 * core.prob(agent, Role::Medium);
        }
        if self.possessed == Some(agent) {
            value -= 1.0;
        }
        value + 3.0 * meta.win_rate(agent)
    }

    fn choose_attack_vote_candidate(&self, core: &PlayerCore, meta: &MetaInfo) -> Option<Agent> {
        let humans = core.humans(&core.alive_others());
        max_by_score(&humans, |agent| self.attack_value(core, meta, agent))
    }

    // Takes the first village role the pack has not claimed yet.
    fn unclaimed_role(&self) -> Role {
        let claimed: Vec<Role> = self.our_comingouts.values().copied().collect();
        [Role::Seer, Role::Medium]
            .into_iter()
            .find(|role| !claimed.contains(role))
            .unwrap_or(Role::Villager)
    }
}

impl Strategy for Werewolf {
    fn initialize(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<(), AgentError> {
        *self = Self::new(self.config);
        self.initial_info = core.game_info().clone();
        let roles: Vec<Role> = [Role::Villager, Role::Seer, Role::Medium]
            .into_iter()
            .filter(|role| core.exists(*role))
            .collect();
        self.fake_role = roles
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Role::Villager);
        self.setup_fake_role(core, meta)
    }

    fn update(&mut self, core: &mut PlayerCore, day_opened: bool, meta: &MetaInfo) {
        if day_opened && core.day() > 0 {
            self.fake_divine_target = if self.fake_role == Role::Seer {
                self.inner.divine(meta).ok().flatten()
            } else {
                None
            };
            self.fake_result = Some(self.next_judge(core));
        }

        let fake = self.fake_info(core.game_info(), core.me());
        self.inner.update(&fake, meta);
        for wolf in core.wolves(&core.game_info().agent_list()) {
            self.inner.core_mut().set_prob(wolf, Role::Werewolf, 0.0);
        }

        self.process_whispers(core);
        self.find_possessed(core);
    }

    fn day_start(&mut self, _core: &mut PlayerCore, meta: &MetaInfo) {
        self.inner.day_start(meta);
        self.attack_vote_candidate = None;
        self.declared_attack_vote_candidate = None;
        self.possessed = None;
        self.declared_possessed = None;
        self.whisper_head = 0;
        self.attack_votes.clear();
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, meta: &MetaInfo, is_last: bool) {
        let inner = &self.inner;
        if !follow_votes(core, |_, agent| inner.core().prob(agent, Role::Werewolf)) {
            let mut candidate = self.inner.vote_candidate(core.is_revote, meta);
            if candidate.is_some_and(|c| core.is_wolf(c)) {
                candidate = core.select_max(Role::Werewolf, &core.humans(&core.alive_others()));
            }
            declare_ballot(core, candidate);
        }
        let like_wolf = self.inner.core().is_like_wolf(core.vote_candidate);
        settle_or_declare(core, is_last, like_wolf);
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        if core.alive_count() > 3 {
            return self.inner.talk(meta);
        }
        if !core.is_pp && Self::found_possessed(core) {
            core.is_pp = true;
            core.talk_co(Role::Werewolf);
        }
        self.choose_vote_candidate(core, meta, false);
        core.finish_talk()
    }

    fn whisper(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<String, AgentError> {
        if core.day() == 0 {
            if !self.our_comingouts.is_empty() {
                let role = self.unclaimed_role();
                if role != self.fake_role {
                    self.fake_role = role;
                    self.setup_fake_role(core, meta)?;
                    // the new inner player catches up with day 0
                    let fake = self.fake_info(core.game_info(), core.me());
                    self.inner.update(&fake, meta);
                    self.inner.day_start(meta);
                }
            }
        } else {
            self.attack_vote_candidate = self.choose_attack_vote_candidate(core, meta);
            if let Some(candidate) = self.attack_vote_candidate {
                if self.declared_attack_vote_candidate != Some(candidate) {
                    let me = core.me();
                    self.whisper_queue
                        .enqueue(Content::attack(me, candidate), me);
                    self.declared_attack_vote_candidate = Some(candidate);
                }
            }
        }
        Ok(self.whisper_queue.dequeue(core.me()))
    }

    fn attack(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Ok(self.choose_attack_vote_candidate(core, meta))
    }
}
