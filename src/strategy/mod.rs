//! Role strategies.
//!
//! A [`Strategy`] decides what a role says and whom it picks; the shared
//! bookkeeping lives in [`PlayerCore`]. A [`Player`] pairs the two with a
//! probability source, and is what the driver (or an outer strategy running a
//! fake role) talks to.
mod bodyguard;
mod five;
mod medium;
mod possessed;
mod possessed5;
mod seer;
mod seer5;
mod villager;
mod villager5;
mod werewolf;
mod werewolf5;

pub use bodyguard::Bodyguard;
pub use five::{SMALL_VILLAGE, SeerReplay};
pub use medium::Medium;
pub use possessed::Possessed;
pub use possessed5::Possessed5;
pub use seer::Seer;
pub use seer5::Seer5;
pub use villager::Villager;
pub use villager5::Villager5;
pub use werewolf::Werewolf;
pub use werewolf5::{WolfPlay, Werewolf5};

use enum_dispatch::enum_dispatch;

use crate::agent::{Agent, Role};
use crate::error::AgentError;
use crate::game_info::{GameInfo, GameSetting};
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};
use crate::probabilities::{PriorSource, ProbabilitySource};

#[enum_dispatch]
pub trait Strategy {
    fn initialize(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) -> Result<(), AgentError> {
        Ok(())
    }

    // Runs after the core has read the observation.
    fn update(&mut self, _core: &mut PlayerCore, _day_opened: bool, _meta: &MetaInfo) {}

    fn day_start(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) {}

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if is_last {
            core.settle_vote();
        }
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        self.choose_vote_candidate(core, meta, false);
        core.finish_talk()
    }

    fn vote(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Option<Agent> {
        self.choose_vote_candidate(core, meta, true);
        core.finish_vote()
    }

    fn whisper(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<String, AgentError> {
        Err(core.unsupported("whisper"))
    }

    fn attack(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Err(core.unsupported("attack"))
    }

    fn divine(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Err(core.unsupported("divine"))
    }

    fn guard(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Err(core.unsupported("guard"))
    }

    fn finish(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) {}
}

#[enum_dispatch(Strategy)]
#[derive(Debug)]
pub enum RoleStrategy {
    Villager,
    Seer,
    Medium,
    Bodyguard,
    Possessed,
    Werewolf,
    Villager5,
    Seer5,
    Possessed5,
    Werewolf5,
}

impl RoleStrategy {
    // Roles without a strategy of their own play as villagers.
    pub fn for_role(role: Role, config: PlayerConfig) -> Self {
        match role {
            Role::Seer => Seer::default().into(),
            Role::Medium => Medium::default().into(),
            Role::Bodyguard => Bodyguard.into(),
            Role::Possessed => Possessed::new(config).into(),
            Role::Werewolf => Werewolf::new(config).into(),
            _ => Villager.into(),
        }
    }

    /// The five-player village has its own villager, seer and possessed; the
    /// werewolf is built by the caller, which picks its play.
    pub fn for_small_village(role: Role, config: PlayerConfig) -> Self {
        match role {
            Role::Villager => Villager5.into(),
            Role::Seer => Seer5.into(),
            Role::Possessed => Possessed5::new(config).into(),
            Role::Werewolf => Werewolf5::new(config, WolfPlay::default()).into(),
            _ => Self::for_role(role, config),
        }
    }
}

// A strategy with its own bookkeeping and probability table.
#[derive(Debug)]
pub struct Player {
    core: PlayerCore,
    strategy: RoleStrategy,
    source: Box<dyn ProbabilitySource>,
}

impl Player {
    pub fn new(strategy: RoleStrategy, config: PlayerConfig) -> Self {
        Self::with_source(strategy, config, Box::new(PriorSource::new()))
    }

    pub fn with_source(
        strategy: RoleStrategy,
        config: PlayerConfig,
        source: Box<dyn ProbabilitySource>,
    ) -> Self {
        Self {
            core: PlayerCore::new(config),
            strategy,
            source,
        }
    }

    pub fn core(&self) -> &PlayerCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut PlayerCore {
        &mut self.core
    }

    pub fn strategy(&self) -> &RoleStrategy {
        &self.strategy
    }

    pub fn initialize(
        &mut self,
        info: &GameInfo,
        setting: &GameSetting,
        meta: &MetaInfo,
    ) -> Result<(), AgentError> {
        self.core.initialize(info, setting)?;
        self.source
            .initialize(info, setting, self.core.probabilities_mut());
        self.strategy.initialize(&mut self.core, meta)
    }

    // True when the observation opened a new day.
    pub fn update(&mut self, info: &GameInfo, meta: &MetaInfo) -> bool {
        self.source.update(info, self.core.probabilities_mut());
        let day_opened = self.core.update(info);
        self.strategy.update(&mut self.core, day_opened, meta);
        day_opened
    }

    pub fn day_start(&mut self, meta: &MetaInfo) {
        self.core.day_start();
        self.strategy.day_start(&mut self.core, meta);
    }

    pub fn talk(&mut self, meta: &MetaInfo) -> String {
        self.strategy.talk(&mut self.core, meta)
    }

    pub fn whisper(&mut self, meta: &MetaInfo) -> Result<String, AgentError> {
        self.strategy.whisper(&mut self.core, meta)
    }

    pub fn vote(&mut self, meta: &MetaInfo) -> Option<Agent> {
        self.strategy.vote(&mut self.core, meta)
    }

    // The ballot the strategy would cast now. Unlike `vote`, the day's vote is not closed.
    pub fn vote_candidate(&mut self, is_revote: bool, meta: &MetaInfo) -> Option<Agent> {
        self.core.is_revote = is_revote;
        self.strategy.choose_vote_candidate(&mut self.core, meta, true);
        self.core.vote_candidate
    }

    pub fn attack(&mut self, meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        self.strategy.attack(&mut self.core, meta)
    }

    pub fn divine(&mut self, meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        self.strategy.divine(&mut self.core, meta)
    }

    pub fn guard(&mut self, meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        self.strategy.guard(&mut self.core, meta)
    }

    pub fn finish(&mut self, meta: &MetaInfo) {
        self.strategy.finish(&mut self.core, meta);
    }
}

// The highest scoring agent; `None` for no candidates.
pub(crate) fn max_by_score(agents: &[Agent], score: impl Fn(Agent) -> f64) -> Option<Agent> {
    agents
        .iter()
        .copied()
        .max_by(|a, b| score(*a).total_cmp(&score(*b)))
}
