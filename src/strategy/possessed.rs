use crate::agent::{Agent, Role, Species};
use crate::error::AgentError;
use crate::game_info::GameInfo;
use crate::judge::Judge;
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};

use super::{Player, Seer, Strategy};

/// Poses as a seer.
///
/// An inner seer player is fed the real observation with a made-up divination
/// each day and does the talking. Once three or fewer agents remain the
/// possessed comes out as a werewolf and votes on its own.
#[derive(Debug)]
pub struct Possessed {
    config: PlayerConfig,
    inner: Box<Player>,
    fake_divination: Option<Judge>,
    divined: Vec<Agent>,
}

impl Possessed {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            inner: Box::new(Player::new(Seer::default().into(), config)),
            fake_divination: None,
            divined: Vec::new(),
        }
    }

    pub fn inner(&self) -> &Player {
        &self.inner
    }

    fn fake_info(&self, info: &GameInfo) -> GameInfo {
        info.fake_view(Role::Seer)
            .with_divine_result(self.fake_divination)
    }

    // Black on odd days up to the third, white otherwise; nobody is judged twice.
    fn next_judge(&mut self, core: &PlayerCore) -> Option<Judge> {
        let candidates: Vec<_> = core
            .alive_others()
            .into_iter()
            .filter(|a| !self.divined.contains(a))
            .collect();
        let day = core.day();
        let (target, result) = match day {
            1 | 3 => (core.select_min(Role::Werewolf, &candidates)?, Species::Werewolf),
            _ => (core.select_max(Role::Werewolf, &candidates)?, Species::Human),
        };
        self.divined.push(target);
        Some(Judge::new(day, core.me(), target, result))
    }
}

impl Strategy for Possessed {
    fn initialize(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<(), AgentError> {
        self.fake_divination = None;
        self.divined.clear();
        self.inner = Box::new(Player::new(Seer::default().into(), self.config));
        let fake = self.fake_info(core.game_info());
        self.inner.initialize(&fake, core.setting(), meta)
    }

    fn update(&mut self, core: &mut PlayerCore, day_opened: bool, meta: &MetaInfo) {
        if day_opened && core.day() > 0 {
            self.fake_divination = self.next_judge(core);
            log::debug!("{} fakes {:?}", core.me(), self.fake_divination);
        }
        let fake = self.fake_info(core.game_info());
        self.inner.update(&fake, meta);
    }

    fn day_start(&mut self, _core: &mut PlayerCore, meta: &MetaInfo) {
        self.inner.day_start(meta);
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, meta: &MetaInfo, is_last: bool) {
        let candidate = self.inner.vote_candidate(core.is_revote, meta);
        core.vote_candidate = candidate;
        if !is_last {
            return;
        }
        let others = core.alive_others();
        if core.alive_count() <= 3 {
            core.vote_candidate = core.select_min(Role::Werewolf, &others);
        } else if !candidate.is_some_and(|c| self.inner.core().is_wolf(c)) {
            // follow the most wolf-like agent's declared vote
            let wolf_target = core
                .select_max(Role::Werewolf, &others)
                .and_then(|wolf| core.vote_map().target(wolf))
                .filter(|target| core.is_alive(*target));
            core.vote_candidate = wolf_target.or_else(|| core.select_min(Role::Werewolf, &others));
        }
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        if core.alive_count() > 3 {
            return self.inner.talk(meta);
        }
        if !core.is_pp {
            core.is_pp = true;
            core.talk_co(Role::Werewolf);
        }
        self.choose_vote_candidate(core, meta, false);
        core.finish_talk()
    }
}
