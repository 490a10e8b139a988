use crate::agent::{Agent, Role, Species};
use crate::content::Content;
use crate::error::AgentError;
use crate::game_info::GameInfo;
use crate::meta_info::MetaInfo;
use crate::player::{PlayerConfig, PlayerCore};

use super::five::{
    declare_vote, estimated, estimated_all, power_play, select_max_except, SeerReplay,
};
use super::{Player, Strategy, Villager5};

/// How the lone werewolf of a five-player village spends day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum WolfPlay {
    /// Votes like the villager it pretends to be.
    #[default]
    Villager,
    /// Comes out as seer and vouches for the likeliest possessed.
    FakeSeer,
    /// Says nothing and votes for the likeliest villager.
    Silent,
    /// Names the likeliest villager a werewolf.
    Accuser,
}

/// The werewolf of a five-player village.
///
/// Day 2 is the same for every play: vote off the least likely possessed and
/// ask the likeliest one to join.
#[derive(Debug)]
pub struct Werewolf5 {
    config: PlayerConfig,
    play: WolfPlay,
    inner: Box<Player>,
    seer: Option<SeerReplay>,
}

impl Werewolf5 {
    pub fn new(config: PlayerConfig, play: WolfPlay) -> Self {
        Self {
            config,
            play,
            inner: Box::new(Player::new(Villager5.into(), config)),
            seer: (play == WolfPlay::FakeSeer).then(|| SeerReplay::new(config)),
        }
    }

    pub fn play(&self) -> WolfPlay {
        self.play
    }

    pub fn inner(&self) -> &Player {
        &self.inner
    }

    pub fn seer(&self) -> Option<&SeerReplay> {
        self.seer.as_ref()
    }

    fn fake_info(info: &GameInfo) -> GameInfo {
        info.fake_view(Role::Villager)
    }

    fn likeliest_villager(core: &PlayerCore) -> Option<Agent> {
        core.select_max(Role::Villager, &estimated_all(core, Role::Villager))
    }

    fn day_one_talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) {
        match self.play {
            WolfPlay::Villager => {
                let candidate = estimated(self.inner.core(), Role::Werewolf);
                declare_vote(core, candidate, None);
            }
            WolfPlay::Silent => core.vote_candidate = Self::likeliest_villager(core),
            WolfPlay::Accuser => {
                let candidate = Self::likeliest_villager(core);
                core.vote_candidate = candidate;
                if candidate != core.declared_vote_candidate {
                    if let Some(target) = candidate {
                        let me = core.me();
                        core.enqueue(Content::estimate(me, target, Role::Werewolf));
                    }
                    core.declared_vote_candidate = candidate;
                }
            }
            WolfPlay::FakeSeer => {
                let possessed = estimated(core, Role::Possessed);
                if let Some(seer) = self.seer.as_mut() {
                    seer.day_one_talk(core, possessed, meta);
                }
            }
        }
    }
}

impl Strategy for Werewolf5 {
    fn initialize(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> Result<(), AgentError> {
        *self = Self::new(self.config, self.play);
        log::info!("{} plays the werewolf as {}", core.me(), self.play);
        let fake = Self::fake_info(core.game_info());
        self.inner.initialize(&fake, core.setting(), meta)?;
        if let Some(seer) = self.seer.as_mut() {
            seer.initialize(core.game_info(), core.setting(), meta)?;
        }
        Ok(())
    }

    fn update(&mut self, core: &mut PlayerCore, _day_opened: bool, meta: &MetaInfo) {
        let fake = Self::fake_info(core.game_info());
        self.inner.update(&fake, meta);
        if let Some(seer) = self.seer.as_mut() {
            seer.observe(core.game_info(), meta);
        }
    }

    fn day_start(&mut self, _core: &mut PlayerCore, meta: &MetaInfo) {
        self.inner.day_start(meta);
    }

    fn choose_vote_candidate(&mut self, core: &mut PlayerCore, _meta: &MetaInfo, is_last: bool) {
        if is_last {
            core.settle_vote_with(core.me(), 1.0);
        }
    }

    fn talk(&mut self, core: &mut PlayerCore, meta: &MetaInfo) -> String {
        match core.day() {
            1 => self.day_one_talk(core, meta),
            2 => {
                let others = core.alive_others();
                let candidate = core.select_min(Role::Possessed, &others);
                let ally = select_max_except(core, Role::Possessed, &others, candidate);
                if core.turn() == 0 {
                    if let Some(seer) = &self.seer {
                        let me = core.me();
                        if seer.divined_human() == ally {
                            if let Some(target) = candidate {
                                core.enqueue(Content::divined(me, target, Species::Werewolf));
                            }
                        } else if let Some(ally) = ally {
                            core.enqueue(Content::divined(me, ally, Species::Human));
                        }
                    }
                }
                declare_vote(core, candidate, ally);
                power_play(core, false);
            }
            _ => {}
        }
        core.speak()
    }

    // The only werewolf has nobody to whisper to.
    fn whisper(&mut self, _core: &mut PlayerCore, _meta: &MetaInfo) -> Result<String, AgentError> {
        Ok(Content::skip().to_string())
    }

    fn attack(&mut self, core: &mut PlayerCore, _meta: &MetaInfo) -> Result<Option<Agent>, AgentError> {
        Ok(core.select_min(Role::Possessed, &core.alive_others()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::*;

    fn wolf_on_day(play: WolfPlay, days: u32, meta: &MetaInfo) -> (Player, GameInfo) {
        let mut info = small_village(1, Role::Werewolf);
        let config = PlayerConfig::default();
        let mut player = Player::new(Werewolf5::new(config, play).into(), config);
        player.initialize(&info, &small_setting(), meta).expect("initialized");
        for day in 0..=days {
            info.day = day;
            player.update(&info, meta);
            player.day_start(meta);
        }
        (player, info)
    }

    fn lean(player: &mut Player) {
        let core = player.core_mut();
        core.set_prob(Agent(2), Role::Seer, 0.9);
        core.set_prob(Agent(3), Role::Possessed, 0.9);
        core.set_prob(Agent(4), Role::Villager, 0.95);
        core.set_prob(Agent(5), Role::Possessed, -0.5);
    }

    #[test]
    fn inner_villager_sees_a_villager() {
        let meta = MetaInfo::default();
        let (mut player, _) = wolf_on_day(WolfPlay::Villager, 1, &meta);
        match player.strategy() {
            crate::strategy::RoleStrategy::Werewolf5(w) => {
                assert_eq!(w.inner().core().my_role(), Role::Villager);
                assert_eq!(w.inner().core().day(), 1);
                assert!(w.seer().is_none());
            }
            _ => unreachable!("built as werewolf"),
        }
        assert!(player.talk(&meta).starts_with("VOTE Agent["));
    }

    #[test]
    fn accuser_names_the_likeliest_villager() {
        let meta = MetaInfo::default();
        let (mut player, _) = wolf_on_day(WolfPlay::Accuser, 1, &meta);
        lean(&mut player);

        assert_eq!(player.talk(&meta), "ESTIMATE Agent[04] WEREWOLF");
        assert_eq!(player.talk(&meta), "Skip");
        assert_eq!(player.vote(&meta), Some(Agent(4)));
    }

    #[test]
    fn silent_wolf_only_votes() {
        let meta = MetaInfo::default();
        let (mut player, _) = wolf_on_day(WolfPlay::Silent, 1, &meta);
        lean(&mut player);

        assert_eq!(player.talk(&meta), "Skip");
        assert_eq!(player.vote(&meta), Some(Agent(4)));
    }

    #[test]
    fn fake_seer_turns_on_the_other_on_day_two() {
        let meta = MetaInfo::default();
        let (mut player, mut info) = wolf_on_day(WolfPlay::FakeSeer, 1, &meta);
        lean(&mut player);
        assert_eq!(player.talk(&meta), "COMINGOUT Agent[01] SEER");
        assert_eq!(player.talk(&meta), "DIVINED Agent[03] HUMAN");

        info.day = 2;
        player.update(&info, &meta);
        player.day_start(&meta);
        assert_eq!(player.talk(&meta), "DIVINED Agent[05] WEREWOLF");
        assert_eq!(player.talk(&meta), "VOTE Agent[05]");
        assert_eq!(player.talk(&meta), "REQUEST Agent[03] (Agent[03] VOTE Agent[05])");
    }

    #[test]
    fn attacks_the_least_likely_possessed() {
        let meta = MetaInfo::default();
        let (mut player, _) = wolf_on_day(WolfPlay::Villager, 1, &meta);
        lean(&mut player);
        assert_eq!(player.attack(&meta), Ok(Some(Agent(5))));
        assert_eq!(player.whisper(&meta), Ok("Skip".to_string()));
    }
}
