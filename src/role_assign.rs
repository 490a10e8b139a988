//! The player the game server talks to.
//!
//! [`RoleAssignPlayer`] owns the cross-game [`MetaInfo`] and, per game, the
//! [`Player`] built for the role the server assigned. Five-player tables get
//! their own strategies, and the werewolf there varies its play across games.
use rand::Rng;

use crate::agent::{Agent, Role};
use crate::error::AgentError;
use crate::game_info::{GameInfo, GameSetting};
use crate::meta_info::MetaInfo;
use crate::player::PlayerConfig;
use crate::strategy::{Player, RoleStrategy, SMALL_VILLAGE, Werewolf5, WolfPlay};

// The werewolf game after which the rotation is chosen from the wins so far.
const ROTATION_CHECK: u32 = 6;
const PROVEN_WINS: u32 = 2;

// Game counts at which a staged rotation moves on to the next play.
const FAKE_SEER_FROM: u32 = 40;
const VILLAGER_FROM: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum WolfRotation {
    // Silent or accuser at random.
    #[default]
    Trying,
    // Silent or accuser, then fake seer, then villager as games go by.
    Staged,
    // Villager or fake seer at random.
    Proven,
}

#[derive(Debug)]
pub struct RoleAssignPlayer {
    name: String,
    config: PlayerConfig,
    meta: MetaInfo,
    player: Option<Player>,
    last_info: Option<GameInfo>,
    wolf_rotation: WolfRotation,
    wins_as_wolf: u32,
    last_win_count: u32,
}

impl RoleAssignPlayer {
    pub fn new(name: impl Into<String>, config: PlayerConfig, meta: MetaInfo) -> Self {
        Self {
            name: name.into(),
            config,
            meta,
            player: None,
            last_info: None,
            wolf_rotation: WolfRotation::default(),
            wins_as_wolf: 0,
            last_win_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &MetaInfo {
        &self.meta
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.player.as_ref().map(|p| p.core().my_role())
    }

    fn player_mut(&mut self) -> Result<(&mut Player, &MetaInfo), AgentError> {
        match self.player.as_mut() {
            Some(player) => Ok((player, &self.meta)),
            None => {
                log::error!("{} got a request before the game started", self.name);
                Err(AgentError::NotInitialized)
            }
        }
    }

    fn next_wolf_play(&mut self) -> WolfPlay {
        if self.meta.role_count(Role::Werewolf) == ROTATION_CHECK {
            self.wolf_rotation = if self.wins_as_wolf < PROVEN_WINS {
                WolfRotation::Staged
            } else {
                WolfRotation::Proven
            };
        }
        let coin = rand::rng().random_bool(0.5);
        match self.wolf_rotation {
            WolfRotation::Trying => {
                if coin { WolfPlay::Silent } else { WolfPlay::Accuser }
            }
            WolfRotation::Staged => match self.meta.game_count {
                n if n < FAKE_SEER_FROM => {
                    if coin { WolfPlay::Silent } else { WolfPlay::Accuser }
                }
                n if n < VILLAGER_FROM => WolfPlay::FakeSeer,
                _ => WolfPlay::Villager,
            },
            WolfRotation::Proven => {
                if coin { WolfPlay::Villager } else { WolfPlay::FakeSeer }
            }
        }
    }

    fn strategy_for(&mut self, role: Role, setting: &GameSetting) -> RoleStrategy {
        if setting.player_num != SMALL_VILLAGE {
            return RoleStrategy::for_role(role, self.config);
        }
        if role == Role::Werewolf {
            let play = self.next_wolf_play();
            log::debug!("{} picks the {play} werewolf", self.name);
            return Werewolf5::new(self.config, play).into();
        }
        RoleStrategy::for_small_village(role, self.config)
    }

    pub fn initialize(&mut self, info: &GameInfo, setting: &GameSetting) -> Result<(), AgentError> {
        let role = info.role().ok_or(AgentError::NotInitialized)?;
        self.meta.increment_role_count(role);
        let strategy = self.strategy_for(role, setting);
        let mut player = Player::new(strategy, self.config);
        player.initialize(info, setting, &self.meta)?;
        self.player = Some(player);
        self.last_info = Some(info.clone());
        self.last_win_count = self.meta.win_count(info.agent);
        Ok(())
    }

    pub fn update(&mut self, info: &GameInfo) -> Result<(), AgentError> {
        self.last_info = Some(info.clone());
        let (player, meta) = self.player_mut()?;
        player.update(info, meta);
        Ok(())
    }

    pub fn day_start(&mut self) -> Result<(), AgentError> {
        let (player, meta) = self.player_mut()?;
        player.day_start(meta);
        Ok(())
    }

    pub fn talk(&mut self) -> Result<String, AgentError> {
        let (player, meta) = self.player_mut()?;
        Ok(player.talk(meta))
    }

    pub fn whisper(&mut self) -> Result<String, AgentError> {
        let (player, meta) = self.player_mut()?;
        player.whisper(meta)
    }

    pub fn vote(&mut self) -> Result<Option<Agent>, AgentError> {
        let (player, meta) = self.player_mut()?;
        Ok(player.vote(meta))
    }

    pub fn attack(&mut self) -> Result<Option<Agent>, AgentError> {
        let (player, meta) = self.player_mut()?;
        player.attack(meta)
    }

    pub fn divine(&mut self) -> Result<Option<Agent>, AgentError> {
        let (player, meta) = self.player_mut()?;
        player.divine(meta)
    }

    pub fn guard(&mut self) -> Result<Option<Agent>, AgentError> {
        let (player, meta) = self.player_mut()?;
        player.guard(meta)
    }

    /// Closes the game: lets the strategy finish, keeps the power-play claims
    /// seen in it and credits the winners of the last observation.
    pub fn finish(&mut self) -> Result<(), AgentError> {
        let mut player = self.player.take().ok_or(AgentError::NotInitialized)?;
        player.finish(&self.meta);
        for agent in player.core().pp_observed() {
            self.meta.set_pp_ability(*agent);
        }
        if let Some(info) = self.last_info.take() {
            self.meta.finish(&info);
        }
        let me = player.core().me();
        if player.core().my_role() == Role::Werewolf {
            self.wins_as_wolf += self.meta.win_count(me).saturating_sub(self.last_win_count);
        }
        log::info!("{} finished game {}", self.name, self.meta.game_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Status;
    use crate::strategy::fixtures::*;

    fn wolf_play(player: &RoleAssignPlayer) -> Option<WolfPlay> {
        match player.player()?.strategy() {
            RoleStrategy::Werewolf5(w) => Some(w.play()),
            _ => None,
        }
    }

    fn seasoned_meta(game_count: u32) -> MetaInfo {
        MetaInfo {
            game_count,
            role_counts: [(Role::Werewolf, ROTATION_CHECK - 1)].into(),
            ..MetaInfo::default()
        }
    }

    #[test]
    fn requests_before_initialize_fail() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        assert_eq!(player.talk(), Err(AgentError::NotInitialized));
        assert_eq!(player.finish(), Err(AgentError::NotInitialized));
    }

    #[test]
    fn plays_the_assigned_role() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        player
            .initialize(&village(4, Role::Bodyguard), &setting())
            .expect("initialized");
        assert_eq!(player.role(), Some(Role::Bodyguard));
        assert_eq!(player.meta().role_count(Role::Bodyguard), 1);
        assert!(player.divine().is_err());
    }

    #[test]
    fn finish_updates_the_record() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        let mut info = village(1, Role::Villager);
        player.initialize(&info, &setting()).expect("initialized");
        player.update(&info).expect("updated");
        player.day_start().expect("day started");

        info.day = 1;
        player.update(&info).expect("updated");
        player.day_start().expect("day started");
        info.talk_list = vec![talk(0, 1, 7, "COMINGOUT Agent[07] POSSESSED")];
        player.update(&info).expect("updated");

        // the server reveals every role at the end
        info.role_map = (1..=8)
            .map(|i| (Agent(i), if i == 8 { Role::Werewolf } else { Role::Villager }))
            .collect();
        info.status_map.insert(Agent(8), Status::Dead);
        player.update(&info).expect("updated");
        player.finish().expect("finished");

        let meta = player.meta();
        assert_eq!(meta.game_count, 1);
        assert_eq!(meta.win_count(Agent(1)), 1);
        assert_eq!(meta.win_count(Agent(8)), 0);
        assert!(meta.pp_ability(Agent(7)));
        assert!(player.player().is_none());
    }

    #[test]
    fn five_player_games_use_the_small_village_strategies() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        player
            .initialize(&small_village(2, Role::Villager), &small_setting())
            .expect("initialized");
        let strategy = player.player().map(Player::strategy);
        assert!(matches!(strategy, Some(RoleStrategy::Villager5(_))));

        player
            .initialize(&small_village(2, Role::Werewolf), &small_setting())
            .expect("initialized");
        assert!(matches!(
            wolf_play(&player),
            Some(WolfPlay::Silent | WolfPlay::Accuser)
        ));
    }

    #[test]
    fn larger_games_use_the_general_strategies() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        player
            .initialize(&village(2, Role::Werewolf), &setting())
            .expect("initialized");
        let strategy = player.player().map(Player::strategy);
        assert!(matches!(strategy, Some(RoleStrategy::Werewolf(_))));
    }

    #[test]
    fn staged_rotation_follows_the_game_count() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), seasoned_meta(100));
        player
            .initialize(&small_village(1, Role::Werewolf), &small_setting())
            .expect("initialized");
        assert_eq!(player.wolf_rotation, WolfRotation::Staged);
        assert_eq!(wolf_play(&player), Some(WolfPlay::Villager));

        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), seasoned_meta(50));
        player
            .initialize(&small_village(1, Role::Werewolf), &small_setting())
            .expect("initialized");
        assert_eq!(wolf_play(&player), Some(WolfPlay::FakeSeer));
    }

    #[test]
    fn winning_wolves_keep_to_the_stronger_plays() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), seasoned_meta(10));
        player.wins_as_wolf = PROVEN_WINS;
        player
            .initialize(&small_village(1, Role::Werewolf), &small_setting())
            .expect("initialized");
        assert_eq!(player.wolf_rotation, WolfRotation::Proven);
        assert!(matches!(
            wolf_play(&player),
            Some(WolfPlay::Villager | WolfPlay::FakeSeer)
        ));
    }

    #[test]
    fn wins_as_werewolf_are_counted() {
        let mut player = RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default());
        let mut info = small_village(1, Role::Werewolf);
        player.initialize(&info, &small_setting()).expect("initialized");
        player.update(&info).expect("updated");

        info.role_map = (1..=5)
            .map(|i| (Agent(i), if i == 1 { Role::Werewolf } else { Role::Villager }))
            .collect();
        info.status_map.insert(Agent(2), Status::Dead);
        player.update(&info).expect("updated");
        player.finish().expect("finished");
        assert_eq!(player.wins_as_wolf, 1);

        let info = small_village(1, Role::Villager);
        player.initialize(&info, &small_setting()).expect("initialized");
        player.update(&info).expect("updated");
        player.finish().expect("finished");
        assert_eq!(player.wins_as_wolf, 1);
    }
}
