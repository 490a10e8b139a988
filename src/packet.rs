//! One line of the server protocol and the answer to it.
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::agent::Agent;
use crate::error::PacketError;
use crate::game_info::{GameInfo, GameSetting};
use crate::role_assign::RoleAssignPlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    Name,
    Role,
    Initialize,
    Update,
    DailyInitialize,
    DailyFinish,
    Talk,
    Whisper,
    Vote,
    Attack,
    Divine,
    Guard,
    Finish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    pub request: Request,
    #[serde(default)]
    pub game_info: Option<GameInfo>,
    #[serde(default)]
    pub game_setting: Option<GameSetting>,
}

impl Packet {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            game_info: None,
            game_setting: None,
        }
    }

    pub fn with_info(self, info: GameInfo) -> Self {
        Self {
            game_info: Some(info),
            ..self
        }
    }

    pub fn with_setting(self, setting: GameSetting) -> Self {
        Self {
            game_setting: Some(setting),
            ..self
        }
    }
}

// Agent decisions travel as the seat index.
fn agent_answer(agent: Option<Agent>) -> String {
    agent.map_or(-1, |a| i32::from(a.index())).to_string()
}

/// Applies a packet to the player and returns the line to send back, if the
/// request expects one.
///
/// Every request after INITIALIZE first passes its observation to the player.
pub fn respond(player: &mut RoleAssignPlayer, packet: &Packet) -> Result<Option<String>, PacketError> {
    let request = packet.request;
    match request {
        Request::Name => return Ok(Some(player.name().to_string())),
        Request::Role => return Ok(Some("none".to_string())),
        Request::Initialize => {
            let info = packet.game_info.as_ref().ok_or(PacketError::Missing {
                request: "INITIALIZE",
                field: "gameInfo",
            })?;
            let setting = packet.game_setting.clone().unwrap_or_default();
            player.initialize(info, &setting)?;
            return Ok(None);
        }
        _ => {}
    }

    if let Some(info) = &packet.game_info {
        player.update(info)?;
    }
    let answer = match request {
        Request::DailyInitialize => {
            player.day_start()?;
            None
        }
        Request::Talk => Some(player.talk()?),
        Request::Whisper => Some(player.whisper()?),
        Request::Vote => Some(agent_answer(player.vote()?)),
        Request::Attack => Some(agent_answer(player.attack()?)),
        Request::Divine => Some(agent_answer(player.divine()?)),
        Request::Guard => Some(agent_answer(player.guard()?)),
        Request::Finish => {
            player.finish()?;
            None
        }
        _ => None,
    };
    log::debug!("{request} -> {answer:?}");
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::meta_info::MetaInfo;
    use crate::player::PlayerConfig;
    use crate::strategy::fixtures::*;

    fn player() -> RoleAssignPlayer {
        RoleAssignPlayer::new("otk", PlayerConfig::default(), MetaInfo::default())
    }

    #[test]
    fn reads_requests_from_json() {
        let packet: Packet = serde_json::from_str(r#"{"request": "DAILY_INITIALIZE"}"#)
            .expect("valid packet");
        assert_eq!(packet.request, Request::DailyInitialize);
        assert!(packet.game_info.is_none());
    }

    #[test]
    fn name_and_role() {
        let mut player = player();
        assert_eq!(
            respond(&mut player, &Packet::new(Request::Name)),
            Ok(Some("otk".to_string()))
        );
        assert_eq!(
            respond(&mut player, &Packet::new(Request::Role)),
            Ok(Some("none".to_string()))
        );
    }

    #[test]
    fn initialize_needs_an_observation() {
        let mut player = player();
        assert_eq!(
            respond(&mut player, &Packet::new(Request::Initialize)),
            Err(PacketError::Missing {
                request: "INITIALIZE",
                field: "gameInfo"
            })
        );
    }

    #[test]
    fn seer_answers_with_an_index() {
        let mut player = player();
        let info = village(1, Role::Seer);
        let init = Packet::new(Request::Initialize)
            .with_info(info.clone())
            .with_setting(setting());
        assert_eq!(respond(&mut player, &init), Ok(None));

        let day = Packet::new(Request::DailyInitialize).with_info(info);
        assert_eq!(respond(&mut player, &day), Ok(None));

        let answer = respond(&mut player, &Packet::new(Request::Divine))
            .expect("seer divines")
            .expect("an answer");
        let index: i32 = answer.parse().expect("a number");
        assert!((2..=8).contains(&index));

        assert!(respond(&mut player, &Packet::new(Request::Attack)).is_err());
    }
}
