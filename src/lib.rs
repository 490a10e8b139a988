pub mod agent;
pub mod content;
pub mod error;
pub mod estimate;
pub mod estimate_map;
pub mod game_info;
pub mod judge;
pub mod logging;
pub mod meta_info;
pub mod packet;
pub mod player;
pub mod probabilities;
pub mod role_assign;
pub mod settings;
pub mod strategy;
pub mod talk_queue;
pub mod vote_map;
pub mod vote_request;

// Re-export commonly used items for easier access
pub use agent::{Agent, Role, Species, Status, TalkType};
pub use content::{Body, Content, Operator, Subject, Target, Topic};
pub use error::{AgentError, ContentError, PacketError, SettingsError};
pub use estimate::Estimate;
pub use estimate_map::{EstimatePolicy, EstimateReasonMap};
pub use game_info::{GameInfo, GameSetting, Talk, Vote};
pub use judge::Judge;
pub use meta_info::MetaInfo;
pub use packet::{Packet, Request};
pub use player::{PlayerConfig, PlayerCore};
pub use probabilities::{PriorSource, ProbabilitySource, RoleProbabilities};
pub use role_assign::RoleAssignPlayer;
pub use settings::Settings;
pub use strategy::{Player, RoleStrategy, Strategy, WolfPlay};
pub use talk_queue::TalkQueue;
pub use vote_map::{VoteKind, VoteReasonMap};
pub use vote_request::VoteRequestCounter;
