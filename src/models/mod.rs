//! Data models for the stats dashboard.

mod item;
pub mod session;
mod stats;
mod user;

pub use item::{Item, Items};
pub use session::TokenGrant;
pub use stats::{
    is_scratch_game, CommandStat, GambleGameStats, GameRecord, ItemStat, LeaderboardStanding,
    ScratchGameStats, SCRATCH_GAME_MARKER,
};
pub use user::{BaseUserData, DiscordIdentity, Session, UserData};
