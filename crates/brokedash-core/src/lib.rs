//! brokedash-core
//!
//! Ranking engine and services for brokedash.
//! Depends on brokedash-domain. No CLI, no terminal I/O, no direct file access.

pub mod error;
pub mod leaderboard_service;
pub mod memory_storage;
pub mod profile_service;
pub mod public_api;
pub mod ranking_engine;
pub mod stats_service;
pub mod storage;
pub mod time;

pub use error::CoreError;
pub use leaderboard_service::*;
pub use memory_storage::InMemoryProfileStorage;
pub use profile_service::*;
pub use ranking_engine::*;
pub use stats_service::*;
pub use storage::ProfileStorage;
pub use time::{Clock, FixedClock, SystemClock};
