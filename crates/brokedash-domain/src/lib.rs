//! brokedash-domain
//!
//! Pure domain models (UserProfile, IncomeBracket, CategoryDefinition, RankedEntry).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod income;
pub mod profile;
pub mod ranking;

pub use category::*;
pub use common::*;
pub use income::*;
pub use profile::*;
pub use ranking::*;
