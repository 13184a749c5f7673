#![doc(test(attr(deny(warnings))))]

//! brokedash ranks people by how fast they burn through their income and
//! ships the interactive shell used to submit profiles and browse the
//! leaderboard.

pub mod cli;
pub mod errors;
pub mod utils;

pub use brokedash_config as config;
pub use brokedash_core as core;
pub use brokedash_domain as domain;
pub use brokedash_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("brokedash tracing initialized.");
    });
}
