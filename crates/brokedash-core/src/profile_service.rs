//! Input validation and persistence of user submissions.

use tracing::{debug, warn};
use uuid::Uuid;

use brokedash_domain::{IncomeBracket, UserProfile};

use crate::{storage::ProfileStorage, time::Clock, CoreError};

/// Validates and stores user profiles. Ranking is triggered separately.
pub struct ProfileService;

impl ProfileService {
    /// Checks a spend amount for the bracket, clamping it to the bracket cap.
    ///
    /// Negative and non-finite amounts are rejected.
    pub fn normalize_spend(bracket: IncomeBracket, monthly_spend: f64) -> Result<f64, CoreError> {
        if !monthly_spend.is_finite() {
            return Err(CoreError::Validation(
                "monthly spend must be a finite number".into(),
            ));
        }
        if monthly_spend < 0.0 {
            return Err(CoreError::Validation(format!(
                "monthly spend cannot be negative (got {monthly_spend})"
            )));
        }
        let cap = bracket.max_monthly_spend();
        if monthly_spend > cap {
            warn!(
                bracket = %bracket,
                requested = monthly_spend,
                cap,
                "monthly spend above bracket cap, clamping"
            );
            return Ok(cap);
        }
        Ok(monthly_spend)
    }

    /// Parses a free-form amount such as `$1,250.50`.
    pub fn parse_spend(raw: &str) -> Result<f64, CoreError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '_'))
            .collect();
        cleaned
            .parse::<f64>()
            .map_err(|_| CoreError::Validation(format!("`{raw}` is not a valid amount")))
    }

    /// Creates a new profile, or updates the one stored under `id`.
    ///
    /// Timestamps come from `clock`, which also stamps the leaderboard rows
    /// later derived from this profile.
    pub fn submit(
        storage: &dyn ProfileStorage,
        clock: &dyn Clock,
        id: Option<Uuid>,
        bracket: IncomeBracket,
        monthly_spend: f64,
    ) -> Result<UserProfile, CoreError> {
        let spend = Self::normalize_spend(bracket, monthly_spend)?;
        let existing = match id {
            Some(id) => storage.get_profile(id)?,
            None => None,
        };
        let now = clock.now();
        let profile = match (existing, id) {
            (Some(mut profile), _) => {
                profile.update(bracket, spend, now);
                profile
            }
            (None, Some(id)) => UserProfile::stamped(id, bracket, spend, now),
            (None, None) => UserProfile::stamped(Uuid::new_v4(), bracket, spend, now),
        };
        storage.save_profile(&profile)?;
        debug!(profile = %profile.id, bracket = %bracket, spend, "profile saved");
        Ok(profile)
    }

    pub fn get(storage: &dyn ProfileStorage, id: Uuid) -> Result<UserProfile, CoreError> {
        storage.get_profile(id)?.ok_or(CoreError::ProfileNotFound(id))
    }
}
