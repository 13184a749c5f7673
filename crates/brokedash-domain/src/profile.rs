//! User financial profiles as submitted through the input form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::income::IncomeBracket;

/// Anonymous spend record owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub income_bracket: IncomeBracket,
    pub monthly_spend: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(income_bracket: IncomeBracket, monthly_spend: f64) -> Self {
        Self::with_id(Uuid::new_v4(), income_bracket, monthly_spend)
    }

    pub fn with_id(id: Uuid, income_bracket: IncomeBracket, monthly_spend: f64) -> Self {
        Self::stamped(id, income_bracket, monthly_spend, Utc::now())
    }

    /// Builds a profile created and last updated at `at`.
    pub fn stamped(
        id: Uuid,
        income_bracket: IncomeBracket,
        monthly_spend: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            income_bracket,
            monthly_spend,
            created_at: at,
            updated_at: at,
        }
    }

    /// Replaces the editable fields and moves `updated_at` to `at`.
    pub fn update(&mut self, income_bracket: IncomeBracket, monthly_spend: f64, at: DateTime<Utc>) {
        self.income_bracket = income_bracket;
        self.monthly_spend = monthly_spend;
        self.updated_at = at.max(self.created_at);
    }
}
