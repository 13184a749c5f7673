//! Income brackets and their representative annual figures.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// Representative annual income of the top bracket; scores are normalised against it.
pub const CEILING_INCOME: f64 = 300_000.0;

/// Fixed enumeration of self-reported income brackets.
///
/// The bracket is only used to pick a representative annual income for
/// scoring. Unknown labels resolve to [`IncomeBracket::Under100k`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum IncomeBracket {
    #[default]
    Under100k,
    From100kTo150k,
    From150kTo250k,
    Over250k,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 4] = [
        IncomeBracket::Under100k,
        IncomeBracket::From100kTo150k,
        IncomeBracket::From150kTo250k,
        IncomeBracket::Over250k,
    ];

    /// Annual income used for scoring and runway projections.
    pub fn annual_income(self) -> f64 {
        match self {
            IncomeBracket::Under100k => 75_000.0,
            IncomeBracket::From100kTo150k => 125_000.0,
            IncomeBracket::From150kTo250k => 200_000.0,
            IncomeBracket::Over250k => 300_000.0,
        }
    }

    /// Highest monthly spend accepted for the bracket.
    pub fn max_monthly_spend(self) -> f64 {
        match self {
            IncomeBracket::Under100k => 8_333.0,
            IncomeBracket::From100kTo150k => 12_500.0,
            IncomeBracket::From150kTo250k | IncomeBracket::Over250k => 20_833.0,
        }
    }

    /// Storage label, e.g. `100k-150k`.
    pub fn label(self) -> &'static str {
        match self {
            IncomeBracket::Under100k => "<100k",
            IncomeBracket::From100kTo150k => "100k-150k",
            IncomeBracket::From150kTo250k => "150k-250k",
            IncomeBracket::Over250k => "250k+",
        }
    }

    /// Parses a storage label, falling back to the lowest bracket.
    pub fn from_label(value: &str) -> Self {
        Self::parse_label(value).unwrap_or_default()
    }

    /// Parses a storage label, returning `None` for anything unrecognised.
    pub fn parse_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('$', "");
        match normalized.as_str() {
            "<100k" => Some(IncomeBracket::Under100k),
            "100k-150k" => Some(IncomeBracket::From100kTo150k),
            "150k-250k" => Some(IncomeBracket::From150kTo250k),
            "250k+" => Some(IncomeBracket::Over250k),
            _ => None,
        }
    }

    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| Self::from_label(&v))
            .unwrap_or_default()
    }
}

impl fmt::Display for IncomeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for IncomeBracket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for IncomeBracket {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(IncomeBracket::from_value(value))
    }
}
