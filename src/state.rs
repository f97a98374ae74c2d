use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::FlagsError;

/// Stored status of a feature.
///
/// Anything other than `Enabled`/`Disabled` is kept as `Unrecognized` instead of
/// failing the whole snapshot, so newer writers can't break older readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureStatus {
    Enabled,
    Disabled,
    Unrecognized(String),
}

impl From<String> for FeatureStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Enabled" => FeatureStatus::Enabled,
            "Disabled" => FeatureStatus::Disabled,
            _ => FeatureStatus::Unrecognized(value),
        }
    }
}

impl From<FeatureStatus> for String {
    fn from(status: FeatureStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureStatus::Enabled => write!(f, "Enabled"),
            FeatureStatus::Disabled => write!(f, "Disabled"),
            FeatureStatus::Unrecognized(other) => write!(f, "{other}"),
        }
    }
}

/// Rollout rule for a flight. A user is enabled if any of the predicates match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightState {
    /// Enabled for every user.
    #[serde(rename = "All")]
    pub enabled_for_all: bool,
    /// Enabled for users in the administrator role.
    #[serde(rename = "SiteAdmins")]
    pub enabled_for_site_admins: bool,
    /// Account identifiers, matched exactly.
    #[serde(rename = "Accounts")]
    pub enabled_accounts: BTreeSet<String>,
    /// Email domains, matched exactly against the host part of the address.
    #[serde(rename = "Domains")]
    pub enabled_domains: BTreeSet<String>,
}

impl FlightState {
    pub fn new<A, D>(all: bool, site_admins: bool, accounts: A, domains: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            enabled_for_all: all,
            enabled_for_site_admins: site_admins,
            enabled_accounts: accounts.into_iter().map(Into::into).collect(),
            enabled_domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// A flight that matches nobody.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn for_all() -> Self {
        Self {
            enabled_for_all: true,
            ..Self::default()
        }
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.enabled_accounts.insert(account.to_string());
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.enabled_domains.insert(domain.to_string());
        self
    }

    pub fn with_site_admins(mut self, enabled: bool) -> Self {
        self.enabled_for_site_admins = enabled;
        self
    }
}

/// One immutable generation of feature and flight configuration.
///
/// A refresh never edits an existing `FlagState`; it publishes a new one.
/// Readers share it as `Arc<FlagState>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    #[serde(rename = "Features", default)]
    features: BTreeMap<String, FeatureStatus>,
    #[serde(rename = "Flights", default)]
    flights: BTreeMap<String, FlightState>,
}

impl FlagState {
    pub fn builder() -> FlagStateBuilder {
        FlagStateBuilder::default()
    }

    /// A state with no features and no flights.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the stored JSON form:
    /// `{"Features": {..}, "Flights": {"name": {"All": .., "SiteAdmins": .., "Accounts": [..], "Domains": [..]}}}`
    pub fn from_json(content: &[u8]) -> Result<Self, FlagsError> {
        let state: FlagState = serde_json::from_slice(content)
            .map_err(|e| FlagsError::InvalidState(format!("malformed JSON: {e}")))?;
        state.validate()?;
        Ok(state)
    }

    pub fn to_json_pretty(&self) -> String {
        // Maps of strings and plain structs always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Hex SHA-1 of the canonical JSON form. Stable across processes since all
    /// collections are ordered.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha1::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }

    pub fn features(&self) -> &BTreeMap<String, FeatureStatus> {
        &self.features
    }

    pub fn flights(&self) -> &BTreeMap<String, FlightState> {
        &self.flights
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureStatus> {
        self.features.get(name)
    }

    pub fn flight(&self, name: &str) -> Option<&FlightState> {
        self.flights.get(name)
    }

    fn validate(&self) -> Result<(), FlagsError> {
        if self.features.keys().any(|name| name.is_empty()) {
            return Err(FlagsError::InvalidState("empty feature name".into()));
        }
        if self.flights.keys().any(|name| name.is_empty()) {
            return Err(FlagsError::InvalidState("empty flight name".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FlagStateBuilder {
    features: BTreeMap<String, FeatureStatus>,
    flights: BTreeMap<String, FlightState>,
}

impl FlagStateBuilder {
    pub fn with_feature(mut self, name: &str, status: FeatureStatus) -> Self {
        self.features.insert(name.to_string(), status);
        self
    }

    pub fn with_flight(mut self, name: &str, flight: FlightState) -> Self {
        self.flights.insert(name.to_string(), flight);
        self
    }

    pub fn build(self) -> Result<FlagState, FlagsError> {
        let state = FlagState {
            features: self.features,
            flights: self.flights,
        };
        state.validate()?;
        Ok(state)
    }
}
