use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::latest::{LatestFlagsResult, LatestFlagsSource};
use crate::parse::email_domain;
use crate::state::FlightState;

/// Role held by site administrators.
pub const ADMIN_ROLE: &str = "Admins";

/// Status of a flight for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightResult {
    /// The flight's latest status is unknown.
    Unknown,
    /// The flight is known but none of its rules match this user.
    Disabled,
    Enabled,
}

/// Identity attributes a flight is evaluated against.
pub trait FlightUser {
    fn account(&self) -> &str;

    fn email_address(&self) -> Option<&str>;

    fn is_in_role(&self, role: &str) -> bool;
}

/// A plain [`FlightUser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub account: String,
    pub email_address: Option<String>,
    pub roles: BTreeSet<String>,
}

impl User {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email_address = Some(email.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }
}

impl FlightUser for User {
    fn account(&self) -> &str {
        &self.account
    }

    fn email_address(&self) -> Option<&str> {
        self.email_address.as_deref()
    }

    fn is_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Which rule of a flight let a user in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightMatch {
    All,
    Account,
    Domain,
    SiteAdmin,
}

fn match_flight(flight: &FlightState, user: &dyn FlightUser) -> Option<FlightMatch> {
    if flight.enabled_for_all {
        return Some(FlightMatch::All);
    }

    if flight.enabled_accounts.contains(user.account()) {
        return Some(FlightMatch::Account);
    }

    if user
        .email_address()
        .and_then(email_domain)
        .is_some_and(|domain| flight.enabled_domains.contains(domain))
    {
        return Some(FlightMatch::Domain);
    }

    if flight.enabled_for_site_admins && user.is_in_role(ADMIN_ROLE) {
        return Some(FlightMatch::SiteAdmin);
    }

    None
}

/// Answers whether a flight (staged rollout) is enabled for a particular user.
///
/// Neither method blocks or fails. A malformed email address simply doesn't
/// match any domain.
#[derive(Clone)]
pub struct FlightClient {
    flags: Arc<dyn LatestFlagsSource>,
}

impl FlightClient {
    pub fn new(flags: Arc<dyn LatestFlagsSource>) -> Self {
        Self { flags }
    }

    /// Returns `default` when the status is unknown.
    pub fn is_enabled(&self, flight: &str, user: &dyn FlightUser, default: bool) -> bool {
        match self.evaluate(flight, user) {
            FlightResult::Enabled => true,
            FlightResult::Disabled => false,
            FlightResult::Unknown => default,
        }
    }

    pub fn evaluate(&self, flight: &str, user: &dyn FlightUser) -> FlightResult {
        let latest = self.flags.latest_flags();
        let LatestFlagsResult::Ok(flags) = &latest else {
            warn!(
                flight,
                status = %latest.status(),
                "Couldn't determine status of flight as the latest flags aren't ok"
            );
            return FlightResult::Unknown;
        };

        let Some(state) = flags.flight(flight) else {
            warn!(
                flight,
                "Couldn't determine status of flight as it isn't in the latest flags"
            );
            return FlightResult::Unknown;
        };

        match match_flight(state, user) {
            Some(rule) => {
                debug!(flight, account = user.account(), rule = ?rule, "Flight enabled");
                FlightResult::Enabled
            }
            None => FlightResult::Disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_precedence() {
        let user = User::new("Bob")
            .with_email("bob@bob.org")
            .with_role(ADMIN_ROLE);
        let everything = FlightState::for_all()
            .with_account("Bob")
            .with_domain("bob.org")
            .with_site_admins(true);

        assert_eq!(match_flight(&everything, &user), Some(FlightMatch::All));

        let mut rest = everything.clone();
        rest.enabled_for_all = false;
        assert_eq!(match_flight(&rest, &user), Some(FlightMatch::Account));

        rest.enabled_accounts.clear();
        assert_eq!(match_flight(&rest, &user), Some(FlightMatch::Domain));

        rest.enabled_domains.clear();
        assert_eq!(match_flight(&rest, &user), Some(FlightMatch::SiteAdmin));

        rest.enabled_for_site_admins = false;
        assert_eq!(match_flight(&rest, &user), None);
    }

    #[test]
    fn test_admin_role_without_site_admin_rule() {
        let admin = User::new("Root").with_role(ADMIN_ROLE);
        assert_eq!(match_flight(&FlightState::disabled(), &admin), None);
    }

    #[test]
    fn test_account_match_is_case_sensitive() {
        let flight = FlightState::disabled().with_account("Bob");
        assert_eq!(match_flight(&flight, &User::new("bob")), None);
    }

    #[test]
    fn test_domain_match_is_case_sensitive() {
        let flight = FlightState::disabled().with_domain("bob.org");
        let user = User::new("Alice").with_email("alice@BOB.org");
        assert_eq!(match_flight(&flight, &user), None);
    }

    #[test]
    fn test_domain_with_underscore_matches() {
        let flight = FlightState::disabled().with_domain("my_host.org");
        let user = User::new("Alice").with_email("hello@my_host.org");
        assert_eq!(match_flight(&flight, &user), Some(FlightMatch::Domain));
    }

    #[test]
    fn test_missing_email_never_matches_domain() {
        let flight = FlightState::disabled().with_domain("bob.org");
        assert_eq!(match_flight(&flight, &User::new("Alice")), None);
    }
}
