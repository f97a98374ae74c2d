//! Feature flags and flights evaluated against a continuously refreshed snapshot.
//!
//! A [`RefreshService`] pulls the full [`FlagState`] from a
//! [`storage::StorageGateway`] on a fixed interval and publishes it atomically.
//! [`FeatureFlagClient`] and [`FlightClient`] read the latest snapshot without
//! ever blocking or failing: if the flags are missing, stale or don't know the
//! name asked about, the answer is `Unknown` and the caller's default applies.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//!
//! use flagstate_lib::storage::MemoryStorage;
//! use flagstate_lib::{
//!     FeatureFlagClient, FeatureStatus, FlagState, FlightClient, FlightState, RefreshService,
//!     User,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let flags = FlagState::builder()
//!     .with_feature("Search.NewRanking", FeatureStatus::Enabled)
//!     .with_flight("Gallery.Preview", FlightState::disabled().with_domain("example.org"))
//!     .build()
//!     .unwrap();
//!
//! let service = Arc::new(
//!     RefreshService::builder()
//!         .gateway(Arc::new(MemoryStorage::with_state(flags)))
//!         .build()
//!         .unwrap(),
//! );
//! service.refresh_once().await.unwrap();
//!
//! let features = FeatureFlagClient::new(service.clone());
//! assert!(features.is_enabled("Search.NewRanking", false));
//!
//! let flights = FlightClient::new(service);
//! let user = User::new("alice").with_email("alice@example.org");
//! assert!(flights.is_enabled("Gallery.Preview", &user, false));
//! # });
//! ```

pub mod builder;
pub mod error;
pub mod feature;
pub mod flight;
pub mod latest;
pub mod options;
pub mod parse;
pub mod refresh;
pub mod state;
pub mod storage;

pub use builder::RefreshServiceBuilder;
pub use error::{FlagsError, StorageError};
pub use feature::{FeatureFlagClient, FeatureResult};
pub use flight::{FlightClient, FlightResult, FlightUser, User, ADMIN_ROLE};
pub use latest::{LatestFlagsResult, LatestFlagsSource, LatestFlagsStatus};
pub use options::RefreshOptions;
pub use refresh::{RefreshOutcome, RefreshService};
pub use state::{FeatureStatus, FlagState, FlagStateBuilder, FlightState};
pub use tokio_util::sync::CancellationToken;
