use std::sync::Arc;

use crate::error::FlagsError;
use crate::options::RefreshOptions;
use crate::refresh::RefreshService;
use crate::storage::StorageGateway;

/// Builder for [`RefreshService`]. A gateway is required; options default to
/// [`RefreshOptions::default`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use flagstate_lib::{RefreshOptions, RefreshService};
/// use flagstate_lib::storage::FileStorage;
///
/// let service = RefreshService::builder()
///     .gateway(Arc::new(FileStorage::new("flags.json")))
///     .options(RefreshOptions::default().with_refresh_interval(Duration::from_secs(30)))
///     .build()
///     .unwrap();
/// assert_eq!(service.options().refresh_interval, Duration::from_secs(30));
/// ```
#[derive(Default)]
pub struct RefreshServiceBuilder {
    gateway: Option<Arc<dyn StorageGateway>>,
    options: RefreshOptions,
}

impl RefreshServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gateway(mut self, gateway: Arc<dyn StorageGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn options(mut self, options: RefreshOptions) -> Self {
        self.options = options;
        self
    }

    /// Fails when no gateway was supplied or the options are invalid. These are
    /// wiring mistakes and should stop startup.
    pub fn build(self) -> Result<RefreshService, FlagsError> {
        let gateway = self.gateway.ok_or(FlagsError::MissingGateway)?;
        self.options.validate()?;
        Ok(RefreshService::new(gateway, self.options))
    }
}
