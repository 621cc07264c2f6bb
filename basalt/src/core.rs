use std::sync::Arc;
use std::time::Duration;

use basalt_core::{
    AccessControl, BasaltConfig, BasaltError, EventSource, ServiceDescriptor, StreamDirectory,
};

/// Service that serves authorized, normalized views of a subject's device data.
pub struct Basalt {
    pub(crate) source: Arc<dyn EventSource>,
    pub(crate) directory: Arc<dyn StreamDirectory>,
    pub(crate) access: Arc<dyn AccessControl>,
    pub(crate) cfg: BasaltConfig,
}

/// Builder for constructing a `Basalt` service with custom configuration.
pub struct BasaltBuilder {
    source: Option<Arc<dyn EventSource>>,
    directory: Option<Arc<dyn StreamDirectory>>,
    access: Option<Arc<dyn AccessControl>>,
    cfg: BasaltConfig,
}

impl Default for BasaltBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BasaltBuilder {
    /// Create a new builder with default configuration.
    ///
    /// All three collaborators (source, directory, access control) must be
    /// registered before [`build`](Self::build) succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            directory: None,
            access: None,
            cfg: BasaltConfig::default(),
        }
    }

    /// Register the storage collaborator events are read from.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Register the directory that maps subjects to their upload stream.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn StreamDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Register the access-control collaborator consulted before every view.
    #[must_use]
    pub fn with_access(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = Some(access);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: BasaltConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Capacity of the channel returned by `stream_view`.
    ///
    /// A full channel pauses the pump (and with it the read from storage)
    /// until the consumer catches up.
    #[must_use]
    pub const fn channel_capacity(mut self, capacity: usize) -> Self {
        self.cfg.channel_capacity = capacity;
        self
    }

    /// Deadline for each collaborator call made while opening a view.
    ///
    /// Applies separately to authorization, stream lookup and opening the
    /// source; reading the opened stream is never timed out.
    #[must_use]
    pub const fn open_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.open_timeout = Some(timeout);
        self
    }

    /// Disable the collaborator deadline.
    #[must_use]
    pub const fn no_open_timeout(mut self) -> Self {
        self.cfg.open_timeout = None;
        self
    }

    /// Name announced to service discovery.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.cfg.service_name = name.into();
        self
    }

    /// Host announced to service discovery.
    #[must_use]
    pub fn publish_host(mut self, host: impl Into<String>) -> Self {
        self.cfg.publish_host = host.into();
        self
    }

    /// Plain HTTP port.
    #[must_use]
    pub const fn http_port(mut self, port: u16) -> Self {
        self.cfg.http_port = Some(port);
        self
    }

    /// HTTPS port; announced in preference to the HTTP port.
    #[must_use]
    pub const fn https_port(mut self, port: u16) -> Self {
        self.cfg.https_port = Some(port);
        self
    }

    /// Build the `Basalt` service.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a collaborator is missing or the channel
    /// capacity is zero.
    pub fn build(self) -> Result<Basalt, BasaltError> {
        let missing = |what: &str| {
            BasaltError::InvalidArg(format!("no {what} registered; add one via with_{what}(...)"))
        };
        let source = self.source.ok_or_else(|| missing("source"))?;
        let directory = self.directory.ok_or_else(|| missing("directory"))?;
        let access = self.access.ok_or_else(|| missing("access"))?;

        if self.cfg.channel_capacity == 0 {
            return Err(BasaltError::InvalidArg(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Basalt {
            source,
            directory,
            access,
            cfg: self.cfg,
        })
    }
}

impl Basalt {
    /// Start building a new `Basalt` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use basalt_mock::{MockAccess, MockDirectory, MockStore};
    ///
    /// let basalt = basalt::Basalt::builder()
    ///     .with_source(Arc::new(MockStore::with_fixtures()))
    ///     .with_directory(Arc::new(MockDirectory::new().with("alice", "upload-pump-day")))
    ///     .with_access(Arc::new(MockAccess::new()))
    ///     .https_port(8443)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> BasaltBuilder {
        BasaltBuilder::new()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &BasaltConfig {
        &self.cfg
    }

    /// Discovery record for this instance, if a port is configured.
    #[must_use]
    pub fn service_descriptor(&self) -> Option<ServiceDescriptor> {
        self.cfg.service_descriptor()
    }

    /// Liveness check.
    ///
    /// # Errors
    /// Never fails today; the `Result` leaves room for readiness checks.
    pub const fn status(&self) -> Result<(), BasaltError> {
        Ok(())
    }

    /// Wrap a collaborator future with the configured deadline.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "basalt::core::call_with_timeout",
            skip(fut),
            fields(
                capability = capability,
                timeout_ms = timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            ),
        )
    )]
    pub(crate) async fn call_with_timeout<T, Fut>(
        capability: &'static str,
        timeout: Option<Duration>,
        fut: Fut,
    ) -> Result<T, BasaltError>
    where
        Fut: core::future::Future<Output = Result<T, BasaltError>>,
    {
        match timeout {
            Some(timeout) => (tokio::time::timeout(timeout, fut).await)
                .unwrap_or_else(|_| Err(BasaltError::timeout(capability))),
            None => fut.await,
        }
    }
}
