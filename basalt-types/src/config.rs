//! Configuration types shared by the service and its collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transport protocol a service instance is reachable over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

/// Record announced to service discovery so clients can find this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service name clients look up.
    pub service: String,
    /// `host:port` the service listens on.
    pub host: String,
    /// Protocol served on `host`.
    pub protocol: Protocol,
}

/// Global configuration for the `Basalt` service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasaltConfig {
    /// Name announced to service discovery.
    pub service_name: String,
    /// Host name announced to service discovery.
    pub publish_host: String,
    /// Plain HTTP port, if serving HTTP.
    pub http_port: Option<u16>,
    /// HTTPS port, if serving HTTPS. Preferred over `http_port` when announcing.
    pub https_port: Option<u16>,
    /// Capacity of the channel between the normalizing pump and the consumer.
    pub channel_capacity: usize,
    /// Deadline for each collaborator call made while setting up a view
    /// (authorization, stream lookup, opening the source). `None` disables it.
    pub open_timeout: Option<Duration>,
}

impl Default for BasaltConfig {
    fn default() -> Self {
        Self {
            service_name: "basalt".to_string(),
            publish_host: "localhost".to_string(),
            http_port: None,
            https_port: None,
            channel_capacity: 1024,
            open_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl BasaltConfig {
    /// Discovery record for this instance, or `None` if no port is configured.
    #[must_use]
    pub fn service_descriptor(&self) -> Option<ServiceDescriptor> {
        let (port, protocol) = match (self.https_port, self.http_port) {
            (Some(p), _) => (p, Protocol::Https),
            (None, Some(p)) => (p, Protocol::Http),
            (None, None) => return None,
        };
        Some(ServiceDescriptor {
            service: self.service_name.clone(),
            host: format!("{}:{port}", self.publish_host),
            protocol,
        })
    }
}
