//! Public address sources
//!
//! STUN and HTTP lookups are interchangeable implementations of one
//! capability; which one runs is decided by configuration.

use super::http_ip::discover_public_ip_via_http;
use super::stun::discover_public_ip_via_stun;
use super::types::{DetectionError, PublicIpMethod};
use crate::config::Settings;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Something that can tell us our externally visible IPv4 address
#[async_trait]
pub trait PublicAddressSource: Send + Sync {
    /// Perform the lookup once
    async fn discover(&self) -> Result<Ipv4Addr, DetectionError>;

    /// Lookup method
    fn method(&self) -> PublicIpMethod;

    /// Server or URL queried
    fn endpoint(&self) -> &str;
}

/// STUN Binding Request against a single server
#[derive(Debug, Clone)]
pub struct StunSource {
    server: String,
    timeout: Duration,
}

impl StunSource {
    /// Create a source for `server` (`host:port`)
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PublicAddressSource for StunSource {
    async fn discover(&self) -> Result<Ipv4Addr, DetectionError> {
        discover_public_ip_via_stun(&self.server, self.timeout).await
    }

    fn method(&self) -> PublicIpMethod {
        PublicIpMethod::Stun
    }

    fn endpoint(&self) -> &str {
        &self.server
    }
}

/// GET against a plain-text IP-echo service
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    /// Create a source for `url`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PublicAddressSource for HttpSource {
    async fn discover(&self) -> Result<Ipv4Addr, DetectionError> {
        discover_public_ip_via_http(&self.url, self.timeout).await
    }

    fn method(&self) -> PublicIpMethod {
        PublicIpMethod::Http
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Build the source selected by `settings`
pub fn public_source_from_settings(settings: &Settings) -> Box<dyn PublicAddressSource> {
    let timeout = settings.timeout();
    match settings.method {
        PublicIpMethod::Stun => Box::new(StunSource::new(settings.stun_server.clone(), timeout)),
        PublicIpMethod::Http => Box::new(HttpSource::new(settings.http_endpoint.clone(), timeout)),
    }
}
