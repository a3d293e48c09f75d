use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Answers whether the model endpoint is worth calling at all.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_available(&self) -> bool;
}

/// Opens (and drops) a TCP connection to the endpoint's host.
#[derive(Debug, Clone)]
pub struct HostProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HostProbe {
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid model endpoint {}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(format!("Model endpoint has no host: {}", endpoint)))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(443);
        Ok(Self {
            host,
            port,
            timeout: PROBE_TIMEOUT,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[async_trait]
impl ConnectivityProbe for HostProbe {
    async fn is_available(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!(host = %self.host, port = self.port, error = %e, "model endpoint unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(host = %self.host, port = self.port, "connectivity probe timed out");
                false
            }
        }
    }
}

/// Fixed answer, for offline setups and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

#[async_trait]
impl ConnectivityProbe for StaticConnectivity {
    async fn is_available(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_targets_endpoint_host_and_port() {
        let probe = HostProbe::for_endpoint(crate::config::DEFAULT_GEMINI_ENDPOINT).unwrap();
        assert_eq!(probe.host(), "generativelanguage.googleapis.com");
        assert_eq!(probe.port(), 443);

        let local = HostProbe::for_endpoint("http://127.0.0.1:8089/generate").unwrap();
        assert_eq!(local.host(), "127.0.0.1");
        assert_eq!(local.port(), 8089);
    }

    #[test]
    fn malformed_endpoint_is_a_config_error() {
        assert!(matches!(
            HostProbe::for_endpoint("not a url"),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn listening_socket_counts_as_available() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let probe = HostProbe::for_endpoint(&format!("http://{}/", addr)).unwrap();
        assert!(probe.is_available().await);

        drop(listener);
        assert!(!probe.is_available().await);
    }
}
