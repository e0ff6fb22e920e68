use super::walk::{WalkPage, WalkRequest};
use super::ManagementTransport;
use crate::discovery::Target;
use crate::error::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// Walk transport over HTTP
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// `timeout` bounds each request at the connection level; the session
    /// applies its own per-request deadline on top.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { http_client })
    }

    fn endpoint(target: &Target) -> String {
        format!("{}/walk", target.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ManagementTransport for HttpTransport {
    async fn walk(
        &self,
        target: &Target,
        request: &WalkRequest,
    ) -> Result<WalkPage, TransportError> {
        let url = Self::endpoint(target);
        log::debug!("POST {} root={} cursor={:?}", url, request.root, request.cursor);

        let mut builder = self
            .http_client
            .post(&url)
            .header("Content-Type", "text/xml; charset=\"utf-8\"")
            .body(request.to_xml());
        if let Some(community) = &target.credentials.community {
            builder = builder.header("X-Community", community);
        }
        if let Some(token) = &target.credentials.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Agents report faults with an error status and a fault document
            if let Err(fault @ TransportError::Fault(_)) = WalkPage::from_xml(&body) {
                return Err(fault);
            }
            return Err(TransportError::Http(format!(
                "{} answered with status {}",
                url, status
            )));
        }

        WalkPage::from_xml(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let target = Target::new("leaf-01", "http://10.0.0.1:8161/");
        assert_eq!(HttpTransport::endpoint(&target), "http://10.0.0.1:8161/walk");
    }

    #[test]
    fn test_new_builds_client() {
        assert!(HttpTransport::new(Duration::from_secs(1)).is_ok());
    }
}
