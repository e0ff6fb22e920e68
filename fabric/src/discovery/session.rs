use super::target::{DeviceKind, Target};
use crate::config::SweepConfig;
use crate::error::TransportError;
use crate::models::NodeType;
use crate::normalize::mib;
use crate::transport::{ManagementTransport, Observation, Oid, WalkPage, WalkRequest};
use log::{debug, warn};

/// Everything polled from one host
#[derive(Debug, Clone)]
pub struct PolledHost {
    pub node_type: NodeType,
    pub observations: Vec<Observation>,
    pub requests: usize,
    /// Items the agent sent that could not be decoded
    pub malformed: usize,
    /// Subtrees that failed after the host had answered
    pub skipped_subtrees: usize,
}

/// Polls one host, one outstanding request at a time
pub struct HostSession<'a> {
    target: &'a Target,
    transport: &'a dyn ManagementTransport,
    config: &'a SweepConfig,
    requests: usize,
    malformed: usize,
    skipped: usize,
}

impl<'a> HostSession<'a> {
    pub fn new(
        target: &'a Target,
        transport: &'a dyn ManagementTransport,
        config: &'a SweepConfig,
    ) -> Self {
        Self {
            target,
            transport,
            config,
            requests: 0,
            malformed: 0,
            skipped: 0,
        }
    }

    /// Walk every subtree the host's kind calls for
    ///
    /// Failure of the system group means the host is unreachable. Later
    /// subtrees are best-effort: a failure is logged and the subtree skipped.
    pub async fn poll(mut self) -> Result<PolledHost, TransportError> {
        let mut observations = self.walk_subtree(mib::SYSTEM).await?;

        let lldp_local = match self.target.kind {
            DeviceKind::Host => Vec::new(),
            DeviceKind::Switch | DeviceKind::Auto => self.optional_subtree(mib::LLDP_LOCAL).await,
        };
        let node_type = match self.target.kind {
            DeviceKind::Switch => NodeType::Switch,
            DeviceKind::Host => NodeType::Host,
            DeviceKind::Auto if lldp_local.is_empty() => NodeType::Host,
            DeviceKind::Auto => NodeType::Switch,
        };
        debug!("{} polled as {}", self.target.name, node_type);
        observations.extend(lldp_local);

        if node_type == NodeType::Switch {
            observations.extend(self.optional_subtree(mib::LLDP_REMOTE).await);
        }
        observations.extend(self.optional_subtree(mib::IF_TABLE).await);
        observations.extend(self.optional_subtree(mib::IFX_TABLE).await);
        if node_type == NodeType::Switch {
            for column in mib::ENT_INVENTORY_COLUMNS {
                let mut root = mib::ENT_PHYSICAL_ENTRY.to_vec();
                root.push(*column);
                observations.extend(self.optional_column(&root).await);
            }
        }

        Ok(PolledHost {
            node_type,
            observations,
            requests: self.requests,
            malformed: self.malformed,
            skipped_subtrees: self.skipped,
        })
    }

    async fn optional_subtree(&mut self, root: &[u32]) -> Vec<Observation> {
        match self.walk_subtree(root).await {
            Ok(observations) => observations,
            Err(e) => {
                warn!(
                    "{}: skipping subtree {}: {}",
                    self.target.name,
                    Oid::from_slice(root),
                    e
                );
                self.skipped += 1;
                Vec::new()
            }
        }
    }

    /// First `inventory_cap` entries of one table column, single page
    async fn optional_column(&mut self, root: &[u32]) -> Vec<Observation> {
        let request = WalkRequest::new(Oid::from_slice(root), self.config.inventory_cap);
        match self.request(&request).await {
            Ok(page) => self.keep_in_subtree(root, page),
            Err(e) => {
                warn!(
                    "{}: skipping inventory column {}: {}",
                    self.target.name, request.root, e
                );
                self.skipped += 1;
                Vec::new()
            }
        }
    }

    /// Walk a subtree to the end, following continuation cursors
    pub async fn walk_subtree(&mut self, root: &[u32]) -> Result<Vec<Observation>, TransportError> {
        let mut request = WalkRequest::new(Oid::from_slice(root), self.config.max_repetitions);
        let mut observations = Vec::new();
        let mut pages = 0;

        loop {
            let page = self.request(&request).await?;
            pages += 1;
            let next = page.next.clone();
            observations.extend(self.keep_in_subtree(root, page));

            let Some(next) = next else { break };
            if let Some(previous) = &request.cursor {
                if next <= *previous {
                    return Err(TransportError::Malformed(format!(
                        "walk of {} did not advance past {}",
                        request.root, previous
                    )));
                }
            }
            if !next.starts_with(root) {
                break;
            }
            if pages >= self.config.max_pages_per_walk {
                warn!(
                    "{}: walk of {} truncated after {} pages",
                    self.target.name, request.root, pages
                );
                break;
            }
            request = request.resume(next);
        }

        debug!(
            "{}: walked {} in {} pages, {} items",
            self.target.name,
            request.root,
            pages,
            observations.len()
        );
        Ok(observations)
    }

    fn keep_in_subtree(&mut self, root: &[u32], page: WalkPage) -> Vec<Observation> {
        self.malformed += page.malformed;
        page.observations
            .into_iter()
            .filter(|o| o.oid.starts_with(root) && !o.value.is_exception())
            .collect()
    }

    /// One page with a deadline, retrying with linear backoff
    async fn request(&mut self, request: &WalkRequest) -> Result<WalkPage, TransportError> {
        let mut attempt = 0;
        loop {
            self.requests += 1;
            let result = match tokio::time::timeout(
                self.config.request_timeout,
                self.transport.walk(self.target, request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(format!(
                    "no answer from {} within {:?}",
                    self.target.name, self.config.request_timeout
                ))),
            };

            match result {
                Ok(page) => return Ok(page),
                Err(e) if attempt < self.config.retry_attempts && is_retryable(&e) => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff * attempt;
                    debug!(
                        "{}: attempt {} failed ({}), retrying in {:?}",
                        self.target.name, attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Faults and decoding errors repeat on retry; transport failures may not
fn is_retryable(err: &TransportError) -> bool {
    matches!(err, TransportError::Timeout(_) | TransportError::Http(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ObservationValue, ReplayTransport};
    use std::time::Duration;

    fn observation(oid: &str, text: &str) -> Observation {
        Observation::new(
            oid.parse().unwrap(),
            ObservationValue::OctetString(text.to_string()),
        )
    }

    fn config() -> SweepConfig {
        SweepConfig {
            max_repetitions: 2,
            retry_backoff: Duration::from_millis(1),
            ..SweepConfig::minimal()
        }
    }

    #[tokio::test]
    async fn test_walk_follows_continuation() {
        let observations: Vec<Observation> = (1..=5)
            .map(|i| observation(&format!("1.3.6.1.2.1.2.2.1.2.{}", i), "x"))
            .chain(std::iter::once(observation("1.3.6.1.2.1.31.1.1.1.1.1", "y")))
            .collect();
        let transport = ReplayTransport::new().with_agent("h", observations);
        let target = Target::new("h", "http://h");
        let config = config();

        let mut session = HostSession::new(&target, &transport, &config);
        let walked = session.walk_subtree(mib::IF_TABLE).await.unwrap();
        assert_eq!(walked.len(), 5);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_page_cap_truncates_walk() {
        let observations: Vec<Observation> = (1..=10)
            .map(|i| observation(&format!("1.3.6.1.2.1.2.2.1.2.{}", i), "x"))
            .collect();
        let transport = ReplayTransport::new().with_agent("h", observations);
        let target = Target::new("h", "http://h");
        let config = SweepConfig {
            max_pages_per_walk: 2,
            ..config()
        };

        let mut session = HostSession::new(&target, &transport, &config);
        let walked = session.walk_subtree(mib::IF_TABLE).await.unwrap();
        assert_eq!(walked.len(), 4);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let transport = ReplayTransport::new().with_flaky_agent(
            "h",
            2,
            vec![observation("1.3.6.1.2.1.1.5.0", "node-1")],
        );
        let target = Target::new("h", "http://h");
        let config = SweepConfig {
            retry_attempts: 2,
            ..config()
        };

        let mut session = HostSession::new(&target, &transport, &config);
        let walked = session.walk_subtree(mib::SYSTEM).await.unwrap();
        assert_eq!(walked.len(), 1);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let transport = ReplayTransport::new().with_unreachable("h");
        let target = Target::new("h", "http://h");
        let config = config();

        let mut session = HostSession::new(&target, &transport, &config);
        let err = session.walk_subtree(mib::SYSTEM).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
        assert_eq!(transport.request_count(), 1 + config.retry_attempts as usize);
    }

    #[tokio::test]
    async fn test_faults_are_not_retried() {
        let transport = ReplayTransport::new().with_fault("h", "authorization failed");
        let target = Target::new("h", "http://h");
        let config = config();

        let mut session = HostSession::new(&target, &transport, &config);
        let err = session.walk_subtree(mib::SYSTEM).await.unwrap_err();
        assert!(matches!(err, TransportError::Fault(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_deadline() {
        let transport = ReplayTransport::new()
            .with_agent("h", vec![observation("1.3.6.1.2.1.1.5.0", "node-1")])
            .with_delay(Duration::from_secs(30));
        let target = Target::new("h", "http://h");
        let config = SweepConfig {
            retry_attempts: 0,
            ..config()
        };

        let mut session = HostSession::new(&target, &transport, &config);
        let err = session.walk_subtree(mib::SYSTEM).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_auto_kind_without_lldp_is_host() {
        let transport = ReplayTransport::new().with_agent(
            "h",
            vec![
                observation("1.3.6.1.2.1.1.5.0", "node-1"),
                observation("1.3.6.1.2.1.2.2.1.2.1", "eth0"),
            ],
        );
        let target = Target::new("h", "http://h");
        let config = config();

        let polled = HostSession::new(&target, &transport, &config)
            .poll()
            .await
            .unwrap();
        assert_eq!(polled.node_type, NodeType::Host);
        assert_eq!(polled.observations.len(), 2);
        assert_eq!(polled.skipped_subtrees, 0);
    }
}
