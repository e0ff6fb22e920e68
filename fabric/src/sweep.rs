//! Sweep orchestration
//!
//! A sweep polls every configured target concurrently, commits each
//! device record to the store as its host finishes, and once all hosts are
//! done resolves links in a single pass.

use crate::config::SweepConfig;
use crate::discovery::{poll_host, HostOutcome, HostStatus};
use crate::error::{FabricError, Result};
use crate::models::NodeGuid;
use crate::normalize::DeviceRecord;
use crate::resolve::{resolve_links, ResolveReport};
use crate::store::FabricStore;
use crate::transport::{HttpTransport, ManagementTransport};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use uuid::Uuid;

/// Identifier of one sweep, for correlating its log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepId(Uuid);

impl SweepId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SweepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall result of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    Complete,
    /// Some host failed, a record was rejected or a link endpoint was not found
    PartiallyProcessed,
    /// No host produced a record
    NoData,
}

impl fmt::Display for SweepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepStatus::Complete => write!(f, "complete"),
            SweepStatus::PartiallyProcessed => write!(f, "partially processed"),
            SweepStatus::NoData => write!(f, "no data"),
        }
    }
}

/// What happened to one target
#[derive(Debug, Clone)]
pub struct HostReport {
    pub target: String,
    pub status: HostStatus,
    pub node: Option<NodeGuid>,
    pub observations: usize,
    pub warnings: usize,
    pub ports_added: usize,
    pub ports_rejected: usize,
    pub elapsed: Duration,
}

impl HostReport {
    fn from_outcome(outcome: &HostOutcome) -> Self {
        Self {
            target: outcome.target.clone(),
            status: outcome.status.clone(),
            node: None,
            observations: outcome.observations,
            warnings: outcome.warnings,
            ports_added: 0,
            ports_rejected: 0,
            elapsed: outcome.elapsed,
        }
    }

    /// A target whose polling task ended without an outcome
    fn failed(target: &str, reason: String) -> Self {
        Self {
            target: target.to_string(),
            status: HostStatus::Failed(reason),
            node: None,
            observations: 0,
            warnings: 0,
            ports_added: 0,
            ports_rejected: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Summary of a finished sweep
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub id: SweepId,
    pub status: SweepStatus,
    /// One entry per target, ordered by target name
    pub hosts: Vec<HostReport>,
    pub warnings: usize,
    pub errors: usize,
    pub links: ResolveReport,
    pub node_count: usize,
    pub port_count: usize,
    pub elapsed: Duration,
}

impl SweepReport {
    pub fn active_hosts(&self) -> usize {
        self.hosts.iter().filter(|h| h.status.is_active()).count()
    }

    pub fn failed_hosts(&self) -> impl Iterator<Item = &HostReport> {
        self.hosts.iter().filter(|h| !h.status.is_active())
    }

    pub fn host(&self, target: &str) -> Option<&HostReport> {
        self.hosts.iter().find(|h| h.target == target)
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sweep {} {}: {}/{} hosts, {} nodes, {} ports, {}, {} warnings, {} errors in {:.2?}",
            self.id,
            self.status,
            self.active_hosts(),
            self.hosts.len(),
            self.node_count,
            self.port_count,
            self.links,
            self.warnings,
            self.errors,
            self.elapsed
        )
    }
}

/// The populated store and how it was built
#[derive(Debug)]
pub struct SweepOutcome {
    pub store: FabricStore,
    pub report: SweepReport,
}

/// One discovery sweep over the configured targets
pub struct Sweep {
    config: Arc<SweepConfig>,
    transport: Arc<dyn ManagementTransport>,
    store: FabricStore,
}

impl fmt::Debug for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sweep")
            .field("targets", &self.config.targets.len())
            .field("transport", &self.transport.name())
            .field("store_nodes", &self.store.node_count())
            .finish()
    }
}

impl Sweep {
    /// Create a sweep that polls over HTTP
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate().map_err(FabricError::Configuration)?;
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            store: FabricStore::new(),
        })
    }

    /// Poll through another transport
    pub fn with_transport(mut self, transport: Arc<dyn ManagementTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Start from a populated store instead of an empty one
    pub fn with_store(mut self, store: FabricStore) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Poll every target, then resolve links
    ///
    /// Fails only when there is nothing to poll. Host failures, rejected
    /// records and unresolved links are reflected in the report status.
    pub async fn run(self) -> Result<SweepOutcome> {
        if self.config.targets.is_empty() {
            return Err(FabricError::NoTargets);
        }

        let started = Instant::now();
        let id = SweepId::new();
        info!(
            "Sweep {} started: {} targets over {}, at most {} at a time",
            id,
            self.config.targets.len(),
            self.transport.name(),
            self.config.max_concurrent_hosts
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_hosts));
        let mut tasks = JoinSet::new();
        let mut task_targets: HashMap<task::Id, String> = HashMap::new();
        for target in self.config.targets.iter().cloned() {
            let name = target.name.clone();
            let transport = Arc::clone(&self.transport);
            let config = Arc::clone(&self.config);
            let semaphore = Arc::clone(&semaphore);
            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                poll_host(&target, transport.as_ref(), &config).await
            });
            task_targets.insert(handle.id(), name);
        }

        let mut store = self.store;
        let mut records: Vec<DeviceRecord> = Vec::new();
        let mut hosts = Vec::with_capacity(self.config.targets.len());
        let mut warnings = 0;
        let mut errors = 0;
        let mut degraded = false;

        while let Some(joined) = tasks.join_next().await {
            let mut outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    let target = task_targets.remove(&e.id()).unwrap_or_default();
                    let reason = FabricError::from(e).to_string();
                    error!("Sweep {}: polling {} failed: {}", id, target, reason);
                    errors += 1;
                    degraded = true;
                    hosts.push(HostReport::failed(&target, reason));
                    continue;
                }
            };

            let mut host = HostReport::from_outcome(&outcome);
            warnings += outcome.warnings;
            if let Some(record) = outcome.record.take() {
                match record.commit(&mut store, self.config.address_conflict) {
                    Ok(commit) => {
                        host.node = Some(record.guid());
                        host.ports_added = commit.ports_added;
                        host.ports_rejected = commit.rejected.len();
                        if !commit.rejected.is_empty() {
                            warnings += commit.rejected.len();
                            degraded = true;
                        }
                        records.push(record);
                    }
                    Err(e) => {
                        error!("Sweep {}: record of {} rejected: {}", id, host.target, e);
                        host.status = HostStatus::Failed(e.to_string());
                    }
                }
            }
            if !host.status.is_active() {
                errors += 1;
                degraded = true;
            }
            debug!("Sweep {}: {} done ({})", id, host.target, host.status);
            hosts.push(host);
        }
        hosts.sort_by(|a, b| a.target.cmp(&b.target));

        let (status, links) = if records.is_empty() {
            warn!("Sweep {}: no host produced data", id);
            (SweepStatus::NoData, ResolveReport::default())
        } else {
            let links = resolve_links(&records, &mut store);
            warnings += links.unresolved() + links.speed_mismatches;
            let status = if degraded || links.unresolved() > 0 {
                SweepStatus::PartiallyProcessed
            } else {
                SweepStatus::Complete
            };
            (status, links)
        };
        drop(records);

        let report = SweepReport {
            id,
            status,
            hosts,
            warnings,
            errors,
            links,
            node_count: store.node_count(),
            port_count: store.port_count(),
            elapsed: started.elapsed(),
        };
        info!("{}", report);
        Ok(SweepOutcome { store, report })
    }
}
