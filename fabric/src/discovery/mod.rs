//! Discovery sessions
//!
//! Polls one management target to completion and normalizes what it
//! returned. Runs inside a polling task and touches no shared state.

mod session;
mod target;

pub use session::{HostSession, PolledHost};
pub use target::{Credentials, DeviceKind, InterfaceFilter, Target};

use crate::config::SweepConfig;
use crate::error::TransportError;
use crate::normalize::{normalize, DeviceRecord};
use crate::transport::ManagementTransport;
use std::fmt;
use std::time::{Duration, Instant};

/// How polling a host ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    Active,
    TimedOut,
    Failed(String),
}

impl HostStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, HostStatus::Active)
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Active => write!(f, "active"),
            HostStatus::TimedOut => write!(f, "timed out"),
            HostStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Result of polling one target
#[derive(Debug)]
pub struct HostOutcome {
    pub target: String,
    pub status: HostStatus,
    pub record: Option<DeviceRecord>,
    /// Observations collected
    pub observations: usize,
    /// Recoverable problems: undecodable items, skipped subtrees, defaulted fields
    pub warnings: usize,
    pub elapsed: Duration,
}

/// Poll and normalize one host
pub async fn poll_host(
    target: &Target,
    transport: &dyn ManagementTransport,
    config: &SweepConfig,
) -> HostOutcome {
    let started = Instant::now();
    log::info!("Polling {}", target);

    let polled = match HostSession::new(target, transport, config).poll().await {
        Ok(polled) => polled,
        Err(e) => {
            let status = match e {
                TransportError::Timeout(_) => HostStatus::TimedOut,
                other => HostStatus::Failed(other.to_string()),
            };
            log::warn!("{} is unreachable: {}", target.name, status);
            return HostOutcome {
                target: target.name.clone(),
                status,
                record: None,
                observations: 0,
                warnings: 0,
                elapsed: started.elapsed(),
            };
        }
    };

    let mut warnings = polled.malformed + polled.skipped_subtrees;
    let (status, record) = match normalize(target, polled.node_type, &polled.observations) {
        Ok(record) => {
            warnings += record.warnings.len();
            (HostStatus::Active, Some(record))
        }
        Err(e) => {
            log::warn!("{}: {}", target.name, e);
            (HostStatus::Failed(e.to_string()), None)
        }
    };

    let elapsed = started.elapsed();
    log::info!(
        "{} {} after {} requests in {:?}",
        target.name,
        status,
        polled.requests,
        elapsed
    );
    HostOutcome {
        target: target.name.clone(),
        status,
        record,
        observations: polled.observations.len(),
        warnings,
        elapsed,
    }
}
