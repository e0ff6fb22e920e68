use crate::discovery::{DeviceKind, Target};
use crate::error::FabricError;
use crate::store::AddressConflict;
use std::collections::HashSet;
use std::time::Duration;

/// Configuration for one discovery sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Management endpoints to poll
    pub targets: Vec<Target>,
    /// Deadline for a single walk request
    pub request_timeout: Duration,
    /// Retries after a failed request
    pub retry_attempts: u32,
    /// Base delay between retries; the n-th retry waits `n * retry_backoff`
    pub retry_backoff: Duration,
    /// Items requested per walk page
    pub max_repetitions: u32,
    /// Upper bound on pages fetched for one subtree
    pub max_pages_per_walk: usize,
    /// Hosts polled at the same time
    pub max_concurrent_hosts: usize,
    /// Entries read from each inventory column
    pub inventory_cap: u32,
    /// What happens when a polled port's address overlaps another port's
    pub address_conflict: AddressConflict,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            request_timeout: Duration::from_secs(2),
            retry_attempts: 2,
            retry_backoff: Duration::from_millis(250),
            max_repetitions: 32,
            max_pages_per_walk: 4096,
            max_concurrent_hosts: 64,
            inventory_cap: 4,
            address_conflict: AddressConflict::Reject,
        }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short deadlines and a single retry, for labs and tests
    pub fn minimal() -> Self {
        Self {
            request_timeout: Duration::from_millis(500),
            retry_attempts: 1,
            retry_backoff: Duration::from_millis(10),
            max_concurrent_hosts: 8,
            ..Self::default()
        }
    }

    /// Validate the entire configuration
    ///
    /// An empty target list is accepted here; running a sweep without
    /// targets fails with [`FabricError::NoTargets`].
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.retry_attempts > 10 {
            return Err("Too many retry attempts (max 10)".to_string());
        }
        if self.max_repetitions == 0 {
            return Err("Max repetitions must be greater than 0".to_string());
        }
        if self.max_pages_per_walk == 0 {
            return Err("Max pages per walk must be greater than 0".to_string());
        }
        if self.max_concurrent_hosts == 0 {
            return Err("Max concurrent hosts must be greater than 0".to_string());
        }
        if self.inventory_cap == 0 {
            return Err("Inventory cap must be greater than 0".to_string());
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(format!("Target {} has an empty name", target.url));
            }
            if !names.insert(target.name.as_str()) {
                return Err(format!("Duplicate target name {}", target.name));
            }
            if !(target.url.starts_with("http://") || target.url.starts_with("https://")) {
                return Err(format!(
                    "Target {} has an unsupported URL {}",
                    target.name, target.url
                ));
            }
        }
        Ok(())
    }
}

/// Fluent builder for [`SweepConfig`]
///
/// ```rust,no_run
/// use fabric::{SweepConfigBuilder, Target};
/// use std::time::Duration;
///
/// let config = SweepConfigBuilder::new()
///     .target(Target::new("leaf-01", "http://10.0.0.11:8161").switch())
///     .target(Target::new("node-17", "http://10.0.1.17:8161").host())
///     .request_timeout(Duration::from_secs(1))
///     .build()?;
/// # Ok::<(), fabric::FabricError>(())
/// ```
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn target(mut self, target: Target) -> Self {
        self.config.targets.push(target);
        self
    }

    pub fn targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.config.targets.extend(targets);
        self
    }

    /// Add a target from a `kind=url` argument, e.g. `switch=http://10.0.0.1:8161`
    ///
    /// The kind may be omitted, in which case it is detected. The target is
    /// named after the URL's host and port.
    pub fn target_arg(self, arg: &str) -> Result<Self, FabricError> {
        let (kind, url) = match arg.split_once('=').filter(|(kind, _)| !kind.contains("://")) {
            Some((kind, url)) => {
                let kind = DeviceKind::parse(kind).ok_or_else(|| {
                    FabricError::Configuration(format!("Unknown device kind in {:?}", arg))
                })?;
                (kind, url)
            }
            None => (DeviceKind::Auto, arg),
        };
        let name = url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(url)
            .trim_end_matches('/')
            .to_string();
        Ok(self.target(Target::new(name, url).with_kind(kind)))
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Configure retries after a failed request
    pub fn retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.config.retry_attempts = attempts;
        self.config.retry_backoff = backoff;
        self
    }

    pub fn max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.config.max_repetitions = max_repetitions;
        self
    }

    pub fn max_pages_per_walk(mut self, pages: usize) -> Self {
        self.config.max_pages_per_walk = pages;
        self
    }

    pub fn max_concurrent_hosts(mut self, hosts: usize) -> Self {
        self.config.max_concurrent_hosts = hosts;
        self
    }

    pub fn inventory_cap(mut self, cap: u32) -> Self {
        self.config.inventory_cap = cap;
        self
    }

    pub fn address_conflict(mut self, policy: AddressConflict) -> Self {
        self.config.address_conflict = policy;
        self
    }

    pub fn build(self) -> Result<SweepConfig, FabricError> {
        self.config
            .validate()
            .map_err(FabricError::Configuration)?;
        Ok(self.config)
    }
}
