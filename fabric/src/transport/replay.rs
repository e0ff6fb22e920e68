use super::observation::Observation;
use super::walk::{serve_walk, WalkPage, WalkRequest};
use super::ManagementTransport;
use crate::discovery::Target;
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    Serve(Vec<Observation>),
    Unreachable,
    Fault(String),
    /// Fails this many requests with a timeout, then serves
    Flaky {
        failures: usize,
        observations: Vec<Observation>,
    },
}

/// In-memory transport answering walks from recorded observations
///
/// Agents are keyed by target name. Useful for offline replay of captured
/// fabrics and for tests.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    agents: HashMap<String, Behavior>,
    delay: Option<Duration>,
    requests: AtomicUsize,
    attempts: Mutex<HashMap<String, usize>>,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `observations` for `target`; they need not be sorted
    pub fn with_agent(mut self, target: &str, mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| a.oid.cmp(&b.oid));
        self.agents
            .insert(target.to_string(), Behavior::Serve(observations));
        self
    }

    /// Every request to `target` times out
    pub fn with_unreachable(mut self, target: &str) -> Self {
        self.agents.insert(target.to_string(), Behavior::Unreachable);
        self
    }

    /// Every request to `target` returns a fault
    pub fn with_fault(mut self, target: &str, message: &str) -> Self {
        self.agents
            .insert(target.to_string(), Behavior::Fault(message.to_string()));
        self
    }

    /// The first `failures` requests to `target` time out
    pub fn with_flaky_agent(
        mut self,
        target: &str,
        failures: usize,
        mut observations: Vec<Observation>,
    ) -> Self {
        observations.sort_by(|a, b| a.oid.cmp(&b.oid));
        self.agents.insert(
            target.to_string(),
            Behavior::Flaky {
                failures,
                observations,
            },
        );
        self
    }

    /// Delay every answer, e.g. to exercise request deadlines
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of walk requests answered so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManagementTransport for ReplayTransport {
    async fn walk(
        &self,
        target: &Target,
        request: &WalkRequest,
    ) -> Result<WalkPage, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.agents.get(&target.name) {
            None => Err(TransportError::UnknownHost(target.name.clone())),
            Some(Behavior::Serve(observations)) => Ok(serve_walk(observations, request)),
            Some(Behavior::Unreachable) => Err(TransportError::Timeout(format!(
                "{} did not answer",
                target.name
            ))),
            Some(Behavior::Fault(message)) => Err(TransportError::Fault(message.clone())),
            Some(Behavior::Flaky {
                failures,
                observations,
            }) => {
                if self.attempt(&target.name) <= *failures {
                    Err(TransportError::Timeout(format!(
                        "{} dropped the request",
                        target.name
                    )))
                } else {
                    Ok(serve_walk(observations, request))
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

impl ReplayTransport {
    /// One-based attempt number of the current request to `target`
    fn attempt(&self, target: &str) -> usize {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = attempts.entry(target.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}
