//! Management protocol access
//!
//! Agents expose a subtree walk over HTTP: the client posts a [`WalkRequest`]
//! document to `{agent}/walk` and receives one [`WalkPage`] of typed
//! observations, with a continuation cursor when the subtree has more.

mod http;
mod observation;
mod oid;
mod replay;
mod walk;

pub use http::HttpTransport;
pub use observation::{format_hex, Observation, ObservationValue};
pub use oid::Oid;
pub use replay::ReplayTransport;
pub use walk::{fault_xml, serve_walk, WalkPage, WalkRequest};

use crate::discovery::Target;
use crate::error::TransportError;
use async_trait::async_trait;

/// Fetches walk pages from a management agent
///
/// Implementations answer a single page per call; continuation, timeouts
/// and retries are handled by the caller.
#[async_trait]
pub trait ManagementTransport: Send + Sync {
    async fn walk(&self, target: &Target, request: &WalkRequest)
        -> Result<WalkPage, TransportError>;

    fn name(&self) -> &'static str;
}
