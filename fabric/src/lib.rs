//! Fabric topology discovery
//!
//! Polls a set of switches and hosts over their management interface,
//! normalizes each device into nodes and ports, and links them into a
//! [`FabricStore`] graph from the neighbors every switch reports.
//!
//! ```no_run
//! use fabric::{Sweep, SweepConfigBuilder, Target};
//!
//! # async fn run() -> fabric::Result<()> {
//! let config = SweepConfigBuilder::new()
//!     .target(Target::new("leaf-01", "http://10.0.0.11:8161").switch())
//!     .target(Target::new("node-17", "http://10.0.1.17:8161").host())
//!     .build()?;
//!
//! let outcome = Sweep::new(config)?.run().await?;
//! println!("{}", outcome.report);
//! for link in outcome.store.links() {
//!     println!("{} <-> {}", link.from, link.to);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod inference;
pub mod models;
pub mod normalize;
pub mod resolve;
pub mod store;
pub mod sweep;
pub mod transport;

// Re-export key types for easier access
pub use config::{SweepConfig, SweepConfigBuilder};
pub use discovery::{poll_host, Credentials, DeviceKind, HostOutcome, HostStatus, InterfaceFilter, Target};
pub use error::{FabricError, InferenceError, NormalizeError, Result, StoreError, TransportError};
pub use inference::PortNumberer;
pub use models::{Lid, LinkState, LinkWidth, NodeGuid, NodeType, PhysState, PortKey, PortNum};
pub use normalize::{normalize, DeviceRecord};
pub use resolve::{resolve_links, LinkResolver, ResolveReport};
pub use store::{AddressConflict, FabricStore, LinkView, Node, NodeInfo, Port, PortInfo, PortStatus};
pub use sweep::{HostReport, Sweep, SweepId, SweepOutcome, SweepReport, SweepStatus};
pub use transport::{HttpTransport, ManagementTransport, ReplayTransport};
