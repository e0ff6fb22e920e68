mod counters;
mod lid;
mod node_guid;
mod node_type;
mod port_key;
mod port_state;

pub use counters::PortCounters;
pub use lid::{AddressRange, Lid};
pub use node_guid::NodeGuid;
pub use node_type::NodeType;
pub use port_key::{PortKey, PortNum};
pub use port_state::{LinkState, LinkWidth, PhysState};
