use crate::models::{Lid, NodeGuid, PortKey, PortNum};

/// Errors raised while talking to a management agent
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout occurred during operation: {0}")]
    Timeout(String),

    #[error("Agent returned a fault: {0}")]
    Fault(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Unknown host: {0}")]
    UnknownHost(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<quick_xml::DeError> for TransportError {
    fn from(err: quick_xml::DeError) -> Self {
        TransportError::Malformed(err.to_string())
    }
}

/// Errors raised by the port-number inference engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("Invalid interface name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Cannot register {name:?}: port numbers were already assigned")]
    AlreadyFinalized { name: String },

    #[error("Interface name {name:?} was never registered")]
    NotFound { name: String },
}

/// A host answered but its data cannot describe a node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("No usable node identifier: {0}")]
    Unidentified(String),
}

/// Invariant violations reported by the fabric store
///
/// Every mutator returns one of these instead of applying a partial change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Node identifier must be non-zero")]
    InvalidGuid,

    #[error("Unknown node {0}")]
    UnknownNode(NodeGuid),

    #[error("Unknown port {0}")]
    UnknownPort(PortKey),

    #[error("Port {port} already exists on node {node}")]
    DuplicatePort { node: NodeGuid, port: PortNum },

    #[error("Address {lid} is already held by port {holder}")]
    DuplicateAddress { lid: Lid, holder: PortKey },

    #[error("Invalid address {lid} with alias range {lmc}")]
    InvalidAddress { lid: Lid, lmc: u8 },

    #[error("Port {0} cannot be linked to itself")]
    SelfLink(PortKey),

    #[error("Port {port} is already linked to {neighbor}")]
    AlreadyLinked { port: PortKey, neighbor: PortKey },

    #[error("Port {0} is not linked")]
    NotLinked(PortKey),
}

/// Crate-level error type for sweeps
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No targets configured for the sweep")]
    NoTargets,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Polling task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for FabricError {
    fn from(err: tokio::task::JoinError) -> Self {
        FabricError::Task(err.to_string())
    }
}

impl From<regex::Error> for FabricError {
    fn from(err: regex::Error) -> Self {
        FabricError::Configuration(format!("invalid interface filter: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, FabricError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::DuplicatePort {
            node: NodeGuid::new(0x0002_c903_0000_1234),
            port: PortNum::new(7),
        };
        assert_eq!(
            err.to_string(),
            "Port 7 already exists on node 0x0002c90300001234"
        );

        let err = StoreError::SelfLink(PortKey::new(NodeGuid::new(1), PortNum::new(3)));
        assert!(err.to_string().contains("cannot be linked to itself"));
    }

    #[test]
    fn test_fabric_error_from_store_error() {
        let err: FabricError = StoreError::InvalidGuid.into();
        assert!(matches!(err, FabricError::Store(StoreError::InvalidGuid)));
        assert_eq!(err.to_string(), "Node identifier must be non-zero");
    }

    #[test]
    fn test_inference_error_messages() {
        let err = InferenceError::NotFound {
            name: "Eth1/9".to_string(),
        };
        assert_eq!(err.to_string(), "Interface name \"Eth1/9\" was never registered");
    }
}
