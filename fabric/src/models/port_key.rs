use super::NodeGuid;
use std::fmt;

/// Port number, unique within its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PortNum(u16);

impl PortNum {
    /// Switch management port
    pub const MANAGEMENT: PortNum = PortNum(0);

    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_management(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PortNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable key of a port: owning node plus port number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortKey {
    pub node: NodeGuid,
    pub port: PortNum,
}

impl PortKey {
    pub const fn new(node: NodeGuid, port: PortNum) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.node, self.port)
    }
}
