use crate::models::{
    LinkState, LinkWidth, Lid, NodeGuid, NodeType, PhysState, PortCounters, PortKey, PortNum,
};
use std::collections::{BTreeMap, BTreeSet};

/// Key of a system: nodes sharing a system image identifier, or a
/// singleton keyed by the node itself when that identifier is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemKey {
    Image(u64),
    Singleton(NodeGuid),
}

impl SystemKey {
    pub fn for_node(system_image_guid: u64, node: NodeGuid) -> Self {
        if system_image_guid == 0 {
            SystemKey::Singleton(node)
        } else {
            SystemKey::Image(system_image_guid)
        }
    }
}

/// Group of nodes sharing one system image
#[derive(Debug, Clone)]
pub struct System {
    key: SystemKey,
    members: BTreeSet<NodeGuid>,
}

impl System {
    pub(crate) fn new(key: SystemKey) -> Self {
        Self {
            key,
            members: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> SystemKey {
        self.key
    }

    /// Member node identifiers in ascending order
    pub fn members(&self) -> impl Iterator<Item = NodeGuid> + '_ {
        self.members.iter().copied()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn insert(&mut self, node: NodeGuid) {
        self.members.insert(node);
    }

    /// Returns true when the system has no members left
    pub(crate) fn remove(&mut self, node: NodeGuid) -> bool {
        self.members.remove(&node);
        self.members.is_empty()
    }
}

/// Descriptive data supplied when a node is inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub guid: NodeGuid,
    pub node_type: NodeType,
    pub description: String,
    pub num_ports: u16,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub firmware: Option<String>,
    pub system_image_guid: u64,
}

impl NodeInfo {
    pub fn new(guid: NodeGuid, node_type: NodeType) -> Self {
        Self {
            guid,
            node_type,
            description: String::new(),
            num_ports: 0,
            vendor: None,
            model: None,
            serial: None,
            firmware: None,
            system_image_guid: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_system_image(mut self, system_image_guid: u64) -> Self {
        self.system_image_guid = system_image_guid;
        self
    }
}

/// A node owned by the store
#[derive(Debug, Clone)]
pub struct Node {
    pub info: NodeInfo,
    system: SystemKey,
    pub(crate) ports: BTreeMap<PortNum, Port>,
}

impl Node {
    pub(crate) fn new(info: NodeInfo, system: SystemKey) -> Self {
        Self {
            info,
            system,
            ports: BTreeMap::new(),
        }
    }

    pub fn guid(&self) -> NodeGuid {
        self.info.guid
    }

    pub fn node_type(&self) -> NodeType {
        self.info.node_type
    }

    pub fn is_switch(&self) -> bool {
        self.info.node_type == NodeType::Switch
    }

    pub fn system(&self) -> SystemKey {
        self.system
    }

    pub fn port(&self, number: PortNum) -> Option<&Port> {
        self.ports.get(&number)
    }

    /// Ports in ascending port-number order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

/// Mutable operational state of a port
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortStatus {
    pub link_state: LinkState,
    pub phys_state: PhysState,
    pub active_speed_mbps: u64,
    /// Fastest rate the port supports; interface tables do not carry it
    pub supported_speed_mbps: Option<u64>,
    /// Lane counts, known only to producers that read them from the port
    pub active_width: Option<LinkWidth>,
    pub supported_width: Option<LinkWidth>,
    pub mtu: u32,
    pub counters: PortCounters,
}

/// Data supplied when a port is inserted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortInfo {
    pub number: PortNum,
    /// Port identifier; switches expose one only at port 0
    pub port_guid: Option<NodeGuid>,
    pub lid: Lid,
    pub lmc: u8,
    pub name: Option<String>,
    pub if_index: Option<u32>,
    pub status: PortStatus,
}

impl PortInfo {
    pub fn new(number: PortNum) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, lid: Lid, lmc: u8) -> Self {
        self.lid = lid;
        self.lmc = lmc;
        self
    }
}

/// A port owned by the store
///
/// The neighbor reference and link orientation are only written by the
/// store's link primitives.
#[derive(Debug, Clone)]
pub struct Port {
    pub info: PortInfo,
    node: NodeGuid,
    pub(crate) neighbor: Option<PortKey>,
    pub(crate) link_from: bool,
}

impl Port {
    pub(crate) fn new(node: NodeGuid, info: PortInfo) -> Self {
        Self {
            info,
            node,
            neighbor: None,
            link_from: false,
        }
    }

    pub fn key(&self) -> PortKey {
        PortKey::new(self.node, self.info.number)
    }

    pub fn node(&self) -> NodeGuid {
        self.node
    }

    pub fn number(&self) -> PortNum {
        self.info.number
    }

    pub fn lid(&self) -> Lid {
        self.info.lid
    }

    pub fn status(&self) -> &PortStatus {
        &self.info.status
    }

    pub fn neighbor(&self) -> Option<PortKey> {
        self.neighbor
    }

    pub fn is_linked(&self) -> bool {
        self.neighbor.is_some()
    }

    /// True when this port is the canonical "from" side of its link
    pub fn is_link_from(&self) -> bool {
        self.link_from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_key_for_node() {
        let node = NodeGuid::new(0x42);
        assert_eq!(SystemKey::for_node(0, node), SystemKey::Singleton(node));
        assert_eq!(SystemKey::for_node(7, node), SystemKey::Image(7));
    }

    #[test]
    fn test_system_remove_reports_empty() {
        let mut system = System::new(SystemKey::Image(1));
        system.insert(NodeGuid::new(1));
        system.insert(NodeGuid::new(2));
        assert!(!system.remove(NodeGuid::new(1)));
        assert!(system.remove(NodeGuid::new(2)));
    }
}
