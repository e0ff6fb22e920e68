//! Fabric data store
//!
//! Owns every system, node and port discovered by a sweep. Entities are
//! addressed by stable keys (`NodeGuid`, `PortKey`, `SystemKey`) and every
//! cross reference (port to node, port to neighbor, node to system) is a
//! key lookup. Mutators check the graph invariants before touching any
//! state and report violations as [`StoreError`].

mod address;
mod entities;
mod links;

pub use entities::{Node, NodeInfo, Port, PortInfo, PortStatus, System, SystemKey};
pub use links::{LinkCounters, LinkView};

use crate::error::StoreError;
use crate::models::{AddressRange, Lid, NodeGuid, PortKey, PortNum};
use address::AddressIndex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// What `add_port` does when the new address is already held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressConflict {
    /// Fail the insert with `StoreError::DuplicateAddress`
    #[default]
    Reject,
    /// Clear the address of every prior holder, then insert
    Evict,
}

#[derive(Debug, Default, Clone)]
pub struct FabricStore {
    nodes: BTreeMap<NodeGuid, Node>,
    systems: BTreeMap<SystemKey, System>,
    addresses: AddressIndex,
    port_order: Vec<PortKey>,
    link_counters: LinkCounters,
}

impl FabricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or return the existing one with the same identifier
    ///
    /// The system is created on first member insert.
    pub fn add_node(&mut self, info: NodeInfo) -> Result<&Node, StoreError> {
        if info.guid.is_zero() {
            return Err(StoreError::InvalidGuid);
        }

        match self.nodes.entry(info.guid) {
            Entry::Occupied(existing) => {
                log::debug!("Node {} already present, keeping existing record", info.guid);
                Ok(&*existing.into_mut())
            }
            Entry::Vacant(slot) => {
                let key = SystemKey::for_node(info.system_image_guid, info.guid);
                self.systems
                    .entry(key)
                    .or_insert_with(|| System::new(key))
                    .insert(info.guid);
                log::debug!("Added {} node {} ({})", info.node_type, info.guid, info.description);
                Ok(&*slot.insert(Node::new(info, key)))
            }
        }
    }

    /// Insert a port on an existing node
    ///
    /// Port numbers are unique within the node and addresses are unique
    /// across the fabric, alias ranges included. `conflict` decides what
    /// happens when the address is already held.
    pub fn add_port(
        &mut self,
        node: NodeGuid,
        info: PortInfo,
        conflict: AddressConflict,
    ) -> Result<PortKey, StoreError> {
        let owner = self.nodes.get(&node).ok_or(StoreError::UnknownNode(node))?;
        if owner.ports.contains_key(&info.number) {
            return Err(StoreError::DuplicatePort {
                node,
                port: info.number,
            });
        }
        let key = PortKey::new(node, info.number);

        let range = if info.lid.is_assigned() {
            let range = AddressRange::new(info.lid, info.lmc).ok_or(StoreError::InvalidAddress {
                lid: info.lid,
                lmc: info.lmc,
            })?;
            let holders = self.addresses.overlapping(&range);
            if let Some((holder, held)) = holders.last() {
                if conflict == AddressConflict::Reject {
                    return Err(StoreError::DuplicateAddress {
                        lid: held.base,
                        holder: *holder,
                    });
                }
            }
            for (holder, held) in holders {
                self.evict_address(holder);
                log::warn!(
                    "Evicted address {} (lmc {}) from {} for {}",
                    held.base,
                    held.lmc,
                    holder,
                    key
                );
            }
            Some(range)
        } else {
            None
        };

        if let Some(range) = range {
            self.addresses.insert(key, range);
        }
        let owner = self.nodes.get_mut(&node).ok_or(StoreError::UnknownNode(node))?;
        owner.ports.insert(info.number, Port::new(node, info));
        self.port_order.push(key);
        Ok(key)
    }

    /// Replace the operational state of an existing port
    pub fn update_port(&mut self, key: PortKey, status: PortStatus) -> Result<(), StoreError> {
        let port = self.port_mut(key).ok_or(StoreError::UnknownPort(key))?;
        port.info.status = status;
        Ok(())
    }

    /// Remove a port, unlinking it first
    pub fn remove_port(&mut self, key: PortKey) -> Result<Port, StoreError> {
        let linked = self
            .port(key)
            .ok_or(StoreError::UnknownPort(key))?
            .is_linked();
        if linked {
            self.remove_link(key)?;
        }
        self.addresses.remove(key);
        self.port_order.retain(|k| *k != key);

        let node = self.nodes.get_mut(&key.node).ok_or(StoreError::UnknownNode(key.node))?;
        node.ports.remove(&key.port).ok_or(StoreError::UnknownPort(key))
    }

    /// Remove a node with all of its ports; drops the system when it empties
    pub fn remove_node(&mut self, guid: NodeGuid) -> Result<Node, StoreError> {
        let keys: Vec<PortKey> = self
            .node(guid)
            .ok_or(StoreError::UnknownNode(guid))?
            .ports()
            .map(|port| port.key())
            .collect();
        for key in keys {
            self.remove_port(key)?;
        }

        let node = self.nodes.remove(&guid).ok_or(StoreError::UnknownNode(guid))?;
        let system_key = node.system();
        let emptied = self
            .systems
            .get_mut(&system_key)
            .map(|system| system.remove(guid))
            .unwrap_or(false);
        if emptied {
            self.systems.remove(&system_key);
            log::debug!("Removed empty system {:?}", system_key);
        }
        Ok(node)
    }

    pub fn node(&self, guid: NodeGuid) -> Option<&Node> {
        self.nodes.get(&guid)
    }

    pub fn port(&self, key: PortKey) -> Option<&Port> {
        self.nodes.get(&key.node)?.ports.get(&key.port)
    }

    pub(crate) fn port_mut(&mut self, key: PortKey) -> Option<&mut Port> {
        self.nodes.get_mut(&key.node)?.ports.get_mut(&key.port)
    }

    /// Port holding `lid`, alias ranges included
    pub fn lookup_lid(&self, lid: Lid) -> Option<&Port> {
        self.addresses.lookup(lid).and_then(|key| self.port(key))
    }

    /// Nodes in ascending identifier order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    pub fn system(&self, key: SystemKey) -> Option<&System> {
        self.systems.get(&key)
    }

    /// Ports in insertion order
    pub fn ports(&self) -> impl Iterator<Item = &Port> + '_ {
        self.port_order.iter().filter_map(|key| self.port(*key))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn port_count(&self) -> usize {
        self.port_order.len()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Addresses in use, every alias counted once
    pub fn address_count(&self) -> u32 {
        self.addresses.address_count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Port number `number` of node `guid`, if both exist
    pub fn port_of(&self, guid: NodeGuid, number: PortNum) -> Option<&Port> {
        self.port(PortKey::new(guid, number))
    }

    fn evict_address(&mut self, key: PortKey) {
        self.addresses.remove(key);
        if let Some(port) = self.port_mut(key) {
            port.info.lid = Lid::UNASSIGNED;
            port.info.lmc = 0;
        }
    }
}
