use crate::error::StoreError;
use crate::inference::fnv1a;
use crate::models::{NodeGuid, PortKey, PortNum};
use crate::store::{AddressConflict, FabricStore, NodeInfo, PortInfo};
use crate::transport::{format_hex, ObservationValue};
use std::collections::HashMap;

/// Marks identifiers derived from textual chassis ids, keeping them out
/// of the 48-bit MAC range and away from zero
const TEXT_GUID_FLAG: u64 = 1 << 63;

/// Hash under which a port is found from a declared port-id string
pub fn port_id_hash(port_id: &str) -> u64 {
    fnv1a(port_id.trim().as_bytes())
}

/// Node identifier from a chassis id value
///
/// MAC forms map to their 48-bit value; any other non-empty text maps to a
/// stable hash so both ends of a link derive the same identifier.
pub fn chassis_guid(value: &ObservationValue) -> Option<NodeGuid> {
    let guid = match value {
        ObservationValue::HexString(bytes) => {
            NodeGuid::from_octets(bytes).or_else(|| text_guid(&format_hex(bytes)))
        }
        ObservationValue::OctetString(text) => {
            NodeGuid::parse_mac(text).or_else(|| text_guid(text))
        }
        _ => None,
    };
    guid.filter(|guid| !guid.is_zero())
}

fn text_guid(text: &str) -> Option<NodeGuid> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(NodeGuid::new(fnv1a(text.as_bytes()) | TEXT_GUID_FLAG))
}

/// What a device says is attached to one of its ports
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborClaim {
    pub chassis: NodeGuid,
    pub port_id: String,
    pub port_desc: Option<String>,
    pub system_name: Option<String>,
}

/// A port ready to be inserted into the store
#[derive(Debug, Clone)]
pub struct PortDraft {
    pub info: PortInfo,
    /// Port-id strings this port answers to
    pub port_ids: Vec<String>,
    pub neighbor: Option<NeighborClaim>,
}

impl PortDraft {
    pub fn number(&self) -> PortNum {
        self.info.number
    }
}

/// Per-port failures while committing a record
#[derive(Debug, Default)]
pub struct CommitOutcome {
    pub ports_added: usize,
    pub rejected: Vec<(PortNum, StoreError)>,
}

/// Normalized view of one polled device
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub node: NodeInfo,
    pub ports: Vec<PortDraft>,
    /// Other identifiers neighbors may know this device by
    pub chassis_aliases: Vec<NodeGuid>,
    pub warnings: Vec<String>,
    port_index: HashMap<u64, usize>,
}

impl DeviceRecord {
    pub fn new(node: NodeInfo) -> Self {
        Self {
            node,
            ports: Vec::new(),
            chassis_aliases: Vec::new(),
            warnings: Vec::new(),
            port_index: HashMap::new(),
        }
    }

    pub fn guid(&self) -> NodeGuid {
        self.node.guid
    }

    /// Add a port and index its port ids; a port id already claimed by
    /// another port keeps pointing at the first one
    pub fn push_port(&mut self, draft: PortDraft) {
        let slot = self.ports.len();
        for port_id in &draft.port_ids {
            let hash = port_id_hash(port_id);
            if let Some(existing) = self.port_index.get(&hash) {
                let owner = self.ports[*existing].number();
                self.warn(format!(
                    "port id {:?} of port {} already names port {}",
                    port_id,
                    draft.number(),
                    owner
                ));
                continue;
            }
            self.port_index.insert(hash, slot);
        }
        self.ports.push(draft);
    }

    pub fn port(&self, number: PortNum) -> Option<&PortDraft> {
        self.ports.iter().find(|p| p.number() == number)
    }

    pub fn port_by_id(&self, port_id: &str) -> Option<&PortDraft> {
        self.port_index
            .get(&port_id_hash(port_id))
            .map(|slot| &self.ports[*slot])
    }

    pub fn has_port_number(&self, number: PortNum) -> bool {
        self.port(number).is_some()
    }

    /// Ports that report a neighbor
    pub fn claims(&self) -> impl Iterator<Item = (PortKey, &NeighborClaim)> + '_ {
        let guid = self.guid();
        self.ports.iter().filter_map(move |p| {
            p.neighbor
                .as_ref()
                .map(|claim| (PortKey::new(guid, p.number()), claim))
        })
    }

    pub(crate) fn warn(&mut self, message: String) {
        log::warn!("{}: {}", self.node.description, message);
        self.warnings.push(message);
    }

    /// Insert the node and its ports
    ///
    /// Fails only when the node itself is rejected; rejected ports are
    /// reported in the outcome and the rest are kept.
    pub fn commit(
        &self,
        store: &mut FabricStore,
        policy: AddressConflict,
    ) -> Result<CommitOutcome, StoreError> {
        store.add_node(self.node.clone())?;

        let mut outcome = CommitOutcome::default();
        for draft in &self.ports {
            match store.add_port(self.guid(), draft.info.clone(), policy) {
                Ok(_) => outcome.ports_added += 1,
                Err(e) => {
                    log::warn!(
                        "{}: port {} rejected: {}",
                        self.node.description,
                        draft.number(),
                        e
                    );
                    outcome.rejected.push((draft.number(), e));
                }
            }
        }
        log::debug!(
            "Committed {} ({}) with {} ports",
            self.node.description,
            self.guid(),
            outcome.ports_added
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lid, NodeType};

    fn draft(number: u16, ids: &[&str]) -> PortDraft {
        PortDraft {
            info: PortInfo::new(PortNum::new(number)),
            port_ids: ids.iter().map(|s| s.to_string()).collect(),
            neighbor: None,
        }
    }

    fn record() -> DeviceRecord {
        DeviceRecord::new(
            NodeInfo::new(NodeGuid::new(0x0002_c903_0001), NodeType::Switch)
                .with_description("leaf-01"),
        )
    }

    #[test]
    fn test_chassis_guid_forms() {
        let mac = NodeGuid::new(0x0002_c903_0001);
        assert_eq!(
            chassis_guid(&ObservationValue::HexString(vec![0, 2, 0xc9, 3, 0, 1])),
            Some(mac)
        );
        assert_eq!(
            chassis_guid(&ObservationValue::OctetString("00:02:c9:03:00:01".into())),
            Some(mac)
        );

        let named = chassis_guid(&ObservationValue::OctetString("spine-2".into())).unwrap();
        assert!(named.value() & TEXT_GUID_FLAG != 0);
        assert_eq!(
            chassis_guid(&ObservationValue::OctetString(" spine-2 ".into())),
            Some(named)
        );

        assert_eq!(chassis_guid(&ObservationValue::OctetString("".into())), None);
        assert_eq!(chassis_guid(&ObservationValue::HexString(vec![0; 6])), None);
        assert_eq!(chassis_guid(&ObservationValue::Integer(4)), None);
    }

    #[test]
    fn test_port_lookup_by_id() {
        let mut record = record();
        record.push_port(draft(1, &["Eth1/1"]));
        record.push_port(draft(2, &["eth2", "00:02:c9:03:00:02"]));

        assert_eq!(record.port_by_id("Eth1/1").unwrap().number(), PortNum::new(1));
        assert_eq!(
            record.port_by_id("00:02:c9:03:00:02").unwrap().number(),
            PortNum::new(2)
        );
        assert!(record.port_by_id("eth1/1").is_none());
    }

    #[test]
    fn test_duplicate_port_id_keeps_first() {
        let mut record = record();
        record.push_port(draft(1, &["Eth1/1"]));
        record.push_port(draft(2, &["Eth1/1"]));
        assert_eq!(record.port_by_id("Eth1/1").unwrap().number(), PortNum::new(1));
        assert_eq!(record.warnings.len(), 1);
    }

    #[test]
    fn test_commit_reports_rejected_ports() {
        let mut record = record();
        let mut first = draft(1, &["Eth1/1"]);
        first.info = first.info.with_address(Lid::new(10), 0);
        let mut second = draft(2, &["Eth1/2"]);
        second.info = second.info.with_address(Lid::new(10), 0);
        record.push_port(first);
        record.push_port(second);

        let mut store = FabricStore::new();
        let outcome = record.commit(&mut store, AddressConflict::Reject).unwrap();
        assert_eq!(outcome.ports_added, 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            outcome.rejected[0].1,
            StoreError::DuplicateAddress { .. }
        ));
        assert_eq!(store.port_count(), 1);
    }

    #[test]
    fn test_commit_rejects_zero_guid() {
        let record = DeviceRecord::new(NodeInfo::new(NodeGuid::new(0), NodeType::Host));
        let mut store = FabricStore::new();
        assert_eq!(
            record.commit(&mut store, AddressConflict::Reject).unwrap_err(),
            StoreError::InvalidGuid
        );
    }
}
