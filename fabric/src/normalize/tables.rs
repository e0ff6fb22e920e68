use super::mib;
use crate::models::{LinkState, NodeGuid, PhysState, PortCounters};
use crate::store::PortStatus;
use crate::transport::{Observation, ObservationValue, Oid};
use std::collections::BTreeMap;

/// One row of ifTable joined with ifXTable
#[derive(Debug, Clone, Default)]
pub(crate) struct Interface {
    pub if_index: u32,
    pub descr: Option<String>,
    pub name: Option<String>,
    pub if_type: Option<i64>,
    pub mtu: Option<u32>,
    pub speed_bps: Option<u64>,
    pub high_speed_mbps: Option<u64>,
    pub mac: Option<Vec<u8>>,
    pub admin_status: Option<i64>,
    pub oper_status: Option<i64>,
    pub counters: PortCounters,
}

impl Interface {
    /// ifName, falling back to ifDescr
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.descr.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn is_loopback(&self) -> bool {
        self.if_type == Some(mib::IF_TYPE_SOFTWARE_LOOPBACK) || self.label() == Some("lo")
    }

    /// Non-zero hardware address as an identifier
    pub fn mac_guid(&self) -> Option<NodeGuid> {
        self.mac
            .as_deref()
            .and_then(NodeGuid::from_octets)
            .filter(|guid| !guid.is_zero())
    }

    /// True when `port_id` names this interface
    pub fn answers_to(&self, port_id: &str) -> bool {
        self.name.as_deref() == Some(port_id) || self.descr.as_deref() == Some(port_id)
    }

    pub fn speed_mbps(&self) -> u64 {
        match self.high_speed_mbps {
            Some(mbps) if mbps > 0 => mbps,
            _ => self.speed_bps.unwrap_or(0) / 1_000_000,
        }
    }

    pub fn status(&self) -> PortStatus {
        let link_state = match self.oper_status {
            Some(1) => LinkState::Active,
            Some(2) | Some(7) => LinkState::Down,
            Some(3) | Some(5) => LinkState::Init,
            _ => LinkState::Unknown,
        };
        let phys_state = match (self.admin_status, self.oper_status) {
            (Some(2), _) => PhysState::Disabled,
            (_, Some(1)) => PhysState::LinkUp,
            (None, None) => PhysState::Unknown,
            _ => PhysState::Polling,
        };
        PortStatus {
            link_state,
            phys_state,
            active_speed_mbps: self.speed_mbps(),
            mtu: self.mtu.unwrap_or(0),
            counters: self.counters,
            ..PortStatus::default()
        }
    }
}

/// One lldpLocPortTable row
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalPort {
    pub port_id: Option<String>,
    pub desc: Option<String>,
}

/// One lldpRemTable row
#[derive(Debug, Clone, Default)]
pub(crate) struct RemoteEntry {
    pub chassis: Option<ObservationValue>,
    pub port_id: Option<String>,
    pub port_desc: Option<String>,
    pub sys_name: Option<String>,
}

/// First non-empty inventory strings in entity index order
#[derive(Debug, Clone, Default)]
pub(crate) struct Inventory {
    pub descr: Option<String>,
    pub firmware: Option<String>,
    pub software: Option<String>,
    pub serial: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
}

/// Observations of one device arranged by table
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub sys_name: Option<String>,
    pub sys_descr: Option<String>,
    pub chassis_id: Option<ObservationValue>,
    pub lldp_sys_name: Option<String>,
    pub local_ports: BTreeMap<u32, LocalPort>,
    /// Keyed by (local port number, remote index); time marks are ignored
    pub remotes: BTreeMap<(u32, u32), RemoteEntry>,
    pub interfaces: BTreeMap<u32, Interface>,
    pub inventory: Inventory,
    pub warnings: Vec<String>,
}

impl Tables {
    pub fn collect(observations: &[Observation]) -> Self {
        let mut tables = Tables::default();
        for observation in observations {
            tables.apply(observation);
        }
        tables
    }

    fn apply(&mut self, observation: &Observation) {
        let oid = &observation.oid;
        let value = &observation.value;

        if oid.starts_with(mib::SYS_DESCR) {
            self.sys_descr = self.text(oid, value);
        } else if oid.starts_with(mib::SYS_NAME) {
            self.sys_name = self.text(oid, value);
        } else if oid.starts_with(mib::LLDP_LOC_CHASSIS_ID) {
            self.chassis_id = Some(value.clone());
        } else if oid.starts_with(mib::LLDP_LOC_SYS_NAME) {
            self.lldp_sys_name = self.text(oid, value);
        } else if let Some(suffix) = oid.suffix(mib::LLDP_LOC_PORT_ENTRY) {
            self.apply_local_port(oid, suffix, value);
        } else if let Some(suffix) = oid.suffix(mib::LLDP_REM_ENTRY) {
            self.apply_remote(oid, suffix, value);
        } else if let Some(suffix) = oid.suffix(mib::IF_ENTRY) {
            self.apply_if_entry(oid, suffix, value);
        } else if let Some(suffix) = oid.suffix(mib::IFX_ENTRY) {
            self.apply_ifx_entry(oid, suffix, value);
        } else if let Some(suffix) = oid.suffix(mib::ENT_PHYSICAL_ENTRY) {
            self.apply_inventory(oid, suffix, value);
        }
    }

    fn apply_local_port(&mut self, oid: &Oid, suffix: &[u32], value: &ObservationValue) {
        let [column, port_num] = suffix else { return };
        let field = match *column {
            mib::LLDP_LOC_PORT_ID => self.text(oid, value),
            mib::LLDP_LOC_PORT_DESC => self.text(oid, value),
            _ => return,
        };
        let port = self.local_ports.entry(*port_num).or_default();
        match *column {
            mib::LLDP_LOC_PORT_ID => port.port_id = field,
            _ => port.desc = field,
        }
    }

    fn apply_remote(&mut self, oid: &Oid, suffix: &[u32], value: &ObservationValue) {
        let [column, _time_mark, local_port, index] = suffix else {
            return;
        };
        let key = (*local_port, *index);
        match *column {
            mib::LLDP_REM_CHASSIS_ID => {
                self.remotes.entry(key).or_default().chassis = Some(value.clone());
            }
            mib::LLDP_REM_PORT_ID => {
                let text = self.text(oid, value);
                self.remotes.entry(key).or_default().port_id = text;
            }
            mib::LLDP_REM_PORT_DESC => {
                let text = self.text(oid, value);
                self.remotes.entry(key).or_default().port_desc = text;
            }
            mib::LLDP_REM_SYS_NAME => {
                let text = self.text(oid, value);
                self.remotes.entry(key).or_default().sys_name = text;
            }
            _ => {}
        }
    }

    fn apply_if_entry(&mut self, oid: &Oid, suffix: &[u32], value: &ObservationValue) {
        let [column, if_index] = suffix else { return };
        let column = *column;
        let known = [
            mib::IF_DESCR,
            mib::IF_TYPE,
            mib::IF_MTU,
            mib::IF_SPEED,
            mib::IF_PHYS_ADDRESS,
            mib::IF_ADMIN_STATUS,
            mib::IF_OPER_STATUS,
            mib::IF_IN_DISCARDS,
            mib::IF_IN_ERRORS,
            mib::IF_OUT_DISCARDS,
            mib::IF_OUT_ERRORS,
        ];
        if !known.contains(&column) {
            return;
        }

        let text = if column == mib::IF_DESCR {
            self.text(oid, value)
        } else {
            None
        };
        let enumeration = match column {
            mib::IF_TYPE | mib::IF_ADMIN_STATUS | mib::IF_OPER_STATUS => self.enumeration(oid, value),
            _ => None,
        };
        let number = match column {
            mib::IF_DESCR
            | mib::IF_PHYS_ADDRESS
            | mib::IF_TYPE
            | mib::IF_ADMIN_STATUS
            | mib::IF_OPER_STATUS => None,
            _ => self.counter(oid, value),
        };
        let mtu = match number {
            Some(v) if column == mib::IF_MTU => {
                let mtu = u32::try_from(v).ok();
                if mtu.is_none() {
                    self.out_of_range(oid, value);
                }
                mtu
            }
            _ => None,
        };
        let mac = if column == mib::IF_PHYS_ADDRESS {
            self.octets(oid, value)
        } else {
            None
        };

        let iface = self.interface(*if_index);
        match column {
            mib::IF_DESCR => iface.descr = text,
            mib::IF_TYPE => iface.if_type = enumeration,
            mib::IF_MTU => iface.mtu = mtu,
            mib::IF_SPEED => iface.speed_bps = number,
            mib::IF_PHYS_ADDRESS => iface.mac = mac,
            mib::IF_ADMIN_STATUS => iface.admin_status = enumeration,
            mib::IF_OPER_STATUS => iface.oper_status = enumeration,
            mib::IF_IN_DISCARDS => iface.counters.rx_discards = number.unwrap_or(0),
            mib::IF_IN_ERRORS => iface.counters.rx_errors = number.unwrap_or(0),
            mib::IF_OUT_DISCARDS => iface.counters.tx_discards = number.unwrap_or(0),
            mib::IF_OUT_ERRORS => iface.counters.tx_errors = number.unwrap_or(0),
            _ => {}
        }
    }

    fn apply_ifx_entry(&mut self, oid: &Oid, suffix: &[u32], value: &ObservationValue) {
        let [column, if_index] = suffix else { return };
        let column = *column;
        match column {
            mib::IF_NAME => {
                let name = self.text(oid, value);
                self.interface(*if_index).name = name;
            }
            mib::IF_HC_IN_OCTETS
            | mib::IF_HC_IN_UCAST_PKTS
            | mib::IF_HC_OUT_OCTETS
            | mib::IF_HC_OUT_UCAST_PKTS
            | mib::IF_HIGH_SPEED => {
                let number = self.counter(oid, value);
                let iface = self.interface(*if_index);
                match column {
                    mib::IF_HC_IN_OCTETS => iface.counters.rx_octets = number.unwrap_or(0),
                    mib::IF_HC_IN_UCAST_PKTS => iface.counters.rx_unicast_packets = number.unwrap_or(0),
                    mib::IF_HC_OUT_OCTETS => iface.counters.tx_octets = number.unwrap_or(0),
                    mib::IF_HC_OUT_UCAST_PKTS => iface.counters.tx_unicast_packets = number.unwrap_or(0),
                    _ => iface.high_speed_mbps = number,
                }
            }
            _ => {}
        }
    }

    fn apply_inventory(&mut self, oid: &Oid, suffix: &[u32], value: &ObservationValue) {
        let [column, _index] = suffix else { return };
        let text = match *column {
            mib::ENT_PHYSICAL_DESCR
            | mib::ENT_PHYSICAL_FIRMWARE_REV
            | mib::ENT_PHYSICAL_SOFTWARE_REV
            | mib::ENT_PHYSICAL_SERIAL_NUM
            | mib::ENT_PHYSICAL_MFG_NAME
            | mib::ENT_PHYSICAL_MODEL_NAME => self.text(oid, value),
            _ => return,
        };
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return;
        };
        let slot = match *column {
            mib::ENT_PHYSICAL_DESCR => &mut self.inventory.descr,
            mib::ENT_PHYSICAL_FIRMWARE_REV => &mut self.inventory.firmware,
            mib::ENT_PHYSICAL_SOFTWARE_REV => &mut self.inventory.software,
            mib::ENT_PHYSICAL_SERIAL_NUM => &mut self.inventory.serial,
            mib::ENT_PHYSICAL_MFG_NAME => &mut self.inventory.vendor,
            _ => &mut self.inventory.model,
        };
        // Observations arrive in walk order, so the first one wins
        if slot.is_none() {
            *slot = Some(text.trim().to_string());
        }
    }

    fn interface(&mut self, if_index: u32) -> &mut Interface {
        self.interfaces.entry(if_index).or_insert_with(|| Interface {
            if_index,
            ..Interface::default()
        })
    }

    fn text(&mut self, oid: &Oid, value: &ObservationValue) -> Option<String> {
        let text = value.as_text();
        if text.is_none() {
            self.unexpected(oid, value);
        }
        text
    }

    fn octets(&mut self, oid: &Oid, value: &ObservationValue) -> Option<Vec<u8>> {
        let octets = value.as_octets();
        if octets.is_none() {
            self.unexpected(oid, value);
        }
        octets
    }

    fn integer(&mut self, oid: &Oid, value: &ObservationValue) -> Option<i64> {
        let number = value.as_i64();
        if number.is_none() {
            self.unexpected(oid, value);
        }
        number
    }

    /// Enumerated integers start at 1; anything lower is dropped
    fn enumeration(&mut self, oid: &Oid, value: &ObservationValue) -> Option<i64> {
        let number = self.integer(oid, value)?;
        if number < 1 {
            self.out_of_range(oid, value);
            return None;
        }
        Some(number)
    }

    fn counter(&mut self, oid: &Oid, value: &ObservationValue) -> Option<u64> {
        let number = value.as_u64();
        if number.is_none() {
            self.unexpected(oid, value);
        }
        number
    }

    fn out_of_range(&mut self, oid: &Oid, value: &ObservationValue) {
        log::warn!("{} value {} at {} is out of range, skipped", value.kind(), value.wire_text(), oid);
        self.warnings
            .push(format!("out of range {} value at {}", value.kind(), oid));
    }

    fn unexpected(&mut self, oid: &Oid, value: &ObservationValue) {
        log::warn!("Unexpected {} value at {}, using default", value.kind(), oid);
        self.warnings
            .push(format!("unexpected {} value at {}", value.kind(), oid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(oid: &str, value: ObservationValue) -> Observation {
        Observation::new(oid.parse().unwrap(), value)
    }

    #[test]
    fn test_collect_interfaces() {
        let tables = Tables::collect(&[
            obs("1.3.6.1.2.1.2.2.1.2.3", ObservationValue::OctetString("eth1".into())),
            obs("1.3.6.1.2.1.2.2.1.5.3", ObservationValue::Gauge32(4_294_967_295)),
            obs("1.3.6.1.2.1.2.2.1.6.3", ObservationValue::HexString(vec![0, 2, 0xc9, 1, 2, 3])),
            obs("1.3.6.1.2.1.2.2.1.7.3", ObservationValue::Integer(1)),
            obs("1.3.6.1.2.1.2.2.1.8.3", ObservationValue::Integer(1)),
            obs("1.3.6.1.2.1.2.2.1.14.3", ObservationValue::Counter32(5)),
            obs("1.3.6.1.2.1.31.1.1.1.1.3", ObservationValue::OctetString("ib0".into())),
            obs("1.3.6.1.2.1.31.1.1.1.6.3", ObservationValue::Counter64(1000)),
            obs("1.3.6.1.2.1.31.1.1.1.15.3", ObservationValue::Gauge32(100_000)),
        ]);

        let iface = &tables.interfaces[&3];
        assert_eq!(iface.label(), Some("ib0"));
        assert!(iface.answers_to("eth1"));
        assert_eq!(iface.mac_guid(), Some(NodeGuid::new(0x0002_c901_0203)));
        assert_eq!(iface.counters.rx_errors, 5);
        assert_eq!(iface.counters.rx_octets, 1000);

        let status = iface.status();
        assert_eq!(status.link_state, LinkState::Active);
        assert_eq!(status.phys_state, PhysState::LinkUp);
        assert_eq!(status.active_speed_mbps, 100_000);
        assert_eq!(status.supported_speed_mbps, None);
        assert_eq!(status.active_width, None);
        assert!(tables.warnings.is_empty());
    }

    #[test]
    fn test_speed_falls_back_to_if_speed() {
        let iface = Interface {
            speed_bps: Some(1_000_000_000),
            high_speed_mbps: Some(0),
            ..Interface::default()
        };
        assert_eq!(iface.speed_mbps(), 1000);
    }

    #[test]
    fn test_admin_down_is_disabled() {
        let iface = Interface {
            admin_status: Some(2),
            oper_status: Some(2),
            ..Interface::default()
        };
        let status = iface.status();
        assert_eq!(status.phys_state, PhysState::Disabled);
        assert_eq!(status.link_state, LinkState::Down);
    }

    #[test]
    fn test_collect_lldp() {
        let tables = Tables::collect(&[
            obs("1.0.8802.1.1.2.1.3.2.0", ObservationValue::HexString(vec![0, 1, 2, 3, 4, 5])),
            obs("1.0.8802.1.1.2.1.3.7.1.3.12", ObservationValue::OctetString("Eth1/12".into())),
            obs("1.0.8802.1.1.2.1.4.1.1.5.0.12.1", ObservationValue::HexString(vec![0, 1, 2, 3, 4, 9])),
            obs("1.0.8802.1.1.2.1.4.1.1.7.0.12.1", ObservationValue::OctetString("swp3".into())),
            obs("1.0.8802.1.1.2.1.4.1.1.9.0.12.1", ObservationValue::OctetString("spine-2".into())),
        ]);

        assert_eq!(
            tables.chassis_id,
            Some(ObservationValue::HexString(vec![0, 1, 2, 3, 4, 5]))
        );
        assert_eq!(tables.local_ports[&12].port_id.as_deref(), Some("Eth1/12"));
        let remote = &tables.remotes[&(12, 1)];
        assert_eq!(remote.port_id.as_deref(), Some("swp3"));
        assert_eq!(remote.sys_name.as_deref(), Some("spine-2"));
    }

    #[test]
    fn test_malformed_value_is_defaulted_with_warning() {
        let tables = Tables::collect(&[
            obs("1.3.6.1.2.1.2.2.1.4.1", ObservationValue::OctetString("big".into())),
            obs("1.3.6.1.2.1.2.2.1.2.1", ObservationValue::Integer(7)),
        ]);
        let iface = &tables.interfaces[&1];
        assert_eq!(iface.mtu, None);
        assert_eq!(iface.descr, None);
        assert_eq!(tables.warnings.len(), 2);
    }

    #[test]
    fn test_out_of_range_integers_are_skipped_with_warning() {
        let tables = Tables::collect(&[
            obs("1.3.6.1.2.1.2.2.1.8.4", ObservationValue::Integer(-1)),
            obs("1.3.6.1.2.1.2.2.1.3.4", ObservationValue::Integer(6)),
            obs("1.3.6.1.2.1.2.2.1.4.4", ObservationValue::Counter64(u64::from(u32::MAX) + 1)),
            obs("1.3.6.1.2.1.2.2.1.7.4", ObservationValue::Counter64(u64::MAX)),
        ]);
        let iface = &tables.interfaces[&4];
        assert_eq!(iface.oper_status, None);
        assert_eq!(iface.if_type, Some(6));
        assert_eq!(iface.mtu, None);
        assert_eq!(iface.admin_status, None);
        assert_eq!(tables.warnings.len(), 3);
        assert!(tables.warnings[0].starts_with("out of range"));
    }

    #[test]
    fn test_inventory_keeps_first_entry() {
        let tables = Tables::collect(&[
            obs("1.3.6.1.2.1.47.1.1.1.1.11.1", ObservationValue::OctetString("".into())),
            obs("1.3.6.1.2.1.47.1.1.1.1.11.2", ObservationValue::OctetString("SN123".into())),
            obs("1.3.6.1.2.1.47.1.1.1.1.11.3", ObservationValue::OctetString("SN999".into())),
        ]);
        assert_eq!(tables.inventory.serial.as_deref(), Some("SN123"));
    }
}
