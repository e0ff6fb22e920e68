use super::record::{chassis_guid, DeviceRecord, NeighborClaim, PortDraft};
use super::tables::{Interface, Tables};
use super::{device_name, number_ports};
use crate::discovery::Target;
use crate::error::NormalizeError;
use crate::models::{LinkState, NodeGuid, NodeType, PhysState, PortNum};
use crate::store::{NodeInfo, PortInfo, PortStatus};

struct LocalCandidate<'t> {
    lldp_port: u32,
    port_id: &'t str,
    iface: Option<&'t Interface>,
}

/// Build a switch record from LLDP local/remote data and the interface tables
pub(super) fn build(target: &Target, tables: &Tables) -> Result<DeviceRecord, NormalizeError> {
    let description = device_name(
        target,
        &[tables.sys_name.as_ref(), tables.lldp_sys_name.as_ref(), tables.sys_descr.as_ref()],
    );

    let mut fallback_identity = false;
    let guid = match tables.chassis_id.as_ref().and_then(chassis_guid) {
        Some(guid) => guid,
        None => {
            fallback_identity = true;
            tables
                .interfaces
                .values()
                .filter(|iface| !iface.is_loopback())
                .find_map(Interface::mac_guid)
                .ok_or_else(|| {
                    NormalizeError::Unidentified(format!(
                        "{} reports no chassis id and no hardware address",
                        target.name
                    ))
                })?
        }
    };

    let inventory = &tables.inventory;
    let mut node = NodeInfo::new(guid, NodeType::Switch).with_description(description);
    node.vendor = inventory.vendor.clone();
    node.model = inventory.model.clone().or_else(|| inventory.descr.clone());
    node.serial = inventory.serial.clone();
    node.firmware = inventory.firmware.clone().or_else(|| inventory.software.clone());

    let mut record = DeviceRecord::new(node);
    if fallback_identity {
        record.warn("no local chassis id, identified by interface address".to_string());
    }

    record.push_port(management_port(guid));

    let mut candidates = Vec::new();
    for (lldp_port, local) in &tables.local_ports {
        let Some(port_id) = local.port_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            record.warn(format!("local port {} has no port id, skipped", lldp_port));
            continue;
        };
        // Port ids are matched to interfaces by their literal name
        let iface = tables.interfaces.values().find(|i| i.answers_to(port_id));
        if iface.is_none() {
            log::debug!("{}: no interface named {:?}", target.name, port_id);
        }
        let filter_name = iface.and_then(Interface::label).unwrap_or(port_id);
        if !target.filter.allows(filter_name) {
            log::debug!("{}: {:?} filtered out", target.name, filter_name);
            continue;
        }
        candidates.push(LocalCandidate {
            lldp_port: *lldp_port,
            port_id,
            iface,
        });
    }

    let names: Vec<(&str, u32)> = candidates
        .iter()
        .map(|c| (c.port_id, c.lldp_port))
        .collect();
    let numbers = number_ports(&mut record, &names);

    for (candidate, number) in candidates.iter().zip(numbers) {
        let Some(number) = number else { continue };
        let neighbor = neighbor_claim(&mut record, tables, candidate.lldp_port);

        let mut info = PortInfo::new(number).with_name(candidate.port_id);
        if let Some(iface) = candidate.iface {
            info.if_index = Some(iface.if_index);
            info.status = iface.status();
        }
        record.push_port(PortDraft {
            info,
            port_ids: vec![candidate.port_id.to_string()],
            neighbor,
        });
    }

    record.node.num_ports = u16::try_from(record.ports.len().saturating_sub(1)).unwrap_or(u16::MAX);
    Ok(record)
}

/// Port 0, the switch's own management port; it carries the port identifier
fn management_port(guid: NodeGuid) -> PortDraft {
    let info = PortInfo {
        port_guid: Some(guid),
        status: PortStatus {
            link_state: LinkState::Active,
            phys_state: PhysState::LinkUp,
            ..PortStatus::default()
        },
        ..PortInfo::new(PortNum::MANAGEMENT)
    };
    PortDraft {
        info,
        port_ids: Vec::new(),
        neighbor: None,
    }
}

/// Neighbor reported on a local port; the lowest remote index wins
fn neighbor_claim(record: &mut DeviceRecord, tables: &Tables, lldp_port: u32) -> Option<NeighborClaim> {
    let mut entries = tables
        .remotes
        .range((lldp_port, 0)..=(lldp_port, u32::MAX))
        .map(|(_, entry)| entry);
    let entry = entries.next()?;
    let extra = entries.count();
    if extra > 0 {
        record.warn(format!(
            "local port {} reports {} neighbors, using the first",
            lldp_port,
            extra + 1
        ));
    }

    let Some(chassis) = entry.chassis.as_ref().and_then(chassis_guid) else {
        record.warn(format!("neighbor on local port {} has no chassis id", lldp_port));
        return None;
    };
    let Some(port_id) = entry.port_id.clone().filter(|id| !id.trim().is_empty()) else {
        record.warn(format!("neighbor on local port {} has no port id", lldp_port));
        return None;
    };
    Some(NeighborClaim {
        chassis,
        port_id,
        port_desc: entry.port_desc.clone(),
        system_name: entry.sys_name.clone(),
    })
}
