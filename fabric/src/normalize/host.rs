use super::record::{DeviceRecord, PortDraft};
use super::tables::{Interface, Tables};
use super::{device_name, number_ports};
use crate::discovery::Target;
use crate::error::NormalizeError;
use crate::models::NodeType;
use crate::store::{NodeInfo, PortInfo};
use crate::transport::format_hex;

/// Build a host record from its interface tables
///
/// The node is identified by the lowest-indexed non-loopback interface with
/// a hardware address; every such address is kept as an alias.
pub(super) fn build(target: &Target, tables: &Tables) -> Result<DeviceRecord, NormalizeError> {
    let physical: Vec<&Interface> = tables
        .interfaces
        .values()
        .filter(|iface| !iface.is_loopback())
        .collect();

    let guid = physical
        .iter()
        .find_map(|iface| iface.mac_guid())
        .ok_or_else(|| {
            NormalizeError::Unidentified(format!(
                "{} reports no interface with a hardware address",
                target.name
            ))
        })?;

    let description = device_name(target, &[tables.sys_name.as_ref(), tables.sys_descr.as_ref()]);
    let mut record = DeviceRecord::new(NodeInfo::new(guid, NodeType::Host).with_description(description));
    for alias in physical.iter().filter_map(|iface| iface.mac_guid()) {
        if !record.chassis_aliases.contains(&alias) {
            record.chassis_aliases.push(alias);
        }
    }

    let mut kept: Vec<(&Interface, &str)> = Vec::new();
    for iface in physical.iter().copied() {
        let Some(label) = iface.label() else {
            record.warn(format!("interface {} has no name, skipped", iface.if_index));
            continue;
        };
        if !target.filter.allows(label) {
            log::debug!("{}: {:?} filtered out", target.name, label);
            continue;
        }
        kept.push((iface, label));
    }

    let names: Vec<(&str, u32)> = kept.iter().map(|(iface, label)| (*label, iface.if_index)).collect();
    let numbers = number_ports(&mut record, &names);

    for ((iface, label), number) in kept.into_iter().zip(numbers) {
        let Some(number) = number else { continue };

        let mut port_ids = vec![label.to_string()];
        if let Some(descr) = iface.descr.as_deref() {
            if descr != label && !descr.is_empty() {
                port_ids.push(descr.to_string());
            }
        }
        if let Some(mac) = iface.mac.as_deref().filter(|_| iface.mac_guid().is_some()) {
            port_ids.push(format_hex(mac));
        }

        let mut info = PortInfo::new(number).with_name(label);
        info.port_guid = iface.mac_guid();
        info.if_index = Some(iface.if_index);
        info.status = iface.status();
        record.push_port(PortDraft {
            info,
            port_ids,
            neighbor: None,
        });
    }

    record.node.num_ports = u16::try_from(record.ports.len()).unwrap_or(u16::MAX);
    Ok(record)
}
