//! Per-device normalization
//!
//! Turns the observations polled from one host into a [`DeviceRecord`]:
//! a node draft, numbered port drafts, the neighbor each port reports and
//! the identifiers the device may be known by. Pure and per-device, so it
//! runs inside the polling task.

mod host;
pub mod mib;
mod record;
mod switch;
mod tables;

pub use record::{
    chassis_guid, port_id_hash, CommitOutcome, DeviceRecord, NeighborClaim, PortDraft,
};

use crate::discovery::Target;
use crate::error::NormalizeError;
use crate::inference::PortNumberer;
use crate::models::{NodeType, PortNum};
use crate::transport::Observation;
use std::collections::HashSet;
use tables::Tables;

/// Normalize one device's observations
pub fn normalize(
    target: &Target,
    node_type: NodeType,
    observations: &[Observation],
) -> Result<DeviceRecord, NormalizeError> {
    let mut tables = Tables::collect(observations);
    let decode_warnings = std::mem::take(&mut tables.warnings);

    let mut record = match node_type {
        NodeType::Switch => switch::build(target, &tables)?,
        NodeType::Host => host::build(target, &tables)?,
    };
    record.warnings.splice(0..0, decode_warnings);

    log::debug!(
        "{}: normalized {} {} with {} ports, {} neighbor claims",
        target.name,
        node_type,
        record.guid(),
        record.ports.len(),
        record.claims().count()
    );
    Ok(record)
}

/// Human name of a device: sysName, then the given fallbacks, then the target name
fn device_name(target: &Target, candidates: &[Option<&String>]) -> String {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| target.name.clone())
}

/// Number each `(name, device index)` pair
///
/// Names the inference engine rejects fall back to their device index.
/// Returns `None` for entries that end up with no usable number.
fn number_ports(record: &mut DeviceRecord, names: &[(&str, u32)]) -> Vec<Option<PortNum>> {
    let mut numberer = PortNumberer::new();
    let mut inferred = Vec::with_capacity(names.len());
    for (name, _) in names {
        match numberer.register(name) {
            Ok(()) => inferred.push(true),
            Err(e) => {
                record.warn(format!("{}; using device index", e));
                inferred.push(false);
            }
        }
    }

    let mut taken: HashSet<PortNum> = record.ports.iter().map(|p| p.number()).collect();
    let mut numbers = Vec::with_capacity(names.len());
    for ((name, index), inferred) in names.iter().zip(inferred) {
        let number = if inferred {
            numberer.get_port(name).ok()
        } else {
            None
        };
        let number = number.or_else(|| u16::try_from(*index).ok().map(PortNum::new));
        let number = match number {
            Some(n) if n.is_management() => {
                record.warn(format!("{:?} maps to reserved port 0, skipped", name));
                None
            }
            Some(n) if !taken.insert(n) => {
                record.warn(format!("{:?} maps to port {} which is taken, skipped", name, n));
                None
            }
            Some(n) => Some(n),
            None => {
                record.warn(format!("{:?} has no usable port number, skipped", name));
                None
            }
        };
        numbers.push(number);
    }
    numbers
}
