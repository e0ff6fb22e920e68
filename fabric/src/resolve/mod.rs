//! Link resolution
//!
//! Runs once every device record has been committed. Each switch port that
//! reports a neighbor is matched to the neighbor's record by node
//! identifier (or any alias), then to the neighbor's port by the hash of
//! the reported port id, and the two store ports are linked.

use crate::models::{NodeGuid, NodeType, PortKey};
use crate::normalize::{DeviceRecord, NeighborClaim};
use crate::store::FabricStore;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

/// Outcome of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub links_created: usize,
    /// Claims that found a link already in place, e.g. the far end's own claim
    pub already_linked: usize,
    /// Claims naming a node no record answers to
    pub unresolved_nodes: usize,
    /// Claims naming a port id the neighbor never declared
    pub unresolved_ports: usize,
    /// Links rejected by the store
    pub rejected: usize,
    pub speed_mismatches: usize,
}

impl ResolveReport {
    /// Claims that did not end in a link
    pub fn unresolved(&self) -> usize {
        self.unresolved_nodes + self.unresolved_ports + self.rejected
    }
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links created, {} unresolved, {} speed mismatches",
            self.links_created,
            self.unresolved(),
            self.speed_mismatches
        )
    }
}

/// Resolves neighbor claims across a set of device records
pub struct LinkResolver<'r> {
    records: &'r [DeviceRecord],
    by_guid: HashMap<NodeGuid, usize>,
}

impl<'r> LinkResolver<'r> {
    /// Index records by node identifier, then by alias
    ///
    /// A primary identifier always wins over another record's alias.
    pub fn new(records: &'r [DeviceRecord]) -> Self {
        let mut by_guid = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_guid.entry(record.guid()).or_insert(idx);
        }
        for (idx, record) in records.iter().enumerate() {
            for alias in &record.chassis_aliases {
                by_guid.entry(*alias).or_insert(idx);
            }
        }
        Self { records, by_guid }
    }

    pub fn record(&self, guid: NodeGuid) -> Option<&'r DeviceRecord> {
        self.by_guid.get(&guid).map(|idx| &self.records[*idx])
    }

    /// Link every resolvable claim into `store`
    pub fn resolve(&self, store: &mut FabricStore) -> ResolveReport {
        let mut report = ResolveReport::default();

        for record in self.records {
            if record.node.node_type != NodeType::Switch {
                continue;
            }
            for (local, claim) in record.claims() {
                if local.port.is_management() {
                    continue;
                }
                self.resolve_claim(store, local, claim, &mut report);
            }
        }

        info!("Link resolution: {}", report);
        report
    }

    fn resolve_claim(
        &self,
        store: &mut FabricStore,
        local: PortKey,
        claim: &NeighborClaim,
        report: &mut ResolveReport,
    ) {
        let Some(neighbor) = self.record(claim.chassis) else {
            warn!(
                "Port {} reports unknown neighbor {} ({})",
                local,
                claim.chassis,
                claim.system_name.as_deref().unwrap_or("unnamed")
            );
            report.unresolved_nodes += 1;
            return;
        };
        let Some(remote_port) = neighbor.port_by_id(&claim.port_id) else {
            warn!(
                "Port {} reports port {:?} on {} which it never declared",
                local, claim.port_id, neighbor.node.description
            );
            report.unresolved_ports += 1;
            return;
        };
        let remote = PortKey::new(neighbor.guid(), remote_port.number());

        if let Some(port) = store.port(local) {
            if port.neighbor() == Some(remote) {
                debug!("{} <-> {} already linked", local, remote);
                report.already_linked += 1;
                return;
            }
        }

        let speeds = (
            store.port(local).map(|p| p.status().active_speed_mbps),
            store.port(remote).map(|p| p.status().active_speed_mbps),
        );
        match store.add_link(local, remote) {
            Ok(view) => {
                debug!("Linked {} -> {}", view.from, view.to);
                report.links_created += 1;
                if let (Some(a), Some(b)) = speeds {
                    if a != b && a > 0 && b > 0 {
                        warn!(
                            "Link {} <-> {} has mismatched speeds ({} vs {} Mb/s)",
                            local, remote, a, b
                        );
                        report.speed_mismatches += 1;
                    }
                }
            }
            Err(e) => {
                warn!("Link {} <-> {} rejected: {}", local, remote, e);
                report.rejected += 1;
            }
        }
    }
}

/// Resolve all claims in `records` into `store`
pub fn resolve_links(records: &[DeviceRecord], store: &mut FabricStore) -> ResolveReport {
    LinkResolver::new(records).resolve(store)
}
