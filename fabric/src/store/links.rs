use super::FabricStore;
use crate::error::StoreError;
use crate::models::{NodeType, PortKey};

/// Aggregate link-category counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkCounters {
    pub total: usize,
    /// Both ends belong to the same system
    pub internal: usize,
    pub external: usize,
    /// At least one end is a host
    pub host_links: usize,
    /// Both ends are switches
    pub switch_links: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkCategory {
    internal: bool,
    host_link: bool,
}

impl LinkCounters {
    fn record(&mut self, category: LinkCategory) {
        self.total += 1;
        if category.internal {
            self.internal += 1;
        } else {
            self.external += 1;
        }
        if category.host_link {
            self.host_links += 1;
        } else {
            self.switch_links += 1;
        }
    }

    fn forget(&mut self, category: LinkCategory) {
        self.total -= 1;
        if category.internal {
            self.internal -= 1;
        } else {
            self.external -= 1;
        }
        if category.host_link {
            self.host_links -= 1;
        } else {
            self.switch_links -= 1;
        }
    }
}

/// One link, enumerated from its canonical "from" side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkView {
    pub from: PortKey,
    pub to: PortKey,
}

impl FabricStore {
    /// Link two ports
    ///
    /// Rejects self-links and ports that are already linked. The "from"
    /// side is the port with the lower node identifier, then the lower
    /// port number.
    pub fn add_link(&mut self, a: PortKey, b: PortKey) -> Result<LinkView, StoreError> {
        if a == b {
            return Err(StoreError::SelfLink(a));
        }
        for key in [a, b] {
            let port = self.port(key).ok_or(StoreError::UnknownPort(key))?;
            if let Some(neighbor) = port.neighbor() {
                return Err(StoreError::AlreadyLinked {
                    port: key,
                    neighbor,
                });
            }
        }

        let category = self.categorize(a, b)?;
        let (from, to) = if a < b { (a, b) } else { (b, a) };

        let from_port = self.port_mut(from).ok_or(StoreError::UnknownPort(from))?;
        from_port.neighbor = Some(to);
        from_port.link_from = true;
        let to_port = self.port_mut(to).ok_or(StoreError::UnknownPort(to))?;
        to_port.neighbor = Some(from);
        to_port.link_from = false;

        self.link_counters.record(category);
        log::debug!("Linked {} -> {}", from, to);
        Ok(LinkView { from, to })
    }

    /// Unlink a port and its neighbor
    pub fn remove_link(&mut self, key: PortKey) -> Result<LinkView, StoreError> {
        let port = self.port(key).ok_or(StoreError::UnknownPort(key))?;
        let neighbor = port.neighbor().ok_or(StoreError::NotLinked(key))?;
        let category = self.categorize(key, neighbor)?;

        let mut from = key;
        for end in [key, neighbor] {
            if let Some(port) = self.port_mut(end) {
                if port.link_from {
                    from = end;
                }
                port.neighbor = None;
                port.link_from = false;
            }
        }

        self.link_counters.forget(category);
        let to = if from == key { neighbor } else { key };
        log::debug!("Unlinked {} -> {}", from, to);
        Ok(LinkView { from, to })
    }

    /// Links in stable order: by "from" node identifier, then port number
    pub fn links(&self) -> impl Iterator<Item = LinkView> + '_ {
        self.nodes().flat_map(|node| {
            node.ports().filter_map(|port| match port.neighbor() {
                Some(to) if port.is_link_from() => Some(LinkView {
                    from: port.key(),
                    to,
                }),
                _ => None,
            })
        })
    }

    pub fn link_counters(&self) -> LinkCounters {
        self.link_counters
    }

    fn categorize(&self, a: PortKey, b: PortKey) -> Result<LinkCategory, StoreError> {
        let node_a = self.node(a.node).ok_or(StoreError::UnknownNode(a.node))?;
        let node_b = self.node(b.node).ok_or(StoreError::UnknownNode(b.node))?;
        Ok(LinkCategory {
            internal: node_a.system() == node_b.system(),
            host_link: node_a.node_type() == NodeType::Host
                || node_b.node_type() == NodeType::Host,
        })
    }
}
