use crate::models::{AddressRange, Lid, PortKey};
use std::collections::{BTreeMap, HashMap};

/// Index of assigned addresses, aware of alias ranges
///
/// Ranges held in the index never overlap, so ordering by base address
/// also orders them by last address.
#[derive(Debug, Default, Clone)]
pub(crate) struct AddressIndex {
    by_base: BTreeMap<u16, (PortKey, AddressRange)>,
    by_port: HashMap<PortKey, u16>,
    address_count: u32,
}

impl AddressIndex {
    /// Holders whose ranges overlap `range`, highest base first
    pub fn overlapping(&self, range: &AddressRange) -> Vec<(PortKey, AddressRange)> {
        let last = range.last().min(u32::from(u16::MAX)) as u16;
        self.by_base
            .range(..=last)
            .rev()
            .take_while(|(_, (_, held))| held.last() >= range.first())
            .map(|(_, entry)| *entry)
            .collect()
    }

    pub fn lookup(&self, lid: Lid) -> Option<PortKey> {
        self.by_base
            .range(..=lid.value())
            .next_back()
            .filter(|(_, (_, range))| range.contains(lid))
            .map(|(_, (key, _))| *key)
    }

    /// Caller must have removed overlapping holders first
    pub fn insert(&mut self, key: PortKey, range: AddressRange) {
        if let Some(previous) = self.remove(key) {
            log::debug!("Replacing address range {} of {}", previous.base, key);
        }
        debug_assert!(self.overlapping(&range).is_empty());
        self.by_base.insert(range.base.value(), (key, range));
        self.by_port.insert(key, range.base.value());
        self.address_count += range.span();
    }

    pub fn remove(&mut self, key: PortKey) -> Option<AddressRange> {
        let base = self.by_port.remove(&key)?;
        let (_, range) = self.by_base.remove(&base)?;
        self.address_count -= range.span();
        Some(range)
    }

    /// Number of addresses in use, counting every alias
    pub fn address_count(&self) -> u32 {
        self.address_count
    }

    #[cfg(test)]
    pub fn recount(&self) -> u32 {
        self.by_base.values().map(|(_, range)| range.span()).sum()
    }
}
