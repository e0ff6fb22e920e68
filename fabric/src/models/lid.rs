use std::fmt;

/// Fabric-local address of an end port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lid(u16);

impl Lid {
    pub const UNASSIGNED: Lid = Lid(0);
    pub const MAX_UNICAST: Lid = Lid(0xbfff);

    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Lid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contiguous block of addresses owned by one port
///
/// An alias range of `lmc` covers `2^lmc` addresses starting at `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub base: Lid,
    pub lmc: u8,
}

impl AddressRange {
    pub const MAX_LMC: u8 = 7;

    /// Returns `None` when the range is unassigned or does not fit the unicast space
    pub fn new(base: Lid, lmc: u8) -> Option<Self> {
        if !base.is_assigned() || lmc > Self::MAX_LMC {
            return None;
        }
        let range = Self { base, lmc };
        if range.last() > u32::from(Lid::MAX_UNICAST.value()) {
            return None;
        }
        Some(range)
    }

    pub fn span(&self) -> u32 {
        1u32 << self.lmc
    }

    pub fn first(&self) -> u32 {
        u32::from(self.base.value())
    }

    pub fn last(&self) -> u32 {
        self.first() + self.span() - 1
    }

    pub fn contains(&self, lid: Lid) -> bool {
        let value = u32::from(lid.value());
        value >= self.first() && value <= self.last()
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_range_span() {
        let range = AddressRange::new(Lid::new(16), 2).unwrap();
        assert_eq!(range.span(), 4);
        assert_eq!(range.last(), 19);
        assert!(range.contains(Lid::new(19)));
        assert!(!range.contains(Lid::new(20)));
    }

    #[test]
    fn test_address_range_rejects_invalid() {
        assert!(AddressRange::new(Lid::UNASSIGNED, 0).is_none());
        assert!(AddressRange::new(Lid::new(1), 8).is_none());
        assert!(AddressRange::new(Lid::MAX_UNICAST, 1).is_none());
        assert!(AddressRange::new(Lid::MAX_UNICAST, 0).is_some());
    }

    #[test]
    fn test_overlaps() {
        let a = AddressRange::new(Lid::new(8), 3).unwrap(); // 8..=15
        let b = AddressRange::new(Lid::new(15), 0).unwrap();
        let c = AddressRange::new(Lid::new(16), 0).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
