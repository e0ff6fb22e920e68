/// Snapshot of a port's traffic and error counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortCounters {
    pub rx_octets: u64,
    pub tx_octets: u64,
    pub rx_unicast_packets: u64,
    pub tx_unicast_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_discards: u64,
    pub tx_discards: u64,
}

impl PortCounters {
    pub fn total_errors(&self) -> u64 {
        self.rx_errors
            .saturating_add(self.tx_errors)
            .saturating_add(self.rx_discards)
            .saturating_add(self.tx_discards)
    }
}
