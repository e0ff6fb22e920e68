use std::fmt;

/// Globally unique identifier of a fabric node
///
/// Polled devices derive it from a 48-bit chassis MAC; loaders may carry
/// full 64-bit identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeGuid(u64);

impl NodeGuid {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Build an identifier from raw MAC octets (6 or 8 bytes)
    pub fn from_octets(octets: &[u8]) -> Option<Self> {
        if octets.len() != 6 && octets.len() != 8 {
            return None;
        }
        let value = octets
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        Some(Self(value))
    }

    /// Parse a textual MAC address
    ///
    /// Accepts `00:11:22:33:44:55`, `00-11-22-33-44-55`, `0011.2233.4455`,
    /// space separated octets and a bare 12 digit hex string.
    pub fn parse_mac(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let octets: Vec<u8> = if trimmed.contains([':', '-', ' ']) {
            trimmed
                .split([':', '-', ' '])
                .filter(|part| !part.is_empty())
                .map(|part| u8::from_str_radix(part, 16).ok())
                .collect::<Option<Vec<u8>>>()?
        } else {
            let digits: String = trimmed.chars().filter(|c| *c != '.').collect();
            if !digits.is_ascii() || digits.len() % 2 != 0 {
                return None;
            }
            (0..digits.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
                .collect::<Option<Vec<u8>>>()?
        };

        Self::from_octets(&octets)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl From<u64> for NodeGuid {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
