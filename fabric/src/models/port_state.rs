use std::fmt;

/// Logical link state of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Unknown,
    Down,
    Init,
    Armed,
    Active,
}

/// Physical layer state of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysState {
    #[default]
    Unknown,
    Disabled,
    Polling,
    LinkUp,
}

/// Link width (lane count)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkWidth {
    X1,
    X2,
    X4,
    X8,
    X12,
}

impl LinkWidth {
    pub fn from_lanes(lanes: u8) -> Option<Self> {
        match lanes {
            1 => Some(LinkWidth::X1),
            2 => Some(LinkWidth::X2),
            4 => Some(LinkWidth::X4),
            8 => Some(LinkWidth::X8),
            12 => Some(LinkWidth::X12),
            _ => None,
        }
    }

    pub fn lanes(&self) -> u8 {
        match self {
            LinkWidth::X1 => 1,
            LinkWidth::X2 => 2,
            LinkWidth::X4 => 4,
            LinkWidth::X8 => 8,
            LinkWidth::X12 => 12,
        }
    }
}

impl fmt::Display for LinkWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.lanes())
    }
}
