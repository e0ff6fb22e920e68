//! Management objects read during a sweep
//!
//! Table column constants are relative to their table entry; an instance
//! identifier is `entry.column.index...`.

// SNMPv2-MIB system group
pub const SYSTEM: &[u32] = &[1, 3, 6, 1, 2, 1, 1];
pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];

// LLDP-MIB local system data
pub const LLDP_LOCAL: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3];
pub const LLDP_LOC_CHASSIS_ID: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3, 2, 0];
pub const LLDP_LOC_SYS_NAME: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3, 3, 0];
pub const LLDP_LOC_PORT_ENTRY: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 3, 7, 1];
pub const LLDP_LOC_PORT_ID: u32 = 3;
pub const LLDP_LOC_PORT_DESC: u32 = 4;

// LLDP-MIB remote systems data, indexed by (timeMark, localPortNum, index)
pub const LLDP_REMOTE: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1];
pub const LLDP_REM_ENTRY: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1];
pub const LLDP_REM_CHASSIS_ID: u32 = 5;
pub const LLDP_REM_PORT_ID: u32 = 7;
pub const LLDP_REM_PORT_DESC: u32 = 8;
pub const LLDP_REM_SYS_NAME: u32 = 9;

// IF-MIB ifTable
pub const IF_TABLE: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2];
pub const IF_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1];
pub const IF_DESCR: u32 = 2;
pub const IF_TYPE: u32 = 3;
pub const IF_MTU: u32 = 4;
pub const IF_SPEED: u32 = 5;
pub const IF_PHYS_ADDRESS: u32 = 6;
pub const IF_ADMIN_STATUS: u32 = 7;
pub const IF_OPER_STATUS: u32 = 8;
pub const IF_IN_DISCARDS: u32 = 13;
pub const IF_IN_ERRORS: u32 = 14;
pub const IF_OUT_DISCARDS: u32 = 19;
pub const IF_OUT_ERRORS: u32 = 20;

// IF-MIB ifXTable
pub const IFX_TABLE: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1];
pub const IFX_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1];
pub const IF_NAME: u32 = 1;
pub const IF_HC_IN_OCTETS: u32 = 6;
pub const IF_HC_IN_UCAST_PKTS: u32 = 7;
pub const IF_HC_OUT_OCTETS: u32 = 10;
pub const IF_HC_OUT_UCAST_PKTS: u32 = 11;
pub const IF_HIGH_SPEED: u32 = 15;

// ENTITY-MIB entPhysicalTable
pub const ENT_PHYSICAL_ENTRY: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1];
pub const ENT_PHYSICAL_DESCR: u32 = 2;
pub const ENT_PHYSICAL_FIRMWARE_REV: u32 = 9;
pub const ENT_PHYSICAL_SOFTWARE_REV: u32 = 10;
pub const ENT_PHYSICAL_SERIAL_NUM: u32 = 11;
pub const ENT_PHYSICAL_MFG_NAME: u32 = 12;
pub const ENT_PHYSICAL_MODEL_NAME: u32 = 13;

/// Inventory columns read (first entries only)
pub const ENT_INVENTORY_COLUMNS: &[u32] = &[
    ENT_PHYSICAL_DESCR,
    ENT_PHYSICAL_FIRMWARE_REV,
    ENT_PHYSICAL_SOFTWARE_REV,
    ENT_PHYSICAL_SERIAL_NUM,
    ENT_PHYSICAL_MFG_NAME,
    ENT_PHYSICAL_MODEL_NAME,
];

/// ifType softwareLoopback
pub const IF_TYPE_SOFTWARE_LOOPBACK: i64 = 24;
