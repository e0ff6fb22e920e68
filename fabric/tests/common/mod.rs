#![allow(dead_code)]

use fabric::transport::{Observation, ObservationValue};

pub const SPINE: [u8; 6] = [0x00, 0x02, 0xc9, 0x00, 0x00, 0x09];
pub const LEAF: [u8; 6] = [0x00, 0x02, 0xc9, 0x00, 0x00, 0x01];
pub const HOST_ETH0: [u8; 6] = [0x52, 0x54, 0x00, 0x00, 0x00, 0x11];
pub const HOST_IB0: [u8; 6] = [0x00, 0x02, 0xc9, 0x00, 0x00, 0x21];

pub fn guid(mac: &[u8; 6]) -> u64 {
    mac.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

pub fn text(oid: &str, value: &str) -> Observation {
    Observation::new(oid.parse().unwrap(), ObservationValue::OctetString(value.into()))
}

pub fn hex(oid: &str, value: &[u8]) -> Observation {
    Observation::new(oid.parse().unwrap(), ObservationValue::HexString(value.to_vec()))
}

pub fn int(oid: &str, value: i64) -> Observation {
    Observation::new(oid.parse().unwrap(), ObservationValue::Integer(value))
}

pub fn gauge(oid: &str, value: u32) -> Observation {
    Observation::new(oid.parse().unwrap(), ObservationValue::Gauge32(value))
}

/// A local switch port: LLDP port number, name, interface index, speed in Mb/s
pub struct SwitchPort<'a> {
    pub lldp: u32,
    pub name: &'a str,
    pub if_index: u32,
    pub speed: u32,
}

/// A neighbor seen on a local LLDP port
pub struct Neighbor<'a> {
    pub lldp: u32,
    pub chassis: &'a [u8],
    pub port_id: &'a str,
    pub sys_name: &'a str,
}

pub fn switch(name: &str, chassis: &[u8], ports: &[SwitchPort], neighbors: &[Neighbor]) -> Vec<Observation> {
    let mut observations = vec![
        text("1.3.6.1.2.1.1.1.0", "Fabric switch OS 3.9"),
        text("1.3.6.1.2.1.1.5.0", name),
        hex("1.0.8802.1.1.2.1.3.2.0", chassis),
        text("1.0.8802.1.1.2.1.3.3.0", name),
        text("1.3.6.1.2.1.47.1.1.1.1.12.1", "Mellanox"),
        text("1.3.6.1.2.1.47.1.1.1.1.13.1", "SN2700"),
    ];
    for port in ports {
        observations.push(text(&format!("1.0.8802.1.1.2.1.3.7.1.3.{}", port.lldp), port.name));
        observations.push(text(&format!("1.3.6.1.2.1.31.1.1.1.1.{}", port.if_index), port.name));
        observations.push(int(&format!("1.3.6.1.2.1.2.2.1.7.{}", port.if_index), 1));
        observations.push(int(&format!("1.3.6.1.2.1.2.2.1.8.{}", port.if_index), 1));
        observations.push(gauge(&format!("1.3.6.1.2.1.31.1.1.1.15.{}", port.if_index), port.speed));
    }
    for neighbor in neighbors {
        let suffix = format!("0.{}.1", neighbor.lldp);
        observations.push(hex(&format!("1.0.8802.1.1.2.1.4.1.1.5.{}", suffix), neighbor.chassis));
        observations.push(text(&format!("1.0.8802.1.1.2.1.4.1.1.7.{}", suffix), neighbor.port_id));
        observations.push(text(&format!("1.0.8802.1.1.2.1.4.1.1.9.{}", suffix), neighbor.sys_name));
    }
    observations
}

/// A compute node with a management interface and one fabric port
pub fn compute_node(name: &str) -> Vec<Observation> {
    vec![
        text("1.3.6.1.2.1.1.5.0", name),
        text("1.3.6.1.2.1.2.2.1.2.1", "lo"),
        int("1.3.6.1.2.1.2.2.1.3.1", 24),
        text("1.3.6.1.2.1.2.2.1.2.2", "eth0"),
        hex("1.3.6.1.2.1.2.2.1.6.2", &HOST_ETH0),
        int("1.3.6.1.2.1.2.2.1.8.2", 1),
        text("1.3.6.1.2.1.2.2.1.2.3", "ib0"),
        hex("1.3.6.1.2.1.2.2.1.6.3", &HOST_IB0),
        int("1.3.6.1.2.1.2.2.1.8.3", 1),
        gauge("1.3.6.1.2.1.31.1.1.1.15.3", 100_000),
    ]
}

/// spine-1 swp1 <-> leaf-01 Eth1/1, leaf-01 Eth1/2 <-> node-17 ib0
pub fn spine() -> Vec<Observation> {
    switch(
        "spine-1",
        &SPINE,
        &[
            SwitchPort { lldp: 1, name: "swp1", if_index: 11, speed: 100_000 },
            SwitchPort { lldp: 2, name: "swp2", if_index: 12, speed: 100_000 },
        ],
        &[Neighbor { lldp: 1, chassis: &LEAF, port_id: "Eth1/1", sys_name: "leaf-01" }],
    )
}

pub fn leaf() -> Vec<Observation> {
    switch(
        "leaf-01",
        &LEAF,
        &[
            SwitchPort { lldp: 1, name: "Eth1/1", if_index: 101, speed: 100_000 },
            SwitchPort { lldp: 2, name: "Eth1/2", if_index: 102, speed: 100_000 },
        ],
        &[
            Neighbor { lldp: 1, chassis: &SPINE, port_id: "swp1", sys_name: "spine-1" },
            Neighbor { lldp: 2, chassis: &HOST_IB0, port_id: "ib0", sys_name: "node-17" },
        ],
    )
}
