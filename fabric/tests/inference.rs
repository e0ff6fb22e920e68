use fabric::{InferenceError, PortNum, PortNumberer};
use std::collections::HashMap;

fn assign(names: &[&str]) -> HashMap<String, PortNum> {
    let mut numberer = PortNumberer::new();
    for name in names {
        numberer.register(name).unwrap();
    }
    names
        .iter()
        .map(|name| (name.to_string(), numberer.get_port(name).unwrap()))
        .collect()
}

fn breakout_switch() -> Vec<String> {
    let mut names = Vec::new();
    for port in 1..=16 {
        for lane in 1..=4 {
            names.push(format!("Ethernet1/{}/{}", port, lane));
        }
    }
    names.push("mgmt0".to_string());
    names
}

#[test]
fn test_assignment_ignores_registration_order() {
    let names = breakout_switch();
    let forward: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut interleaved: Vec<&str> = forward.iter().step_by(2).copied().collect();
    interleaved.extend(forward.iter().skip(1).step_by(2).copied());

    let expected = assign(&forward);
    assert_eq!(assign(&reversed), expected);
    assert_eq!(assign(&interleaved), expected);
}

#[test]
fn test_numbers_are_unique_and_never_zero() {
    let names = breakout_switch();
    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let assigned = assign(&refs);

    let mut seen: Vec<PortNum> = assigned.values().copied().collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), names.len());
    assert!(seen.iter().all(|n| !n.is_management()));
}

#[test]
fn test_mixed_host_interfaces() {
    let assigned = assign(&["eth0", "eth1", "ib0", "ib1"]);
    // Both groups start at index 0; one is laid out after the other
    assert_eq!(assigned["eth1"].value(), assigned["eth0"].value() + 1);
    assert_eq!(assigned["ib1"].value(), assigned["ib0"].value() + 1);
    let mut all: Vec<u16> = assigned.values().map(|n| n.value()).collect();
    all.sort();
    assert_eq!(all, vec![1, 2, 3, 4]);
}

#[test]
fn test_names_without_digits_are_rejected() {
    let mut numberer = PortNumberer::new();
    numberer.register("swp1").unwrap();
    let err = numberer.register("bond-uplink").unwrap_err();
    assert!(matches!(err, InferenceError::InvalidName { .. }));
    assert_eq!(numberer.get_port("swp1").unwrap(), PortNum::new(1));
}
