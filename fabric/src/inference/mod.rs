//! Port-number inference
//!
//! Assigns canonical port numbers to one device's free-form interface
//! names. Each name is split into runs; the numeric run whose key is the
//! least repeated across the device is taken as the port index, the other
//! runs form the name's group. Groups whose index ranges collide are laid
//! out one after another, largest group first.

mod segment;

pub use segment::MAX_SEGMENTS;
pub(crate) use segment::fnv1a;

use crate::error::InferenceError;
use crate::models::PortNum;
use segment::{combine, segment, Segment};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy)]
struct Candidate {
    group: u64,
    value: u32,
}

#[derive(Debug, Clone, Copy)]
struct GroupStats {
    key: u64,
    members: usize,
    min: u32,
    max: u32,
}

/// Port-number inference engine for one device
#[derive(Debug, Default)]
pub struct PortNumberer {
    names: BTreeMap<String, Vec<Segment>>,
    assigned: Option<HashMap<String, u32>>,
}

impl PortNumberer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface name; repeated registration is a no-op
    pub fn register(&mut self, name: &str) -> Result<(), InferenceError> {
        if self.assigned.is_some() {
            return Err(InferenceError::AlreadyFinalized {
                name: name.to_string(),
            });
        }
        if self.names.contains_key(name) {
            return Ok(());
        }
        let segments = segment(name)?;
        self.names.insert(name.to_string(), segments);
        Ok(())
    }

    /// Port number of a registered name
    ///
    /// The first call assigns numbers to every registered name.
    pub fn get_port(&mut self, name: &str) -> Result<PortNum, InferenceError> {
        self.finalize();
        let value = self
            .assigned
            .as_ref()
            .and_then(|assigned| assigned.get(name))
            .copied()
            .ok_or_else(|| InferenceError::NotFound {
                name: name.to_string(),
            })?;
        u16::try_from(value)
            .map(PortNum::new)
            .map_err(|_| InferenceError::InvalidName {
                name: name.to_string(),
                reason: format!("port number {} out of range", value),
            })
    }

    pub fn is_finalized(&self) -> bool {
        self.assigned.is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Assign numbers to all registered names; later calls do nothing
    pub fn finalize(&mut self) {
        if self.assigned.is_some() {
            return;
        }

        let mut frequency: HashMap<u64, usize> = HashMap::new();
        for segments in self.names.values() {
            for seg in segments {
                *frequency.entry(seg.key).or_insert(0) += 1;
            }
        }

        let mut candidates: Vec<(&String, Candidate)> = self
            .names
            .iter()
            .filter_map(|(name, segments)| {
                candidate(segments, &frequency).map(|candidate| (name, candidate))
            })
            .collect();
        separate_duplicates(&mut candidates);

        let mut groups: HashMap<u64, GroupStats> = HashMap::new();
        for (_, candidate) in &candidates {
            groups
                .entry(candidate.group)
                .and_modify(|stats| {
                    stats.members += 1;
                    stats.min = stats.min.min(candidate.value);
                    stats.max = stats.max.max(candidate.value);
                })
                .or_insert(GroupStats {
                    key: candidate.group,
                    members: 1,
                    min: candidate.value,
                    max: candidate.value,
                });
        }

        let offsets = layout(groups.into_values().collect());
        let assigned: HashMap<String, u32> = candidates
            .into_iter()
            .map(|(name, candidate)| {
                let offset = offsets.get(&candidate.group).copied().unwrap_or(0);
                (name.clone(), candidate.value + offset)
            })
            .collect();

        log::debug!(
            "Assigned port numbers to {} interface names in {} groups",
            assigned.len(),
            offsets.len()
        );
        self.assigned = Some(assigned);
    }
}

/// Pick the least repeated numeric run, preferring the later one on ties
fn candidate(segments: &[Segment], frequency: &HashMap<u64, usize>) -> Option<Candidate> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, seg) in segments.iter().enumerate() {
        if !seg.is_numeric() {
            continue;
        }
        let count = frequency.get(&seg.key).copied().unwrap_or(0);
        match best {
            Some((_, best_count)) if count > best_count => {}
            _ => best = Some((idx, count)),
        }
    }

    let (port_idx, _) = best?;
    let value = segments[port_idx].value?;
    let group = combine(
        segments
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != port_idx)
            .map(|(_, seg)| seg.key)
            .chain(std::iter::once(port_idx as u64)),
    );
    Some(Candidate { group, value })
}

/// Give names that read the same index within a group distinct values
///
/// "swp1" and "swp01" both read index 1. The shortest spelling keeps it and
/// the others move past the group's highest index, in name order.
fn separate_duplicates(candidates: &mut [(&String, Candidate)]) {
    let mut highest: HashMap<u64, u32> = HashMap::new();
    for (_, candidate) in candidates.iter() {
        let top = highest.entry(candidate.group).or_insert(candidate.value);
        *top = (*top).max(candidate.value);
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|a, b| {
        let (name_a, a) = &candidates[*a];
        let (name_b, b) = &candidates[*b];
        a.group
            .cmp(&b.group)
            .then(a.value.cmp(&b.value))
            .then(name_a.len().cmp(&name_b.len()))
            .then(name_a.cmp(name_b))
    });

    let mut taken: HashSet<(u64, u32)> = HashSet::new();
    for idx in order {
        let (name, candidate) = &mut candidates[idx];
        if taken.insert((candidate.group, candidate.value)) {
            continue;
        }
        let top = highest.entry(candidate.group).or_insert(candidate.value);
        *top += 1;
        log::debug!(
            "{:?} repeats port index {}, moved to {}",
            name,
            candidate.value,
            *top
        );
        candidate.value = *top;
        taken.insert((candidate.group, candidate.value));
    }
}

/// Offset per group so that colliding ranges follow one another
///
/// Groups are placed by descending size, then ascending first index, then
/// group key. A group starting at index 0 moves up by one since port 0 is
/// reserved.
fn layout(mut groups: Vec<GroupStats>) -> HashMap<u64, u32> {
    groups.sort_by(|a, b| {
        b.members
            .cmp(&a.members)
            .then(a.min.cmp(&b.min))
            .then(a.key.cmp(&b.key))
    });

    let mut placed: Vec<(u32, u32)> = Vec::new();
    let mut offsets = HashMap::new();
    for group in groups {
        let mut offset = if group.min == 0 { 1 } else { 0 };
        let start = group.min + offset;
        let end = group.max + offset;
        let collides = placed.iter().any(|(lo, hi)| start <= *hi && *lo <= end);
        if collides {
            let highest = placed.iter().map(|(_, hi)| *hi).max().unwrap_or(0);
            offset += highest + 1 - start;
        }
        placed.push((group.min + offset, group.max + offset));
        offsets.insert(group.key, offset);
    }
    offsets
}
