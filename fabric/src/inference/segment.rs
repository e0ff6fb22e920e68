use crate::error::InferenceError;

/// Names split into more runs than this are rejected
pub const MAX_SEGMENTS: usize = 16;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// One alphabetic or numeric run of an interface name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Hash of the run text salted with its position in the name
    pub key: u64,
    /// Integer value of numeric runs
    pub value: Option<u32>,
}

impl Segment {
    pub fn is_numeric(&self) -> bool {
        self.value.is_some()
    }
}

/// Split `name` into alternating non-digit and digit runs
///
/// Fails when the name has no numeric run, too many runs, or a numeric
/// run that does not fit a port index.
pub fn segment(name: &str) -> Result<Vec<Segment>, InferenceError> {
    let invalid = |reason: &str| InferenceError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let mut runs: Vec<(bool, &str)> = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in name.char_indices() {
        let numeric = ch.is_ascii_digit();
        match current {
            Some(kind) if kind == numeric => {}
            Some(kind) => {
                runs.push((kind, &name[start..idx]));
                start = idx;
                current = Some(numeric);
            }
            None => current = Some(numeric),
        }
    }
    match current {
        Some(kind) => runs.push((kind, &name[start..])),
        None => return Err(invalid("empty name")),
    }

    if runs.len() > MAX_SEGMENTS {
        return Err(invalid("too many segments"));
    }
    if !runs.iter().any(|(numeric, _)| *numeric) {
        return Err(invalid("no numeric segment"));
    }

    runs.into_iter()
        .enumerate()
        .map(|(position, (numeric, text))| {
            let value = if numeric {
                let value: u32 = text
                    .parse()
                    .map_err(|_| invalid("numeric segment out of range"))?;
                if value > u32::from(u16::MAX) {
                    return Err(invalid("numeric segment out of range"));
                }
                Some(value)
            } else {
                None
            };
            Ok(Segment {
                key: salted_hash(position, text),
                value,
            })
        })
        .collect()
}

fn salted_hash(position: usize, text: &str) -> u64 {
    let salted = (position as u64).to_le_bytes();
    fnv1a(salted.iter().chain(text.as_bytes()))
}

/// 64-bit FNV-1a over a byte sequence
pub(crate) fn fnv1a<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u64 {
    bytes
        .into_iter()
        .fold(FNV_OFFSET, |acc, b| (acc ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Combine segment keys into one order-sensitive key
pub fn combine(keys: impl IntoIterator<Item = u64>) -> u64 {
    let bytes: Vec<u8> = keys.into_iter().flat_map(u64::to_le_bytes).collect();
    fnv1a(&bytes)
}
