use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Management object identifier, e.g. `1.3.6.1.2.1.1.5.0`
///
/// Ordering is lexicographic over the numeric components, which is the
/// order a walk visits objects in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn from_slice(components: &[u32]) -> Self {
        Self(components.to_vec())
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &[u32]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Components following `prefix`, or `None` when outside the subtree
    pub fn suffix(&self, prefix: &[u32]) -> Option<&[u32]> {
        self.0.strip_prefix(prefix)
    }

    pub fn child(&self, component: u32) -> Oid {
        let mut components = self.0.clone();
        components.push(component);
        Oid(components)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Oid {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(TransportError::Malformed(format!("empty object identifier {:?}", s)));
        }
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    TransportError::Malformed(format!("invalid object identifier {:?}", s))
                })
            })
            .collect::<Result<Vec<u32>, _>>()
            .map(Oid)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}

impl From<&[u32]> for Oid {
    fn from(components: &[u32]) -> Self {
        Self::from_slice(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let oid: Oid = ".1.3.6.1.2.1.1.5.0".parse().unwrap();
        assert_eq!(oid.components(), &[1, 3, 6, 1, 2, 1, 1, 5, 0]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Oid>().is_err());
        assert!("1.3.x.1".parse::<Oid>().is_err());
        assert!("1..3".parse::<Oid>().is_err());
    }

    #[test]
    fn test_walk_order() {
        let a: Oid = "1.3.6.1.2.1.2.2.1.2.10".parse().unwrap();
        let b: Oid = "1.3.6.1.2.1.2.2.1.2.9".parse().unwrap();
        let c: Oid = "1.3.6.1.2.1.2.2.1.3".parse().unwrap();
        assert!(b < a);
        assert!(a < c);
    }

    #[test]
    fn test_suffix() {
        let oid: Oid = "1.3.6.1.2.1.2.2.1.2.10".parse().unwrap();
        assert_eq!(oid.suffix(&[1, 3, 6, 1, 2, 1, 2, 2, 1]), Some(&[2, 10][..]));
        assert_eq!(oid.suffix(&[1, 3, 6, 1, 4]), None);
        assert!(oid.starts_with(&[1, 3, 6, 1]));
    }
}
