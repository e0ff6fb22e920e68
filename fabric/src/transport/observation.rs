use super::oid::Oid;
use crate::error::TransportError;
use std::net::Ipv4Addr;

/// Typed value of one polled management object
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    Integer(i64),
    Counter32(u32),
    Counter64(u64),
    Gauge32(u32),
    TimeTicks(u32),
    OctetString(String),
    HexString(Vec<u8>),
    IpAddress(Ipv4Addr),
    ObjectId(Oid),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl ObservationValue {
    /// Parse a value from its wire type name and text
    pub fn parse(kind: &str, text: &str) -> Result<Self, TransportError> {
        let malformed =
            || TransportError::Malformed(format!("invalid {} value {:?}", kind, text));
        let text = text.trim();
        let value = match kind {
            "integer" => ObservationValue::Integer(text.parse().map_err(|_| malformed())?),
            "counter32" => ObservationValue::Counter32(text.parse().map_err(|_| malformed())?),
            "counter64" => ObservationValue::Counter64(text.parse().map_err(|_| malformed())?),
            "gauge32" => ObservationValue::Gauge32(text.parse().map_err(|_| malformed())?),
            "timeticks" => ObservationValue::TimeTicks(text.parse().map_err(|_| malformed())?),
            "octet-string" => ObservationValue::OctetString(text.to_string()),
            "hex-string" => ObservationValue::HexString(parse_hex(text).ok_or_else(malformed)?),
            "ip-address" => ObservationValue::IpAddress(text.parse().map_err(|_| malformed())?),
            "object-id" => ObservationValue::ObjectId(text.parse()?),
            "null" => ObservationValue::Null,
            "no-such-object" => ObservationValue::NoSuchObject,
            "no-such-instance" => ObservationValue::NoSuchInstance,
            "end-of-mib-view" => ObservationValue::EndOfMibView,
            other => {
                return Err(TransportError::Malformed(format!(
                    "unknown value type {:?}",
                    other
                )))
            }
        };
        Ok(value)
    }

    /// Wire type name
    pub fn kind(&self) -> &'static str {
        match self {
            ObservationValue::Integer(_) => "integer",
            ObservationValue::Counter32(_) => "counter32",
            ObservationValue::Counter64(_) => "counter64",
            ObservationValue::Gauge32(_) => "gauge32",
            ObservationValue::TimeTicks(_) => "timeticks",
            ObservationValue::OctetString(_) => "octet-string",
            ObservationValue::HexString(_) => "hex-string",
            ObservationValue::IpAddress(_) => "ip-address",
            ObservationValue::ObjectId(_) => "object-id",
            ObservationValue::Null => "null",
            ObservationValue::NoSuchObject => "no-such-object",
            ObservationValue::NoSuchInstance => "no-such-instance",
            ObservationValue::EndOfMibView => "end-of-mib-view",
        }
    }

    /// Wire text
    pub fn wire_text(&self) -> String {
        match self {
            ObservationValue::Integer(v) => v.to_string(),
            ObservationValue::Counter32(v)
            | ObservationValue::Gauge32(v)
            | ObservationValue::TimeTicks(v) => v.to_string(),
            ObservationValue::Counter64(v) => v.to_string(),
            ObservationValue::OctetString(s) => s.clone(),
            ObservationValue::HexString(bytes) => format_hex(bytes),
            ObservationValue::IpAddress(ip) => ip.to_string(),
            ObservationValue::ObjectId(oid) => oid.to_string(),
            _ => String::new(),
        }
    }

    /// True for the "no value here" markers an agent returns
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            ObservationValue::Null
                | ObservationValue::NoSuchObject
                | ObservationValue::NoSuchInstance
                | ObservationValue::EndOfMibView
        )
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ObservationValue::Integer(v) => u64::try_from(*v).ok(),
            ObservationValue::Counter32(v)
            | ObservationValue::Gauge32(v)
            | ObservationValue::TimeTicks(v) => Some(u64::from(*v)),
            ObservationValue::Counter64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ObservationValue::Integer(v) => Some(*v),
            other => other.as_u64().and_then(|v| i64::try_from(v).ok()),
        }
    }

    /// Human-readable text; hex strings render as colon-separated octets
    pub fn as_text(&self) -> Option<String> {
        match self {
            ObservationValue::OctetString(s) => Some(s.clone()),
            ObservationValue::HexString(bytes) => Some(format_hex(bytes)),
            _ => None,
        }
    }

    /// Raw octets of a string value
    pub fn as_octets(&self) -> Option<Vec<u8>> {
        match self {
            ObservationValue::HexString(bytes) => Some(bytes.clone()),
            ObservationValue::OctetString(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }
}

/// One polled (identifier, type, value) item
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub oid: Oid,
    pub value: ObservationValue,
}

impl Observation {
    pub fn new(oid: Oid, value: ObservationValue) -> Self {
        Self { oid, value }
    }
}

/// Lower-case colon-separated octets
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split([':', ' ', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| u8::from_str_radix(part, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!(
            ObservationValue::parse("integer", "-3").unwrap(),
            ObservationValue::Integer(-3)
        );
        assert_eq!(
            ObservationValue::parse("counter64", "18446744073709551615").unwrap(),
            ObservationValue::Counter64(u64::MAX)
        );
        assert_eq!(
            ObservationValue::parse("hex-string", "00:1B:21:0a:0b:0c").unwrap(),
            ObservationValue::HexString(vec![0x00, 0x1b, 0x21, 0x0a, 0x0b, 0x0c])
        );
        assert_eq!(
            ObservationValue::parse("ip-address", "10.0.0.1").unwrap(),
            ObservationValue::IpAddress(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(
            ObservationValue::parse("no-such-instance", "").unwrap(),
            ObservationValue::NoSuchInstance
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ObservationValue::parse("integer", "ten").is_err());
        assert!(ObservationValue::parse("hex-string", "zz:01").is_err());
        assert!(ObservationValue::parse("opaque", "x").is_err());
    }

    #[test]
    fn test_wire_text_round_trip_for_hex() {
        let value = ObservationValue::HexString(vec![0xaa, 0x01]);
        assert_eq!(value.wire_text(), "aa:01");
        assert_eq!(ObservationValue::parse(value.kind(), &value.wire_text()).unwrap(), value);
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(ObservationValue::Gauge32(100).as_u64(), Some(100));
        assert_eq!(ObservationValue::Integer(-1).as_u64(), None);
        assert_eq!(ObservationValue::Integer(-1).as_i64(), Some(-1));
        assert_eq!(ObservationValue::OctetString("x".into()).as_u64(), None);
    }
}
