use super::observation::{Observation, ObservationValue};
use super::oid::Oid;
use crate::error::TransportError;
use serde::Deserialize;

/// One page request of a subtree walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkRequest {
    pub root: Oid,
    /// Resume after this identifier; `None` starts at the root
    pub cursor: Option<Oid>,
    pub max_repetitions: u32,
}

impl WalkRequest {
    pub fn new(root: Oid, max_repetitions: u32) -> Self {
        Self {
            root,
            cursor: None,
            max_repetitions,
        }
    }

    pub fn resume(&self, cursor: Oid) -> Self {
        Self {
            root: self.root.clone(),
            cursor: Some(cursor),
            max_repetitions: self.max_repetitions,
        }
    }

    pub fn to_xml(&self) -> String {
        let cursor = self
            .cursor
            .as_ref()
            .map(|c| format!("<Cursor>{}</Cursor>", c))
            .unwrap_or_default();
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <Walk root=\"{}\" max-repetitions=\"{}\">{}</Walk>",
            self.root, self.max_repetitions, cursor
        )
    }

    pub fn from_xml(xml: &str) -> Result<Self, TransportError> {
        let raw: XmlWalk = quick_xml::de::from_str(xml)?;
        Ok(Self {
            root: raw.root.parse()?,
            cursor: raw.cursor.as_deref().map(str::parse).transpose()?,
            max_repetitions: raw.max_repetitions,
        })
    }
}

/// One page of walk results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkPage {
    pub observations: Vec<Observation>,
    /// Continuation cursor; `None` when the subtree is exhausted
    pub next: Option<Oid>,
    /// Items dropped or defaulted because they could not be decoded
    pub malformed: usize,
}

impl WalkPage {
    /// Decode an agent response
    ///
    /// An item with an unreadable identifier is dropped, an item with an
    /// unreadable value keeps its identifier with a null value. Both are
    /// counted in `malformed`.
    pub fn from_xml(xml: &str) -> Result<Self, TransportError> {
        let raw: XmlWalkResponse = quick_xml::de::from_str(xml)?;
        if let Some(fault) = raw.fault {
            return Err(TransportError::Fault(fault.trim().to_string()));
        }

        let mut page = WalkPage::default();
        for item in raw.var_binds {
            let oid: Oid = match item.oid.parse() {
                Ok(oid) => oid,
                Err(e) => {
                    log::warn!("Dropping item: {}", e);
                    page.malformed += 1;
                    continue;
                }
            };
            let value = match ObservationValue::parse(&item.kind, &item.value) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Item {} has an unreadable value: {}", oid, e);
                    page.malformed += 1;
                    ObservationValue::Null
                }
            };
            page.observations.push(Observation::new(oid, value));
        }
        page.next = raw.more.map(|m| m.cursor.parse()).transpose()?;
        Ok(page)
    }

    pub fn to_xml(&self) -> String {
        let mut body = String::new();
        for observation in &self.observations {
            body.push_str(&format!(
                "<VarBind oid=\"{}\" type=\"{}\">{}</VarBind>",
                observation.oid,
                observation.value.kind(),
                html_escape::encode_text(&observation.value.wire_text())
            ));
        }
        if let Some(next) = &self.next {
            body.push_str(&format!("<More cursor=\"{}\"/>", next));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<WalkResponse>{}</WalkResponse>",
            body
        )
    }
}

/// Fault document an agent returns instead of a page
pub fn fault_xml(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<WalkResponse><Fault>{}</Fault></WalkResponse>",
        html_escape::encode_text(message)
    )
}

/// Answer `request` from observations sorted in walk order
///
/// Returns at most `max_repetitions` items of the requested subtree that
/// follow the cursor, with a continuation cursor when more remain.
pub fn serve_walk(observations: &[Observation], request: &WalkRequest) -> WalkPage {
    let root = request.root.components();
    let start = match &request.cursor {
        Some(cursor) => observations.partition_point(|o| &o.oid <= cursor),
        None => observations.partition_point(|o| o.oid.components() < root),
    };
    let mut subtree = observations[start..]
        .iter()
        .take_while(|o| o.oid.starts_with(root));

    let limit = request.max_repetitions.max(1) as usize;
    let items: Vec<Observation> = subtree.by_ref().take(limit).cloned().collect();
    let next = if subtree.next().is_some() {
        items.last().map(|o| o.oid.clone())
    } else {
        None
    };
    WalkPage {
        observations: items,
        next,
        malformed: 0,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Walk")]
struct XmlWalk {
    #[serde(rename = "@root")]
    root: String,
    #[serde(rename = "@max-repetitions")]
    max_repetitions: u32,
    #[serde(rename = "Cursor", default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "WalkResponse")]
struct XmlWalkResponse {
    #[serde(rename = "VarBind", default)]
    var_binds: Vec<XmlVarBind>,
    #[serde(rename = "More", default)]
    more: Option<XmlMore>,
    #[serde(rename = "Fault", default)]
    fault: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlVarBind {
    #[serde(rename = "@oid")]
    oid: String,
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct XmlMore {
    #[serde(rename = "@cursor")]
    cursor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(oid: &str, value: i64) -> Observation {
        Observation::new(oid.parse().unwrap(), ObservationValue::Integer(value))
    }

    #[test]
    fn test_request_xml() {
        let request = WalkRequest::new("1.3.6.1.2.1.1".parse().unwrap(), 16)
            .resume("1.3.6.1.2.1.1.5.0".parse().unwrap());
        let xml = request.to_xml();
        assert!(xml.contains("root=\"1.3.6.1.2.1.1\""));
        assert!(xml.contains("<Cursor>1.3.6.1.2.1.1.5.0</Cursor>"));
        assert_eq!(WalkRequest::from_xml(&xml).unwrap(), request);
    }

    #[test]
    fn test_parse_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <WalkResponse>
              <VarBind oid="1.3.6.1.2.1.1.5.0" type="octet-string">leaf-01 &amp; co</VarBind>
              <VarBind oid="1.3.6.1.2.1.2.2.1.5.1" type="gauge32">100000000</VarBind>
              <VarBind oid="1.3.6.1.2.1.2.2.1.8.1" type="integer">up</VarBind>
              <VarBind oid="bogus" type="integer">1</VarBind>
              <More cursor="1.3.6.1.2.1.2.2.1.8.1"/>
            </WalkResponse>"#;
        let page = WalkPage::from_xml(xml).unwrap();

        assert_eq!(page.observations.len(), 3);
        assert_eq!(
            page.observations[0].value,
            ObservationValue::OctetString("leaf-01 & co".to_string())
        );
        assert_eq!(page.observations[1].value, ObservationValue::Gauge32(100_000_000));
        assert_eq!(page.observations[2].value, ObservationValue::Null);
        assert_eq!(page.malformed, 2);
        assert_eq!(page.next, Some("1.3.6.1.2.1.2.2.1.8.1".parse().unwrap()));
    }

    #[test]
    fn test_parse_fault() {
        let err = WalkPage::from_xml(&fault_xml("bad community")).unwrap_err();
        assert!(matches!(err, TransportError::Fault(ref m) if m == "bad community"));
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let err = WalkPage::from_xml("<WalkResponse><VarBind").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn test_serve_walk_paginates_subtree() {
        let observations = vec![
            obs("1.3.6.1.2.1.1.1.0", 1),
            obs("1.3.6.1.2.1.2.2.1.1.1", 2),
            obs("1.3.6.1.2.1.2.2.1.1.2", 3),
            obs("1.3.6.1.2.1.2.2.1.1.3", 4),
            obs("1.3.6.1.2.1.31.1.1.1.1.1", 5),
        ];
        let request = WalkRequest::new("1.3.6.1.2.1.2.2".parse().unwrap(), 2);

        let first = serve_walk(&observations, &request);
        assert_eq!(first.observations.len(), 2);
        let cursor = first.next.clone().unwrap();
        assert_eq!(cursor, "1.3.6.1.2.1.2.2.1.1.2".parse().unwrap());

        let second = serve_walk(&observations, &request.resume(cursor));
        assert_eq!(second.observations, vec![obs("1.3.6.1.2.1.2.2.1.1.3", 4)]);
        assert_eq!(second.next, None);
    }

    #[test]
    fn test_page_xml_round_trip() {
        let page = WalkPage {
            observations: vec![Observation::new(
                "1.3.6.1.2.1.1.5.0".parse().unwrap(),
                ObservationValue::OctetString("a<b".to_string()),
            )],
            next: Some("1.3.6.1.2.1.1.5.0".parse().unwrap()),
            malformed: 0,
        };
        assert_eq!(WalkPage::from_xml(&page.to_xml()).unwrap(), page);
    }
}
