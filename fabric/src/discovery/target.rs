use crate::error::FabricError;
use regex::Regex;
use std::fmt;

/// What kind of device a target is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    Switch,
    Host,
    /// Decide from whether the agent reports local neighbor-discovery data
    #[default]
    Auto,
}

impl DeviceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "switch" => Some(DeviceKind::Switch),
            "host" => Some(DeviceKind::Host),
            "auto" => Some(DeviceKind::Auto),
            _ => None,
        }
    }
}

/// Credentials presented to a management agent
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub community: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    pub fn community(community: impl Into<String>) -> Self {
        Self {
            community: Some(community.into()),
            token: None,
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            community: None,
            token: Some(token.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("community", &self.community.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Include and exclude patterns applied to interface names
///
/// An interface passes when it matches any include pattern (or none are
/// configured) and matches no exclude pattern.
#[derive(Debug, Clone, Default)]
pub struct InterfaceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl InterfaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, pattern: &str) -> Result<Self, FabricError> {
        self.include.push(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn exclude(mut self, pattern: &str) -> Result<Self, FabricError> {
        self.exclude.push(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn allows(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(name));
        included && !self.exclude.iter().any(|r| r.is_match(name))
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// One configured management endpoint
#[derive(Debug, Clone)]
pub struct Target {
    /// Name used in logs and reports; unique within a sweep
    pub name: String,
    /// Agent base URL, e.g. `http://10.0.0.1:8161`
    pub url: String,
    pub kind: DeviceKind,
    pub credentials: Credentials,
    pub filter: InterfaceFilter,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: DeviceKind::Auto,
            credentials: Credentials::default(),
            filter: InterfaceFilter::default(),
        }
    }

    pub fn switch(mut self) -> Self {
        self.kind = DeviceKind::Switch;
        self
    }

    pub fn host(mut self) -> Self {
        self.kind = DeviceKind::Host;
        self
    }

    pub fn with_kind(mut self, kind: DeviceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_filter(mut self, filter: InterfaceFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
