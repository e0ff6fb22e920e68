#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Nodes,
    Links,
    Hosts,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Nodes, Page::Links, Page::Hosts];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Nodes => "Nodes",
            Page::Links => "Links",
            Page::Hosts => "Hosts",
        }
    }

    pub fn next(&self) -> Page {
        match self {
            Page::Nodes => Page::Links,
            Page::Links => Page::Hosts,
            Page::Hosts => Page::Nodes,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::Nodes
    }
}
