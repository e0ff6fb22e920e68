use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use fabric::{FabricStore, HostReport, SweepOutcome};

use crate::page::Page;
use crate::widget::selectable_list::SelectableList;

/// Browsable rendition of a finished sweep
pub struct FabricView {
    summary: String,
    nodes: SelectableList,
    links: SelectableList,
    hosts: SelectableList,
}

impl FabricView {
    pub fn new(outcome: &SweepOutcome) -> Self {
        Self {
            summary: outcome.report.to_string(),
            nodes: SelectableList::new("Nodes", node_lines(&outcome.store)),
            links: SelectableList::new("Links", link_lines(&outcome.store)),
            hosts: SelectableList::new("Hosts", host_lines(&outcome.report.hosts)),
        }
    }

    pub fn list_mut(&mut self, page: Page) -> &mut SelectableList {
        match page {
            Page::Nodes => &mut self.nodes,
            Page::Links => &mut self.links,
            Page::Hosts => &mut self.hosts,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, page: Page) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let tabs: Vec<Span> = Page::ALL
            .iter()
            .flat_map(|p| {
                let title = format!(" {} ", p.title());
                let span = if *p == page {
                    Span::styled(title, Style::new().reversed())
                } else {
                    Span::raw(title)
                };
                [span, Span::raw(" ")]
            })
            .chain([Span::raw("  tab: next page  q: quit").dim()])
            .collect();
        frame.render_widget(Paragraph::new(Line::from(tabs)), sections[0]);

        self.list_mut(page).draw(frame, sections[1]);

        frame.render_widget(Paragraph::new(self.summary.as_str()), sections[2]);
    }
}

/// One line per node followed by one indented line per port
pub fn node_lines(store: &FabricStore) -> Vec<String> {
    let mut lines = Vec::new();
    for node in store.nodes() {
        lines.push(format!(
            "{} {:<6} {} ({} ports)",
            node.guid(),
            node.node_type(),
            node.info.description,
            node.info.num_ports
        ));
        for port in node.ports() {
            let name = port.info.name.as_deref().unwrap_or("-");
            let neighbor = match port.neighbor() {
                Some(key) => format!("-> {}", describe_port(store, key)),
                None => String::new(),
            };
            let width = port
                .status()
                .active_width
                .map(|w| format!(" {}", w))
                .unwrap_or_default();
            lines.push(format!(
                "    {:>4} {:<16} {:?} {} Mb/s{} {}",
                port.number(),
                name,
                port.status().link_state,
                port.status().active_speed_mbps,
                width,
                neighbor
            ));
        }
    }
    lines
}

pub fn link_lines(store: &FabricStore) -> Vec<String> {
    store
        .links()
        .map(|link| {
            format!(
                "{} <-> {}",
                describe_port(store, link.from),
                describe_port(store, link.to)
            )
        })
        .collect()
}

pub fn host_lines(hosts: &[HostReport]) -> Vec<String> {
    hosts
        .iter()
        .map(|host| {
            format!(
                "{:<24} {} ({} observations, {} warnings, {:.2?})",
                host.target, host.status, host.observations, host.warnings, host.elapsed
            )
        })
        .collect()
}

fn describe_port(store: &FabricStore, key: fabric::PortKey) -> String {
    let node = store
        .node(key.node)
        .map(|n| n.info.description.clone())
        .unwrap_or_else(|| key.node.to_string());
    let port = store
        .port(key)
        .and_then(|p| p.info.name.clone())
        .unwrap_or_else(|| key.port.to_string());
    format!("{} {}", node, port)
}
