use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub struct SelectableList {
    title: String,
    items: Vec<String>,
    state: ListState,
}

impl SelectableList {
    pub fn new(title: &str, items: Vec<String>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            items,
            title: title.to_string(),
            state,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .map(|s| ListItem::new(s.as_str()))
            .collect();

        let list = List::new(list_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({})", self.title, self.items.len())),
            )
            .highlight_style(Style::new().reversed())
            .highlight_symbol(">> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = self.state.selected().unwrap_or(0);
        self.state.select(Some((i + 1) % self.items.len()));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
