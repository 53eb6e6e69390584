use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

const CONTROLS: [(&str, &str); 6] = [
    ("Tab", "Next"),
    ("←→", "Adjust"),
    ("Space", "Toggle"),
    ("[ ]", "Inspect"),
    ("e", "Export"),
    ("q", "Quit"),
];

/// Key hint bar along the bottom of the dashboard, with an optional status message on the right.
pub struct Controls<'a> {
    pub status: Option<&'a str>,
    pub bg: Color,
    pub status_color: Color,
}

impl Default for Controls<'_> {
    fn default() -> Self {
        Self {
            status: None,
            bg: Color::DarkGray,
            status_color: Color::White,
        }
    }
}

impl<'a> Controls<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }

    pub fn with_colors(mut self, bg: Color, status_color: Color) -> Self {
        self.bg = bg;
        self.status_color = status_color;
        self
    }
}

impl Widget for &Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(Style::default().add_modifier(Modifier::BOLD))
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(Style::default().bg(self.bg))
                .render(layout[j + 1], buf);
        }

        Paragraph::new(self.status.unwrap_or_default())
            .style(Style::default().bg(self.bg).fg(self.status_color))
            .right_aligned()
            .render(layout[CONTROLS.len() * 2], buf);
    }
}
