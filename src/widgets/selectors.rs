//! Dashboard controls: the top-N slider, the facility multiselect and the metric dropdowns.
//! Each draws a rounded block whose border lights up when the control has focus.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::metrics::{Facility, FacilitySelection, Metric};

/// Border and accent colours shared by the selectors.
#[derive(Debug, Clone, Copy)]
pub struct SelectorColors {
    pub border: Color,
    pub active: Color,
    pub text: Color,
    pub dimmed: Color,
}

impl Default for SelectorColors {
    fn default() -> Self {
        Self {
            border: Color::Cyan,
            active: Color::Yellow,
            text: Color::White,
            dimmed: Color::DarkGray,
        }
    }
}

fn selector_block(title: &str, focused: bool, colors: &SelectorColors) -> Block<'static> {
    let border = if focused { colors.active } else { colors.border };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string())
        .border_style(Style::default().fg(border))
}

/// Integer slider over `[min, max]`.
pub struct Slider<'a> {
    pub label: &'a str,
    pub value: u8,
    pub min: u8,
    pub max: u8,
    pub focused: bool,
    pub colors: SelectorColors,
}

impl Slider<'_> {
    /// Track cells before the knob, for a track of `width` cells.
    pub fn knob_offset(&self, width: u16) -> u16 {
        if width <= 1 || self.max <= self.min {
            return 0;
        }
        let value = u32::from(self.value.clamp(self.min, self.max) - self.min);
        let span = u32::from(self.max - self.min);
        ((value * u32::from(width - 1) + span / 2) / span) as u16
    }
}

impl Widget for Slider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = selector_block(self.label, self.focused, &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let min_label = self.min.to_string();
        let max_label = self.max.to_string();
        let value_label = format!(" {:>2}", self.value);
        let reserved = (min_label.len() + max_label.len() + value_label.len() + 2) as u16;
        let track_width = inner.width.saturating_sub(reserved);
        let knob = self.knob_offset(track_width);

        let filled = "━".repeat(knob as usize);
        let rest = "─".repeat(track_width.saturating_sub(knob + 1) as usize);
        let accent = if self.focused {
            self.colors.active
        } else {
            self.colors.border
        };

        let line = Line::from(vec![
            Span::styled(min_label, Style::default().fg(self.colors.dimmed)),
            Span::raw(" "),
            Span::styled(filled, Style::default().fg(accent)),
            Span::styled(
                "●",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(rest, Style::default().fg(self.colors.dimmed)),
            Span::raw(" "),
            Span::styled(max_label, Style::default().fg(self.colors.dimmed)),
            Span::styled(
                value_label,
                Style::default()
                    .fg(self.colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

/// Checkbox list of facilities. The second line lists the selection in the order it was made,
/// which is also the slice order of the pie.
pub struct MultiSelect<'a> {
    pub label: &'a str,
    pub options: &'a [Facility],
    pub selection: &'a FacilitySelection,
    pub cursor: usize,
    pub focused: bool,
    pub colors: SelectorColors,
}

impl Widget for MultiSelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = selector_block(self.label, self.focused, &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = Vec::with_capacity(self.options.len() * 2);
        for (idx, facility) in self.options.iter().enumerate() {
            let checked = self.selection.contains(*facility);
            let marker = if checked { "[x]" } else { "[ ]" };
            let mut style = if checked {
                Style::default().fg(self.colors.text)
            } else {
                Style::default().fg(self.colors.dimmed)
            };
            if self.focused && idx == self.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(
                format!("{} {}", marker, facility.label()),
                style,
            ));
            spans.push(Span::raw("  "));
        }

        let order = if self.selection.is_empty() {
            Span::styled("(none)", Style::default().fg(self.colors.dimmed))
        } else {
            Span::styled(
                self.selection
                    .iter()
                    .map(Facility::label)
                    .collect::<Vec<_>>()
                    .join(", "),
                Style::default().fg(self.colors.border),
            )
        };

        Paragraph::new(vec![
            Line::from(spans),
            Line::from(vec![Span::raw("Selected: "), order]),
        ])
        .render(inner, buf);
    }
}

/// Single-choice metric picker; ←/→ cycle through the options.
pub struct Dropdown<'a> {
    pub label: &'a str,
    pub value: Metric,
    pub focused: bool,
    pub colors: SelectorColors,
}

impl Widget for Dropdown<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = selector_block(self.label, self.focused, &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let arrow_style = if self.focused {
            Style::default().fg(self.colors.active)
        } else {
            Style::default().fg(self.colors.dimmed)
        };
        let line = Line::from(vec![
            Span::styled("◂ ", arrow_style),
            Span::styled(self.value.column(), Style::default().fg(self.colors.text)),
            Span::styled(" ▸", arrow_style),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
