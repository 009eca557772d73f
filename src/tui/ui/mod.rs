//! UI module: View components for the TUI.

pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::Locale;
use crate::tui::styles::Theme;

pub fn render_disclaimer(f: &mut Frame, area: Rect, locale: Locale) {
    let text = vec![Line::from(vec![Span::styled(
        locale.pick(
            "Hasil ini hanya perkiraan dan tidak menggantikan pemeriksaan oleh tenaga kesehatan.",
            "This result is an estimate and does not replace an assessment by a health professional.",
        ),
        Theme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Theme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
