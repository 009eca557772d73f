//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Locale, Prediction};
use crate::tui::styles::Theme;

/// Render one prediction in `locale`.
pub fn render_result(f: &mut Frame, area: Rect, prediction: &Prediction, locale: Locale) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], locale);
    render_result_body(f, chunks[1], prediction, locale);
    render_result_footer(f, chunks[2], locale);
}

fn render_result_header(f: &mut Frame, area: Rect, locale: Locale) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Theme::text()),
        Span::styled(locale.pick("Hasil Prediksi", "Prediction Result"), Theme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Theme::border()),
    );

    f.render_widget(header, area);
}

fn render_result_body(f: &mut Frame, area: Rect, prediction: &Prediction, locale: Locale) {
    let report = prediction.report(locale);
    let level_style = Theme::weight_group(prediction.level.group());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Level
            Constraint::Length(3), // BMI
            Constraint::Min(0),    // Advice
        ])
        .margin(1)
        .split(inner);

    let level = Paragraph::new(vec![
        Line::from(Span::styled(
            locale.pick("Tingkat obesitas", "Obesity level"),
            Theme::text_secondary(),
        )),
        Line::from(Span::styled(
            report.display_label,
            level_style.add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(level, chunks[0]);

    let bmi = Paragraph::new(vec![
        Line::from(Span::styled(
            locale.pick("Indeks Massa Tubuh (BMI)", "Body Mass Index (BMI)"),
            Theme::text_secondary(),
        )),
        Line::from(vec![
            Span::styled(report.bmi, Theme::text().add_modifier(Modifier::BOLD)),
            Span::styled(" · ", Theme::text_muted()),
            Span::styled(report.bmi_category, Theme::bmi_category(prediction.bmi.category)),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(bmi, chunks[1]);

    let advice = Paragraph::new(Line::from(Span::styled(report.advisory, Theme::text())))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(locale.pick(" Saran ", " Advice "), Theme::subtitle()))
                .borders(Borders::TOP)
                .border_style(Theme::border()),
        );
    f.render_widget(advice, chunks[2]);
}

fn render_result_footer(f: &mut Frame, area: Rect, locale: Locale) {
    let content = Line::from(vec![
        Span::styled("[Enter/N] ", Theme::key_hint()),
        Span::styled(locale.pick("Formulir baru ", "New form "), Theme::key_desc()),
        Span::styled("[L] ", Theme::key_hint()),
        Span::styled(locale.pick("Bahasa ", "Language "), Theme::key_desc()),
        Span::styled("[Q] ", Theme::key_hint()),
        Span::styled(locale.pick("Keluar", "Quit"), Theme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Theme::border()),
    );

    f.render_widget(footer, area);
}
