//! UI module: View components for the TUI.

pub mod form;
pub mod outcome;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::domain::Flow;
use crate::tui::navigation::NavigationShell;
use crate::tui::styles::MedicalTheme;

/// Heading drawn above the flow menu.
pub const SIDEBAR_TITLE: &str = "Multiple Disease Prediction System";

pub fn render_sidebar(f: &mut Frame, area: Rect, nav: &NavigationShell, focused: bool) {
    let items: Vec<ListItem> = Flow::ALL
        .iter()
        .map(|&flow| {
            let marker = if flow == nav.active() { "● " } else { "  " };
            let style = if flow == nav.active() {
                MedicalTheme::selected()
            } else if focused && flow == nav.highlighted() {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{}", flow.menu_label()),
                style,
            )))
        })
        .collect();

    let border_style = if focused {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };

    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(format!(" {SIDEBAR_TITLE} "), MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    f.render_widget(list, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Predictions are indicative estimates from pre-trained models and do not replace professional medical evaluation.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Open ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
