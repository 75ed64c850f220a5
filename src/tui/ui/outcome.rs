//! Outcome panel below the form.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::Outcome;
use crate::tui::styles::MedicalTheme;

/// What the outcome panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutcomeState {
    /// Nothing predicted since the last edit or flow change.
    #[default]
    Idle,
    Ready { outcome: Outcome },
    Error { message: String },
}

impl OutcomeState {
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Self::Ready { outcome } => Some(outcome),
            _ => None,
        }
    }
}

pub fn render_outcome(f: &mut Frame, area: Rect, state: &OutcomeState) {
    let (border_style, lines) = match state {
        OutcomeState::Idle => (
            MedicalTheme::border(),
            vec![Line::from(Span::styled(
                "Fill in the values and press [Enter] to get the test result.",
                MedicalTheme::text_muted(),
            ))],
        ),
        OutcomeState::Ready { outcome } => {
            let style = MedicalTheme::severity(outcome.severity);
            (
                style,
                vec![
                    Line::from(vec![
                        Span::styled(format!("{} ", outcome.severity.icon()), style),
                        Span::styled(outcome.headline.clone(), style),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(outcome.detail.clone(), MedicalTheme::text())),
                ],
            )
        }
        OutcomeState::Error { message } => (
            MedicalTheme::danger(),
            vec![Line::from(vec![
                Span::styled("! ", MedicalTheme::danger()),
                Span::styled(message.clone(), MedicalTheme::danger()),
            ])],
        ),
    };

    let block = Block::default()
        .title(Span::styled(" Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
