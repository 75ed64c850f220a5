//! Input form for the active flow.
//!
//! One numeric input per schema field, laid out in three columns. A field
//! pinned to a column goes there; otherwise field `i` lands in column
//! `i % 3`. Rows scroll to keep the selection visible.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{FieldSpec, Flow, InputVector, SchemaError};
use crate::tui::styles::MedicalTheme;

/// Columns per form row.
pub const COLUMNS: usize = 3;

const FIELD_HEIGHT: u16 = 3;

/// One numeric input.
///
/// `value` is always within the field's bounds and keeps every digit the
/// user typed; precision only affects how it is shown. While the user is
/// typing, the raw text lives in `buffer` and is committed (parsed and
/// clamped) when the field loses focus or the form is submitted.
#[derive(Debug, Clone)]
pub struct FieldInput {
    definition: &'static FieldSpec,
    value: f64,
    buffer: Option<String>,
}

impl FieldInput {
    #[must_use]
    pub fn new(definition: &'static FieldSpec) -> Self {
        Self {
            definition,
            value: definition.default,
            buffer: None,
        }
    }

    /// Committed value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    /// Text shown in the input box. Values finer than the display precision
    /// are shown in full.
    #[must_use]
    pub fn display(&self) -> String {
        if let Some(buf) = &self.buffer {
            return buf.clone();
        }
        let formatted = self.definition.format(self.value);
        if formatted.parse::<f64>() == Ok(self.value) {
            formatted
        } else {
            self.value.to_string()
        }
    }

    pub fn set_value(&mut self, value: f64) {
        self.buffer = None;
        self.value = self.definition.clamp(value);
    }

    /// Type a character. The first keystroke replaces the shown value.
    ///
    /// Returns `false` if the character is not valid for this field.
    pub fn input_char(&mut self, c: char) -> bool {
        let buf = self.buffer.get_or_insert_with(String::new);
        let accepted = match c {
            '0'..='9' => true,
            '.' => !self.definition.is_integer() && !buf.contains('.'),
            '-' => self.definition.allows_negative() && buf.is_empty(),
            _ => false,
        };
        if accepted {
            buf.push(c);
        } else if buf.is_empty() {
            self.buffer = None;
        }
        accepted
    }

    pub fn delete_char(&mut self) {
        let shown = self.display();
        let buf = self.buffer.get_or_insert(shown);
        buf.pop();
    }

    /// Start over with an empty input.
    pub fn clear(&mut self) {
        self.buffer = Some(String::new());
    }

    /// Parse and clamp the typed text. Unparseable text restores the last value.
    pub fn commit(&mut self) {
        if let Some(buf) = self.buffer.take() {
            match buf.parse::<f64>() {
                Ok(v) if v.is_finite() => self.value = self.definition.clamp(v),
                _ => {
                    if !buf.is_empty() {
                        tracing::debug!(
                            "Discarding unparseable input for {}",
                            self.definition.name
                        );
                    }
                }
            }
        }
    }

    /// Move the value by `steps` increments of the field's precision.
    ///
    /// A value on the precision grid stays on it; a finer value keeps its
    /// extra digits.
    pub fn step(&mut self, steps: i32) {
        self.commit();
        let on_grid = self.definition.round(self.value) == self.value;
        let next = self
            .definition
            .clamp(self.value + f64::from(steps) * self.definition.step());
        self.value = if on_grid {
            self.definition.round(next)
        } else {
            next
        };
    }
}

/// Form state for one flow.
#[derive(Debug, Clone)]
pub struct FormState {
    flow: Flow,
    fields: Vec<FieldInput>,
    /// Field indices per column, top to bottom.
    columns: Vec<Vec<usize>>,
    selected: usize,
}

/// Group field indices by the column they are drawn in.
fn column_layout(fields: &[FieldSpec]) -> Vec<Vec<usize>> {
    let mut columns = vec![Vec::new(); COLUMNS];
    for (index, field) in fields.iter().enumerate() {
        let column = field
            .column
            .map_or(index % COLUMNS, usize::from)
            .min(COLUMNS - 1);
        columns[column].push(index);
    }
    columns
}

impl FormState {
    /// Fresh form with every field at its default.
    #[must_use]
    pub fn new(flow: Flow) -> Self {
        let schema = flow.schema();
        Self {
            flow,
            fields: schema.fields.iter().map(FieldInput::new).collect(),
            columns: column_layout(schema.fields),
            selected: 0,
        }
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldInput] {
        &self.fields
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FieldInput> {
        self.fields.get_mut(index)
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self {
            selected: self.selected,
            ..Self::new(self.flow)
        };
    }

    fn select(&mut self, index: usize) {
        if index < self.fields.len() && index != self.selected {
            self.fields[self.selected].commit();
            self.selected = index;
        }
    }

    pub fn next_field(&mut self) {
        self.select((self.selected + 1) % self.fields.len().max(1));
    }

    pub fn prev_field(&mut self) {
        let len = self.fields.len().max(1);
        self.select((self.selected + len - 1) % len);
    }

    /// Column and row of a field in the layout.
    fn position(&self, index: usize) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col, fields)| {
            fields.iter().position(|&i| i == index).map(|row| (col, row))
        })
    }

    /// Select the field at `row` of `col`, or the column's last field if it
    /// is shorter.
    fn select_at(&mut self, col: usize, row: usize) {
        let target = self
            .columns
            .get(col)
            .and_then(|fields| fields.get(row).or_else(|| fields.last()).copied());
        if let Some(index) = target {
            self.select(index);
        }
    }

    pub fn move_up(&mut self) {
        if let Some((col, row)) = self.position(self.selected) {
            if row > 0 {
                self.select_at(col, row - 1);
            }
        }
    }

    pub fn move_down(&mut self) {
        if let Some((col, row)) = self.position(self.selected) {
            if row + 1 < self.columns[col].len() {
                self.select_at(col, row + 1);
            }
        }
    }

    pub fn move_left(&mut self) {
        if let Some((col, row)) = self.position(self.selected) {
            if let Some(target) = (0..col).rev().find(|&c| !self.columns[c].is_empty()) {
                self.select_at(target, row);
            }
        }
    }

    pub fn move_right(&mut self) {
        if let Some((col, row)) = self.position(self.selected) {
            if let Some(target) = (col + 1..COLUMNS).find(|&c| !self.columns[c].is_empty()) {
                self.select_at(target, row);
            }
        }
    }

    pub fn input_char(&mut self, c: char) -> bool {
        self.fields
            .get_mut(self.selected)
            .is_some_and(|field| field.input_char(c))
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.delete_char();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.clear();
        }
    }

    pub fn step(&mut self, steps: i32) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.step(steps);
        }
    }

    /// Committed values in schema order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.fields.iter().map(FieldInput::value).collect()
    }

    /// Commit pending edits and assemble the feature vector.
    ///
    /// # Errors
    /// Returns a `SchemaError` if the values do not fit the flow's schema.
    pub fn input_vector(&mut self) -> Result<InputVector, SchemaError> {
        for field in &mut self.fields {
            field.commit();
        }
        InputVector::new(self.flow, self.values())
    }
}

pub fn render_form(f: &mut Frame, area: Rect, state: &FormState, focused: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(FIELD_HEIGHT), // Fields
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_form_header(f, chunks[0], state.flow);
    render_form_fields(f, chunks[1], state, focused);
    render_form_footer(f, chunks[2], state.flow);
}

fn render_form_header(f: &mut Frame, area: Rect, flow: Flow) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(flow.title(), MedicalTheme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// First visible row so that `selected_row` stays on screen.
fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    if selected_row >= visible_rows {
        selected_row + 1 - visible_rows
    } else {
        0
    }
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState, focused: bool) {
    let visible_rows = usize::from((area.height / FIELD_HEIGHT).max(1));
    let selected_row = state.position(state.selected).map_or(0, |(_, row)| row);
    let first_row = first_visible_row(selected_row, visible_rows);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            (0..visible_rows)
                .map(|_| Constraint::Length(FIELD_HEIGHT))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(area);

    for (row_offset, row_area) in rows.iter().take(visible_rows).enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
            .split(*row_area);

        for (cell, fields) in columns.iter().zip(&state.columns) {
            let Some(&index) = fields.get(first_row + row_offset) else {
                continue;
            };
            if let Some(field) = state.fields.get(index) {
                render_field(f, *cell, field, focused && index == state.selected);
            }
        }
    }
}

fn render_field(f: &mut Frame, area: Rect, field: &FieldInput, is_selected: bool) {
    let (border_style, title_style) = if is_selected {
        (MedicalTheme::border_focused(), MedicalTheme::focused())
    } else {
        (MedicalTheme::border(), MedicalTheme::text_secondary())
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.definition.label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(field.display(), MedicalTheme::text()),
    ];
    if is_selected {
        spans.push(Span::styled("▌", MedicalTheme::cursor()));
    }
    spans.push(Span::styled(
        format!("  {}", field.definition.range_hint()),
        MedicalTheme::text_muted(),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, flow: Flow) {
    let content = Line::from(vec![
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled(
            format!("{} Test Result ", predict_action(flow)),
            MedicalTheme::key_desc(),
        ),
        Span::styled("[↑↓←→/Tab] ", MedicalTheme::key_hint()),
        Span::styled("Move ", MedicalTheme::key_desc()),
        Span::styled("[PgUp/PgDn] ", MedicalTheme::key_hint()),
        Span::styled("Step ", MedicalTheme::key_desc()),
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Reset ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Menu", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

/// Name of the predict action for a flow.
fn predict_action(flow: Flow) -> &'static str {
    match flow {
        Flow::Diabetes => "Diabetes",
        Flow::Heart => "Heart Disease",
        Flow::Parkinsons => "Parkinson's",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(flow: Flow, name: &str) -> usize {
        flow.schema()
            .names()
            .position(|n| n == name)
            .expect("Field should exist")
    }

    #[test]
    fn test_new_form_holds_defaults() {
        for flow in Flow::ALL {
            let mut form = FormState::new(flow);
            let vector = form.input_vector().expect("Defaults should assemble");
            assert_eq!(vector, InputVector::defaults(flow));
        }
    }

    #[test]
    fn test_typed_value_is_clamped_on_commit() {
        let mut form = FormState::new(Flow::Diabetes);
        let glucose = index_of(Flow::Diabetes, "Glucose");
        form.select(glucose);

        for c in "250".chars() {
            assert!(form.input_char(c));
        }
        assert_eq!(form.fields()[glucose].display(), "250");

        let vector = form.input_vector().expect("Should assemble");
        assert_eq!(vector.get("Glucose"), Some(200.0));
    }

    #[test]
    fn test_integer_field_rejects_decimal_point() {
        let mut field = FieldInput::new(
            Flow::Diabetes
                .schema()
                .field("Age")
                .expect("Age field"),
        );
        assert!(!field.input_char('.'));
        assert!(!field.input_char('-'));
        assert!(!field.is_editing());
        assert!(field.input_char('4'));
        assert!(!field.input_char('.'));
        field.commit();
        assert_eq!(field.value(), 4.0);
    }

    #[test]
    fn test_decimal_field_accepts_one_point() {
        let mut field = FieldInput::new(Flow::Diabetes.schema().field("BMI").expect("BMI field"));
        for c in "31.5".chars() {
            assert!(field.input_char(c));
        }
        assert!(!field.input_char('.'));
        field.commit();
        assert_eq!(field.value(), 31.5);
        assert_eq!(field.display(), "31.50");
    }

    #[test]
    fn test_unbounded_field_accepts_negative() {
        let mut field =
            FieldInput::new(Flow::Parkinsons.schema().field("spread1").expect("spread1 field"));
        for c in "-5.7".chars() {
            assert!(field.input_char(c));
        }
        assert!(!field.input_char('-'));
        field.commit();
        assert_eq!(field.value(), -5.7);
    }

    #[test]
    fn test_unparseable_input_restores_value() {
        let mut field =
            FieldInput::new(Flow::Parkinsons.schema().field("HNR").expect("HNR field"));
        field.set_value(21.5);
        field.input_char('-');
        field.commit();
        assert_eq!(field.value(), 21.5);

        field.clear();
        field.commit();
        assert_eq!(field.value(), 21.5);
    }

    #[test]
    fn test_backspace_edits_shown_value() {
        let mut field = FieldInput::new(
            Flow::Diabetes
                .schema()
                .field("Glucose")
                .expect("Glucose field"),
        );
        field.delete_char();
        assert_eq!(field.display(), "11");
        field.commit();
        assert_eq!(field.value(), 11.0);
    }

    #[test]
    fn test_step_respects_precision_and_bounds() {
        let mut field = FieldInput::new(Flow::Diabetes.schema().field("BMI").expect("BMI field"));
        field.step(3);
        assert_eq!(field.display(), "25.03");

        let mut sex = FieldInput::new(Flow::Heart.schema().field("sex").expect("sex field"));
        sex.step(1);
        assert_eq!(sex.value(), 1.0);
        sex.step(-5);
        assert_eq!(sex.value(), 0.0);
    }

    #[test]
    fn test_grid_navigation() {
        // Diabetes: columns [0, 3, 6], [1, 4, 7], [2, 5].
        let mut form = FormState::new(Flow::Diabetes);
        form.move_down();
        assert_eq!(form.selected(), 3);
        form.move_right();
        form.move_right();
        form.move_right();
        assert_eq!(form.selected(), 5);
        form.move_up();
        assert_eq!(form.selected(), 2);
        form.move_up();
        assert_eq!(form.selected(), 2);

        for _ in 0..5 {
            form.move_down();
        }
        assert_eq!(form.selected(), 5);
        form.move_left();
        form.move_down();
        assert_eq!(form.selected(), 7);
        // The third column is one row shorter.
        form.move_right();
        assert_eq!(form.selected(), 5);

        form.select(7);
        form.next_field();
        assert_eq!(form.selected(), 0);
        form.prev_field();
        assert_eq!(form.selected(), 7);
    }

    #[test]
    fn test_heart_layout_follows_field_columns() {
        let form = FormState::new(Flow::Heart);
        let names = |col: usize| -> Vec<&'static str> {
            form.columns[col]
                .iter()
                .map(|&i| form.fields()[i].definition.name)
                .collect()
        };
        assert_eq!(names(0), ["age", "trestbps", "restecg", "oldpeak", "thal"]);
        assert_eq!(names(1), ["sex", "chol", "thalach", "slope", "ca"]);
        assert_eq!(names(2), ["cp", "fbs", "exang"]);

        let mut form = FormState::new(Flow::Heart);
        let thal = index_of(Flow::Heart, "thal");
        form.select(thal);
        form.move_right();
        assert_eq!(form.selected(), index_of(Flow::Heart, "ca"));
        form.move_right();
        assert_eq!(form.selected(), index_of(Flow::Heart, "exang"));
        form.move_down();
        assert_eq!(form.selected(), index_of(Flow::Heart, "exang"));
        form.move_left();
        form.move_up();
        assert_eq!(form.selected(), index_of(Flow::Heart, "chol"));

        // Vector order is unaffected by the layout.
        let vector = form.input_vector().expect("Should assemble");
        assert_eq!(vector, InputVector::defaults(Flow::Heart));
    }

    #[test]
    fn test_typed_digits_beyond_display_precision_are_kept() {
        let mut form = FormState::new(Flow::Parkinsons);
        form.select(index_of(Flow::Parkinsons, "MDVP:Jitter(Abs)"));
        for c in "0.00003".chars() {
            assert!(form.input_char(c));
        }
        form.next_field();

        let jitter = &form.fields()[index_of(Flow::Parkinsons, "MDVP:Jitter(Abs)")];
        assert_eq!(jitter.value(), 3e-5);
        assert_eq!(jitter.display(), "0.00003");
        let vector = form.input_vector().expect("Should assemble");
        assert_eq!(vector.get("MDVP:Jitter(Abs)"), Some(3e-5));

        let mut bmi = FieldInput::new(Flow::Diabetes.schema().field("BMI").expect("BMI field"));
        for c in "31.456".chars() {
            assert!(bmi.input_char(c));
        }
        bmi.commit();
        assert_eq!(bmi.value(), 31.456);
        assert_eq!(bmi.display(), "31.456");

        // Stepping a finer value keeps its extra digits.
        bmi.step(1);
        assert!((bmi.value() - 31.466).abs() < 1e-9);
    }

    /// In-range value with more decimals than the field displays.
    fn fine_value(index: usize, field: &FieldSpec) -> f64 {
        if field.is_integer() {
            if field.default + 1.0 <= field.max {
                field.default + 1.0
            } else {
                field.default - 1.0
            }
        } else if field.min.is_finite() && field.max.is_finite() {
            (field.min + field.max) / 2.0 + 0.000037
        } else {
            let magnitude = index as f64 * 1.25 + 0.000037;
            if index % 2 == 1 {
                -magnitude
            } else {
                magnitude
            }
        }
    }

    #[test]
    fn test_typed_values_reach_vector_unchanged() {
        for flow in Flow::ALL {
            let mut form = FormState::new(flow);
            let mut expected = Vec::new();

            for (index, field) in flow.schema().fields.iter().enumerate() {
                assert_eq!(form.selected(), index);
                let value = fine_value(index, field);
                assert!(field.min <= value && value <= field.max);
                for c in value.to_string().chars() {
                    assert!(form.input_char(c), "{} should accept {c:?}", field.name);
                }
                expected.push(value);
                form.next_field();
            }

            let vector = form.input_vector().expect("Should assemble");
            assert_eq!(vector.flow(), flow);
            assert_eq!(vector.values(), expected.as_slice(), "{flow} vector changed");
        }
    }

    #[test]
    fn test_leaving_a_field_commits_it() {
        let mut form = FormState::new(Flow::Diabetes);
        form.input_char('3');
        form.next_field();
        assert!(!form.fields()[0].is_editing());
        assert_eq!(form.values()[0], 3.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = FormState::new(Flow::Heart);
        form.field_mut(4).expect("chol field").set_value(350.0);
        form.next_field();
        form.reset();
        assert_eq!(form.values(), Flow::Heart.schema().defaults());
        assert_eq!(form.selected(), 1);
    }

    #[test]
    fn test_first_visible_row() {
        assert_eq!(first_visible_row(0, 4), 0);
        assert_eq!(first_visible_row(3, 4), 0);
        assert_eq!(first_visible_row(7, 4), 4);
    }
}
