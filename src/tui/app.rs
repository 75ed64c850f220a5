//! Main TUI application state machine.
//!
//! Handles:
//! - Flow selection from the sidebar
//! - Input event handling for the active form
//! - Synchronous inference on the predict action

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::JsonArtifactLoader;
use crate::application::{InferenceService, ModelRegistry};
use crate::config::AppConfig;
use crate::domain::{Flow, Outcome};
use crate::PolydiagnoseError;

use super::navigation::NavigationShell;
use super::ui::{
    form::{render_form, FormState},
    outcome::{render_outcome, OutcomeState},
    render_disclaimer, render_sidebar,
};

const SIDEBAR_WIDTH: u16 = 40;

/// Which panel receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Form,
}

/// Main application state
pub struct App {
    nav: NavigationShell,
    focus: Focus,

    /// Whether the app should quit
    should_quit: bool,

    inference_service: InferenceService,

    form_state: FormState,
    outcome_state: OutcomeState,
}

impl App {
    /// Load every flow's artifacts and build the application.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or any artifact fails
    /// to load. The UI never starts with a partial registry.
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let loader = JsonArtifactLoader::new(&config.model_dir, config.require_manifest)
            .with_context(|| format!("Failed to open model directory {:?}", config.model_dir))?;
        let registry = ModelRegistry::load(config, &loader)?;

        Ok(Self::with_dependencies(InferenceService::new(Arc::new(
            registry,
        ))))
    }

    /// Create application with an injected inference service.
    #[must_use]
    pub fn with_dependencies(inference_service: InferenceService) -> Self {
        let nav = NavigationShell::default();
        Self {
            form_state: FormState::new(nav.active()),
            nav,
            focus: Focus::Sidebar,
            should_quit: false,
            inference_service,
            outcome_state: OutcomeState::Idle,
        }
    }

    #[must_use]
    pub fn active_flow(&self) -> Flow {
        self.nav.active()
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub fn form_state(&self) -> &FormState {
        &self.form_state
    }

    #[must_use]
    pub fn outcome_state(&self) -> &OutcomeState {
        &self.outcome_state
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            // Redraw only in response to input
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Render the whole page.
    pub fn draw(&self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(chunks[0]);

        let page = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(5)])
            .split(columns[1]);

        render_sidebar(f, columns[0], &self.nav, self.focus == Focus::Sidebar);
        render_form(f, page[0], &self.form_state, self.focus == Focus::Form);
        render_outcome(f, page[1], &self.outcome_state);
        render_disclaimer(f, chunks[1]);
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Form => self.handle_form_key(key),
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.nav.highlight_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.nav.highlight_next(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right | KeyCode::Tab => {
                self.select_flow(self.nav.highlighted());
                self.focus = Focus::Form;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let index = usize::from(c as u8 - b'1');
                if let Some(flow) = Flow::from_index(index) {
                    self.select_flow(flow);
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.focus = Focus::Sidebar;
            }
            KeyCode::Up => self.form_state.move_up(),
            KeyCode::Down => self.form_state.move_down(),
            KeyCode::Left => self.form_state.move_left(),
            KeyCode::Right => self.form_state.move_right(),
            KeyCode::Tab => self.form_state.next_field(),
            KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::PageUp | KeyCode::Char('+') => {
                self.form_state.step(1);
                self.input_changed();
            }
            KeyCode::PageDown => {
                self.form_state.step(-1);
                self.input_changed();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.form_state.reset();
                self.input_changed();
            }
            KeyCode::Char(c) => {
                if self.form_state.input_char(c) {
                    self.input_changed();
                }
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
                self.input_changed();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
                self.input_changed();
            }
            KeyCode::Enter => self.predict(),
            _ => {}
        }
    }

    /// Make `flow` active. Re-selecting the active flow changes nothing.
    pub fn select_flow(&mut self, flow: Flow) {
        if self.nav.select(flow) {
            tracing::debug!("Switched to {} flow", flow);
            self.form_state = FormState::new(flow);
            self.outcome_state = OutcomeState::Idle;
        }
    }

    /// A shown result belongs to the inputs it was computed from.
    fn input_changed(&mut self) {
        self.outcome_state = OutcomeState::Idle;
    }

    /// Assemble the active form and run inference on it.
    pub fn predict(&mut self) {
        let flow = self.nav.active();
        let result = self
            .form_state
            .input_vector()
            .map_err(PolydiagnoseError::from)
            .and_then(|input| self.inference_service.run_inference(flow, &input));

        self.outcome_state = match result {
            Ok(prediction) => OutcomeState::Ready {
                outcome: Outcome::from_prediction(&prediction),
            },
            Err(e) => {
                tracing::warn!("Prediction failed for {} flow: {}", flow, e);
                OutcomeState::Error {
                    message: e.to_string(),
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::FlowModels;
    use crate::domain::{InputVector, Label, Severity};
    use crate::ports::{Classifier, ModelError};
    use ratatui::backend::TestBackend;

    fn shipped_app() -> App {
        let config = AppConfig::from_lookup(|_| None).expect("Default config should resolve");
        App::new(&config).expect("Shipped models should load")
    }

    fn screen_text(app: &App) -> String {
        let mut terminal =
            Terminal::new(TestBackend::new(160, 48)).expect("Should create test terminal");
        terminal.draw(|f| app.draw(f)).expect("Should draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    /// Classifier that declares a feature list the heart schema does not have.
    struct Misaligned {
        names: Vec<String>,
    }

    impl Classifier for Misaligned {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict(&self, _x: &[f64]) -> Result<Label, ModelError> {
            Ok(Label::Positive)
        }

        fn predict_probability(&self, _x: &[f64]) -> Result<f64, ModelError> {
            Ok(1.0)
        }
    }

    #[test]
    fn test_starts_on_diabetes() {
        let app = shipped_app();
        assert_eq!(app.active_flow(), Flow::Diabetes);
        assert_eq!(app.focus(), Focus::Sidebar);
        assert_eq!(app.outcome_state(), &OutcomeState::Idle);
        assert_eq!(app.form_state().values(), Flow::Diabetes.schema().defaults());
    }

    #[test]
    fn test_missing_model_dir_is_fatal() {
        let config = AppConfig::from_lookup(|var| {
            (var == crate::config::MODEL_DIR_ENV).then(|| "/nonexistent/polydiagnose".to_string())
        })
        .expect("Config should resolve");
        assert!(App::new(&config).is_err());
    }

    #[test]
    fn test_predict_shows_outcome() {
        let mut app = shipped_app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.focus(), Focus::Form);

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        let outcome = app
            .outcome_state()
            .outcome()
            .expect("Should show an outcome");
        assert_eq!(outcome.headline, "The person is not diabetic.");
        assert_eq!(outcome.severity, Severity::Success);
        assert!(outcome.detail.starts_with("Probability: "));
    }

    #[test]
    fn test_every_flow_predicts() {
        let mut app = shipped_app();
        for flow in Flow::ALL {
            app.select_flow(flow);
            app.predict();
            let outcome = app
                .outcome_state()
                .outcome()
                .expect("Should show an outcome");
            assert!(
                outcome.headline == flow.positive_statement()
                    || outcome.headline == flow.negative_statement()
            );
        }
    }

    #[test]
    fn test_reselecting_active_flow_is_a_no_op() {
        let mut app = shipped_app();
        app.select_flow(Flow::Heart);
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('5'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('0'), KeyModifiers::NONE);

        let values_before = app.form_state().values();
        let display_before = app.form_state().fields()[0].display();

        app.select_flow(Flow::Heart);
        assert_eq!(app.active_flow(), Flow::Heart);
        assert_eq!(app.form_state().values(), values_before);
        assert_eq!(app.form_state().fields()[0].display(), display_before);
        assert_eq!(app.outcome_state(), &OutcomeState::Idle);

        app.predict();
        let shown = app.outcome_state().clone();
        app.select_flow(Flow::Heart);
        assert_eq!(app.outcome_state(), &shown);
    }

    #[test]
    fn test_switching_flow_resets_form_and_outcome() {
        let mut app = shipped_app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('7'), KeyModifiers::NONE);
        app.predict();
        assert!(app.outcome_state().outcome().is_some());

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.active_flow(), Flow::Parkinsons);
        assert_eq!(app.outcome_state(), &OutcomeState::Idle);
        assert_eq!(app.form_state().values(), vec![0.0; 22]);

        app.select_flow(Flow::Diabetes);
        assert_eq!(app.form_state().values()[0], 1.0);
    }

    #[test]
    fn test_prediction_uses_typed_value_in_full() {
        let mut app = shipped_app();
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.active_flow(), Flow::Parkinsons);

        for _ in 0..4 {
            app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        }
        for c in "0.00003".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        let mut values = vec![0.0; 22];
        values[4] = 3e-5;
        let input = InputVector::new(Flow::Parkinsons, values).expect("Should build vector");
        let expected = app
            .inference_service
            .run_inference(Flow::Parkinsons, &input)
            .expect("Should predict");
        assert_eq!(
            app.outcome_state().outcome(),
            Some(&Outcome::from_prediction(&expected))
        );
    }

    #[test]
    fn test_editing_clears_outcome() {
        let mut app = shipped_app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.predict();
        assert!(app.outcome_state().outcome().is_some());

        app.handle_key(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(app.outcome_state(), &OutcomeState::Idle);
        assert_eq!(app.form_state().values()[0], 2.0);

        // Moving between fields keeps the result.
        app.predict();
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert!(app.outcome_state().outcome().is_some());
    }

    #[test]
    fn test_model_shape_mismatch_is_shown_not_fatal() {
        let mut names: Vec<String> = Flow::Heart.schema().names().map(String::from).collect();
        names.truncate(10);
        let mut registry = ModelRegistry::default();
        registry.insert(
            Flow::Heart,
            FlowModels {
                classifier: Box::new(Misaligned { names }),
                scaler: None,
            },
        );
        let mut app = App::with_dependencies(InferenceService::new(Arc::new(registry)));

        app.select_flow(Flow::Heart);
        app.predict();
        assert!(matches!(app.outcome_state(), OutcomeState::Error { .. }));
        assert!(!app.should_quit());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = shipped_app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit());

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_page() {
        let mut app = shipped_app();
        let text = screen_text(&app);
        assert!(text.contains("Multiple Disease Prediction System"));
        assert!(text.contains("Diabetes Prediction using Machine Learning"));
        assert!(text.contains("Heart Disease Prediction"));
        assert!(text.contains("Glucose Level"));
        assert!(!text.contains("Probability:"));

        app.predict();
        let text = screen_text(&app);
        assert!(text.contains("The person is not diabetic."));
        assert!(text.contains("Probability:"));
    }
}
