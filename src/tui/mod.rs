//! TUI module: Terminal User Interface using Ratatui.
//!
//! One page with a sidebar flow selector on the left and the active flow's
//! form and result panel on the right.

mod app;
mod navigation;
mod styles;
mod ui;

pub use app::{App, Focus};
pub use navigation::NavigationShell;
pub use styles::MedicalTheme;
pub use ui::form::{FieldInput, FormState};
pub use ui::outcome::OutcomeState;
