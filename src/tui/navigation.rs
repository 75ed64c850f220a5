//! Sidebar navigation: which flow is active.
//!
//! Exactly one flow is active at a time, starting with diabetes. The
//! highlighted entry moves freely; only an explicit selection changes the
//! active flow.

use crate::domain::Flow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationShell {
    active: Flow,
    highlighted: usize,
}

impl Default for NavigationShell {
    fn default() -> Self {
        Self {
            active: Flow::default(),
            highlighted: Flow::default().index(),
        }
    }
}

impl NavigationShell {
    #[must_use]
    pub fn active(&self) -> Flow {
        self.active
    }

    #[must_use]
    pub fn highlighted(&self) -> Flow {
        Flow::from_index(self.highlighted).unwrap_or(self.active)
    }

    pub fn highlight_next(&mut self) {
        self.highlighted = (self.highlighted + 1) % Flow::ALL.len();
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = if self.highlighted == 0 {
            Flow::ALL.len() - 1
        } else {
            self.highlighted - 1
        };
    }

    /// Make `flow` active. Returns `false` if it already was (no-op).
    pub fn select(&mut self, flow: Flow) -> bool {
        self.highlighted = flow.index();
        if flow == self.active {
            return false;
        }
        self.active = flow;
        true
    }

    /// Make the highlighted entry active.
    pub fn select_highlighted(&mut self) -> bool {
        self.select(self.highlighted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let nav = NavigationShell::default();
        assert_eq!(nav.active(), Flow::Diabetes);
        assert_eq!(nav.highlighted(), Flow::Diabetes);
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut nav = NavigationShell::default();
        assert!(nav.select(Flow::Heart));
        let before = nav.clone();
        assert!(!nav.select(Flow::Heart));
        assert_eq!(nav, before);
    }

    #[test]
    fn test_highlight_does_not_activate() {
        let mut nav = NavigationShell::default();
        nav.highlight_next();
        nav.highlight_next();
        assert_eq!(nav.highlighted(), Flow::Parkinsons);
        assert_eq!(nav.active(), Flow::Diabetes);

        nav.highlight_next();
        assert_eq!(nav.highlighted(), Flow::Diabetes);
        nav.highlight_prev();
        assert_eq!(nav.highlighted(), Flow::Parkinsons);

        assert!(nav.select_highlighted());
        assert_eq!(nav.active(), Flow::Parkinsons);
    }
}
