//! Footer help text shared by the grid's components.
//!
//! Components that contribute help text receive the [`FooterContext`] by
//! `&mut` and report whether their update changed anything, so the caller can
//! decide whether a re-render is needed.

/// Holder for the footer help line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterContext {
    help: String,
    revision: u64,
}

impl FooterContext {
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Incremented on every change to the help text.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the help text. Returns `true` if it changed.
    pub fn set_help(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.help {
            return false;
        }
        self.help = text;
        self.revision += 1;
        true
    }

    /// Clears the help text. Returns `true` if it was non-empty.
    pub fn clear(&mut self) -> bool {
        self.set_help(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_help_reports_changes_only() {
        let mut footer = FooterContext::default();
        assert!(footer.set_help("j/k move"));
        assert_eq!(footer.revision(), 1);
        assert!(!footer.set_help("j/k move"));
        assert_eq!(footer.revision(), 1);
        assert!(footer.clear());
        assert!(!footer.clear());
        assert_eq!(footer.help(), "");
        assert_eq!(footer.revision(), 2);
    }
}
