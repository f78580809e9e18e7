//! Lifecycle phases of a crawl run

use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No seeds have been pushed yet
    Idle,

    /// Seeds are queued and the traversal loop is active
    Running,

    /// The frontier emptied or the page budget was reached
    Drained,
}

impl CrawlPhase {
    /// Returns true if a run may move from this phase to `next`
    ///
    /// Phases only ever advance: `Idle -> Running -> Drained`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Drained)
        )
    }

    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Drained)
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Drained => "drained",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::Running));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Drained));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Drained));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Idle));
        assert!(!CrawlPhase::Drained.can_transition_to(CrawlPhase::Running));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Running));
    }

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::Running.is_terminal());
        assert!(CrawlPhase::Drained.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::Running.to_string(), "running");
    }
}
