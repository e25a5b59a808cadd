//! Session phase state machine.
//!
//! # State Diagram
//!
//! ```text
//! ┌─────────┐ confirm_rosters ┌─────────┐ start_recording ┌───────────┐
//! │  Setup  │────────────────▶│ Lineup  │────────────────▶│ Recording │
//! │         │◀────────────────│         │◀────────────────│           │
//! └─────────┘  back_to_setup  └─────────┘  edit_lineup    └─────┬─────┘
//!                                                    show_stats │ ▲ resume
//!                                                               ▼ │
//!                                                         ┌───────────┐
//!                                                         │   Stats   │
//!                                                         └───────────┘
//! ```

use std::fmt;

/// Which screen of the tagging workflow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Entering teams and rosters
    #[default]
    Setup,
    /// Placing players into zones
    Lineup,
    /// Tagging events against video
    Recording,
    /// Reviewing statistics
    Stats,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Lineup => "lineup",
            Self::Recording => "recording",
            Self::Stats => "stats",
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Apply an event, returning the new phase or an error.
    pub fn apply(self, event: PhaseEvent) -> Result<Self, InvalidTransition> {
        use PhaseEvent::*;
        use SessionPhase::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: self,
            event,
            reason,
        };

        match (self, event) {
            (Setup, ConfirmRosters) => Ok(Lineup),
            (_, ConfirmRosters) => Err(invalid("Rosters already confirmed")),

            (Lineup, BackToSetup) => Ok(Setup),
            (_, BackToSetup) => Err(invalid("Only the lineup screen returns to setup")),

            (Lineup, StartRecording) => Ok(Recording),
            (Setup, StartRecording) => Err(invalid("Set the lineup first")),
            (_, StartRecording) => Err(invalid("Already recording")),

            (Recording, EditLineup) => Ok(Lineup),
            (_, EditLineup) => Err(invalid("Not recording")),

            (Recording, ShowStats) => Ok(Stats),
            (Stats, ShowStats) => Err(invalid("Already showing stats")),
            (_, ShowStats) => Err(invalid("Not recording")),

            (Stats, ResumeRecording) => Ok(Recording),
            (_, ResumeRecording) => Err(invalid("Not showing stats")),
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    ConfirmRosters,
    BackToSetup,
    StartRecording,
    EditLineup,
    ShowStats,
    ResumeRecording,
}

/// Error when a phase transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SessionPhase,
    pub event: PhaseEvent,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} via {:?}: {}",
            self.from, self.event, self.reason
        )
    }
}

impl std::error::Error for InvalidTransition {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut phase = SessionPhase::default();
        assert_eq!(phase, SessionPhase::Setup);

        phase = phase.apply(PhaseEvent::ConfirmRosters).unwrap();
        phase = phase.apply(PhaseEvent::StartRecording).unwrap();
        assert!(phase.is_recording());

        phase = phase.apply(PhaseEvent::ShowStats).unwrap();
        assert_eq!(phase, SessionPhase::Stats);
        phase = phase.apply(PhaseEvent::ResumeRecording).unwrap();
        assert_eq!(phase, SessionPhase::Recording);
    }

    #[test]
    fn test_going_back() {
        let phase = SessionPhase::Recording
            .apply(PhaseEvent::EditLineup)
            .unwrap();
        assert_eq!(phase, SessionPhase::Lineup);
        assert_eq!(
            phase.apply(PhaseEvent::BackToSetup).unwrap(),
            SessionPhase::Setup
        );
    }

    #[test]
    fn test_invalid_transitions() {
        let setup = SessionPhase::Setup;
        assert!(setup.apply(PhaseEvent::StartRecording).is_err());
        assert!(setup.apply(PhaseEvent::ShowStats).is_err());
        assert!(SessionPhase::Stats.apply(PhaseEvent::EditLineup).is_err());

        let err = SessionPhase::Recording
            .apply(PhaseEvent::ConfirmRosters)
            .unwrap_err();
        assert_eq!(err.from, SessionPhase::Recording);
        assert_eq!(
            err.to_string(),
            "Invalid transition from recording via ConfirmRosters: Rosters already confirmed"
        );
    }
}
