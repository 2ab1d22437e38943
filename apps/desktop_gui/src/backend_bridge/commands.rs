//! Backend commands queued from UI to backend worker.

use roster_core::ControlId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Fetch a fresh snapshot and rebuild the roster.
    Load,
    Signup {
        activity: String,
        email: String,
    },
    /// Click on a rendered removal control.
    Remove {
        control: ControlId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Signup { .. } => "signup",
            Self::Remove { .. } => "remove",
        }
    }
}
