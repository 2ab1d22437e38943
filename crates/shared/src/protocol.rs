use serde::{Deserialize, Serialize};

/// Success body for `POST /activities/{name}/signup` and
/// `DELETE /activities/{name}/unregister`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Signup,
    Unregister,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Unregister => "unregister",
        }
    }
}
