use super::Workspace;

/// Which workspace is active, and where the decision came from.
///
/// `Explicit` always wins over `Persisted` for the rest of the session; the
/// persisted fallback is only consulted while the selection is `Unresolved`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionState {
    Unresolved,
    Persisted(Workspace),
    Explicit(Workspace),
}

impl SelectionState {
    pub fn workspace(&self) -> Option<&Workspace> {
        match self {
            SelectionState::Unresolved => None,
            SelectionState::Persisted(workspace) | SelectionState::Explicit(workspace) => {
                Some(workspace)
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SelectionState::Unresolved)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, SelectionState::Explicit(_))
    }
}
