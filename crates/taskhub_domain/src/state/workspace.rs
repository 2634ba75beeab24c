use super::{RouteState, SelectionState};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A workspace as supplied by the backend. Immutable on the client side.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HeaderState {
    pub workspaces: Vec<Workspace>,
    pub selection: SelectionState,
    pub route: RouteState,
    pub last_error: Option<String>,
    pub(crate) persisted_requested: bool,
}

impl HeaderState {
    pub fn new() -> Self {
        Self {
            workspaces: Vec::new(),
            selection: SelectionState::Unresolved,
            route: RouteState::root(),
            last_error: None,
            persisted_requested: false,
        }
    }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.selection.workspace()
    }
}

impl Default for HeaderState {
    fn default() -> Self {
        Self::new()
    }
}
