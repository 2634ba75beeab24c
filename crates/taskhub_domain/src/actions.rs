use crate::{RouteState, Workspace, WorkspaceId};

#[derive(Clone, Debug)]
pub enum Action {
    AppStarted,

    RouteChanged {
        route: RouteState,
    },
    WorkspacesLoaded {
        workspaces: Vec<Workspace>,
    },

    SelectWorkspace {
        workspace_id: WorkspaceId,
    },

    PersistedSelectionLoaded {
        raw: Option<String>,
    },
    PersistedSelectionLoadFailed {
        message: String,
    },

    ClearError,
}
