mod route;
mod selection;
mod workspace;

pub use route::{RouteKind, RouteState};

pub(crate) use route::WORKSPACES_SEGMENT;
pub use selection::SelectionState;
pub use workspace::{HeaderState, Workspace, WorkspaceId};
