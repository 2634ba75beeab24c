use crate::state::WORKSPACES_SEGMENT;
use crate::{RouteKind, RouteState, WorkspaceId};

const WORKSPACE_ID_QUERY_PARAM: &str = "workspaceId";

/// Computes the client-side navigation target for a newly decided workspace.
///
/// On a workspace-scoped route the workspace id path segment is replaced in
/// place; everything else, including the query string, passes through. On a
/// generic route the path is kept and the `workspaceId` query parameter is
/// set or replaced, preserving all other parameters and their order.
pub fn navigation_target(route: &RouteState, workspace_id: &WorkspaceId) -> String {
    match route.kind() {
        RouteKind::WorkspaceScoped => scoped_target(route, workspace_id),
        RouteKind::Generic => generic_target(route, workspace_id),
    }
}

fn scoped_target(route: &RouteState, workspace_id: &WorkspaceId) -> String {
    let mut segments = route.path_segments();
    debug_assert_eq!(segments.first(), Some(&WORKSPACES_SEGMENT));
    if segments.len() >= 2 {
        segments[1] = workspace_id.as_str();
    } else {
        segments.push(workspace_id.as_str());
    }
    render(&format!("/{}", segments.join("/")), route.query())
}

fn generic_target(route: &RouteState, workspace_id: &WorkspaceId) -> String {
    let mut query = route.query().to_vec();
    match query
        .iter_mut()
        .find(|(key, _)| key == WORKSPACE_ID_QUERY_PARAM)
    {
        Some((_, value)) => *value = workspace_id.as_str().to_owned(),
        None => query.push((
            WORKSPACE_ID_QUERY_PARAM.to_owned(),
            workspace_id.as_str().to_owned(),
        )),
    }
    render(route.path(), &query)
}

fn render(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_owned();
    }
    let pairs = query
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{pairs}")
}
