#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteKind {
    WorkspaceScoped,
    Generic,
}

/// The current client-side location: a normalized path plus its query
/// parameters in order of appearance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteState {
    path: String,
    query: Vec<(String, String)>,
}

pub(crate) const WORKSPACES_SEGMENT: &str = "workspaces";

impl RouteState {
    pub fn root() -> Self {
        Self {
            path: "/".to_owned(),
            query: Vec::new(),
        }
    }

    pub fn parse(url: &str) -> Self {
        let (path, raw_query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let path = path.trim();
        let path = if path.is_empty() {
            "/".to_owned()
        } else if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };

        let query = raw_query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_owned(), value.to_owned()),
                None => (pair.to_owned(), String::new()),
            })
            .collect();

        Self { path, query }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn path_segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    pub fn kind(&self) -> RouteKind {
        match self.path_segments().first() {
            Some(&WORKSPACES_SEGMENT) => RouteKind::WorkspaceScoped,
            _ => RouteKind::Generic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_path_and_query() {
        let route = RouteState::parse("/dashboard?filter=open&sort=due");
        assert_eq!(route.path(), "/dashboard");
        assert_eq!(
            route.query(),
            &[
                ("filter".to_owned(), "open".to_owned()),
                ("sort".to_owned(), "due".to_owned()),
            ]
        );
    }

    #[test]
    fn parse_normalizes_missing_leading_slash_and_empty_path() {
        assert_eq!(RouteState::parse("dashboard").path(), "/dashboard");
        assert_eq!(RouteState::parse("").path(), "/");
        assert_eq!(RouteState::parse("?workspaceId=w1").path(), "/");
    }

    #[test]
    fn workspace_scoped_requires_workspaces_as_first_segment() {
        assert_eq!(
            RouteState::parse("/workspaces/w1").kind(),
            RouteKind::WorkspaceScoped
        );
        assert_eq!(
            RouteState::parse("/workspaces/w1/tasks/3").kind(),
            RouteKind::WorkspaceScoped
        );
        assert_eq!(RouteState::parse("/workspaces").kind(), RouteKind::WorkspaceScoped);
        assert_eq!(RouteState::parse("/dashboard").kind(), RouteKind::Generic);
        assert_eq!(
            RouteState::parse("/workspace-settings").kind(),
            RouteKind::Generic
        );
        assert_eq!(
            RouteState::parse("/settings/workspaces").kind(),
            RouteKind::Generic
        );
    }
}
