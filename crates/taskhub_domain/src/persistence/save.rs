use super::PersistedSelection;
use crate::Workspace;

pub fn to_persisted_selection(workspace: &Workspace) -> PersistedSelection {
    PersistedSelection {
        id: workspace.id.as_str().to_owned(),
        name: workspace.name.clone(),
        color: workspace.color.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WorkspaceId, parse_persisted_selection};

    #[test]
    fn round_trips_through_serialized_form() {
        let workspace = Workspace {
            id: WorkspaceId::new("w7"),
            name: "Platform".to_owned(),
            color: Some("#36B37E".to_owned()),
        };
        let raw = serde_json::to_string(&to_persisted_selection(&workspace))
            .expect("serialize selection");
        assert_eq!(parse_persisted_selection(&raw), Some(workspace));
    }
}
