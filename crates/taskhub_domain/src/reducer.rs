use crate::{
    Action, Effect, HeaderState, SelectionState, navigation_target, parse_persisted_selection,
};

impl HeaderState {
    /// Pure transition function: applies one action and returns the effects
    /// the host must execute. All reconciliation decisions live here.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            // The persisted fallback is consulted at most once, and only
            // while no selection exists. An explicit selection present at
            // startup leaves the store untouched.
            Action::AppStarted => {
                if self.persisted_requested || self.selection.is_resolved() {
                    return Vec::new();
                }
                self.persisted_requested = true;
                vec![Effect::LoadPersistedSelection]
            }

            Action::RouteChanged { route } => {
                self.route = route;
                Vec::new()
            }

            Action::WorkspacesLoaded { workspaces } => {
                self.workspaces = workspaces;
                Vec::new()
            }

            Action::SelectWorkspace { workspace_id } => {
                let Some(workspace) = self
                    .workspaces
                    .iter()
                    .find(|w| w.id == workspace_id)
                    .cloned()
                else {
                    self.last_error = Some(format!("unknown workspace {workspace_id}"));
                    return Vec::new();
                };

                let target = navigation_target(&self.route, &workspace.id);
                self.selection = SelectionState::Explicit(workspace.clone());
                vec![
                    Effect::SelectionChanged { workspace },
                    Effect::Navigate { target },
                ]
            }

            Action::PersistedSelectionLoaded { raw } => {
                // A late store reply must never override a selection made in
                // the meantime.
                if self.selection.is_resolved() {
                    return Vec::new();
                }
                let Some(workspace) = raw.as_deref().and_then(parse_persisted_selection) else {
                    return Vec::new();
                };

                let target = navigation_target(&self.route, &workspace.id);
                self.selection = SelectionState::Persisted(workspace.clone());
                vec![
                    Effect::SelectionChanged { workspace },
                    Effect::Navigate { target },
                ]
            }

            // Treated the same as an absent record: the header renders
            // without a selection, nothing is surfaced to the user.
            Action::PersistedSelectionLoadFailed { message: _ } => Vec::new(),

            Action::ClearError => {
                self.last_error = None;
                Vec::new()
            }
        }
    }
}
