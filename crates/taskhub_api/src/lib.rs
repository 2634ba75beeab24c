use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    None,
    Persisted,
    Explicit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeaderSnapshot {
    pub rev: u64,
    pub workspaces: Vec<WorkspaceSnapshot>,
    #[serde(default)]
    pub selected_workspace: Option<WorkspaceSnapshot>,
    pub selection_source: SelectionSource,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    RouteChanged {
        url: String,
    },
    WorkspacesLoaded {
        workspaces: Vec<WorkspaceSnapshot>,
    },
    SelectWorkspace {
        workspace_id: String,
    },
    ClearError,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    HeaderChanged {
        rev: u64,
        header: Box<HeaderSnapshot>,
    },
    Navigate {
        target: String,
    },
    WorkspaceSelected {
        workspace: WorkspaceSnapshot,
    },
    Toast {
        message: String,
    },
}

/// Response schema of `GET /users/profile`. The backend owns the shape; the
/// client decodes it here instead of trusting it implicitly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Request body of `PUT /users/profile`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Request body of `POST /users/change-password`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}
