use crate::{Workspace, WorkspaceId};

const MAX_PERSISTED_FIELD_LEN: usize = 256;

/// On-disk shape of the last-selected workspace record. Field names follow
/// the backend's JSON (`_id`), with `id` accepted as an alias.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistedSelection {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Parses a raw persisted selection record. Any malformed input (invalid
/// JSON, missing fields, blank or oversized identifiers) is treated as no
/// record at all.
pub fn parse_persisted_selection(raw: &str) -> Option<Workspace> {
    let record: PersistedSelection = serde_json::from_str(raw).ok()?;

    let id = record.id.trim();
    if id.is_empty() || id.len() > MAX_PERSISTED_FIELD_LEN {
        return None;
    }
    let name = record.name.trim();
    if name.is_empty() || name.len() > MAX_PERSISTED_FIELD_LEN {
        return None;
    }
    let color = record
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned);

    Some(Workspace {
        id: WorkspaceId::new(id),
        name: name.to_owned(),
        color,
    })
}
