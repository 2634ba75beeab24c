use crate::Workspace;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    LoadPersistedSelection,

    SelectionChanged {
        workspace: Workspace,
    },
    Navigate {
        target: String,
    },
}
