mod load;
mod save;

pub use load::{PersistedSelection, parse_persisted_selection};
pub use save::to_persisted_selection;
