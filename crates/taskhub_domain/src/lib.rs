mod actions;
pub use actions::Action;
mod effects;
pub use effects::Effect;

mod adapters;
pub use adapters::SelectionStoreService;

mod navigation;
pub use navigation::navigation_target;

mod persistence;
pub use persistence::{PersistedSelection, parse_persisted_selection, to_persisted_selection};

mod state;
pub use state::*;

mod reducer;
