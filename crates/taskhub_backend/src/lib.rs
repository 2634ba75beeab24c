mod selection_store;
pub use selection_store::SqliteSelectionStore;

mod user_api;
pub use user_api::{HttpUserApi, UserProfileApi};
