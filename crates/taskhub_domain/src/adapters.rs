/// Durable client-side store for the last-selected workspace record.
///
/// The header core only reads; writing belongs to the store's other clients
/// (the workspace creation flow).
pub trait SelectionStoreService: Send + Sync {
    fn read_selection(&self) -> Result<Option<String>, String>;

    fn write_selection(&self, raw: String) -> Result<(), String>;
}
