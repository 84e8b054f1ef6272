use lookout_core::Database;

/// Shared handles for request handlers. Everything a handler touches is
/// passed in here; there is no process-global client.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
