use crate::storage::EntryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: EntryStore,
}

impl AppState {
    pub fn new(store: EntryStore) -> Self {
        Self { store }
    }
}
