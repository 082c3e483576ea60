pub mod authors;
pub mod books;

use libris_kernel::ModuleRegistry;

use crate::store::RecordStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: &RecordStore) {
    registry.register(authors::create_module(store.clone()));
    registry.register(books::create_module(store.clone()));
}
