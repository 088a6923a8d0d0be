pub mod books;

use shelf_kernel::{settings::Settings, ModuleRegistry};

/// Register all resource modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) {
    registry.register(books::create_module(&settings.storage));
}
