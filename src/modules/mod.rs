pub mod books;

use quire_authz::IdentityResolverArc;
use quire_db::StoreHandle;
use quire_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: &StoreHandle,
    identity: &IdentityResolverArc,
) {
    registry.register_custom(books::create_module(store.clone(), identity.clone()));
}
