//! Infrastructure layer: identity provider, document stores, module settings.

pub mod identity;
pub mod profiles;
pub mod settings;

pub use identity::{Hs256IdentityProvider, UnconfiguredIdentityProvider};
pub use profiles::InMemoryProfileStore;
#[cfg(feature = "postgres")]
pub use profiles::PostgresProfileStore;
pub use settings::{InMemorySettingsStore, ModuleSettings, SettingsStore};
