//! Identity-provider adapters.

pub mod hs256;
pub mod unconfigured;

pub use hs256::Hs256IdentityProvider;
pub use unconfigured::UnconfiguredIdentityProvider;
