//! Entry point registry and target resolution.
//!
//! # Architecture
//!
//! The registry is a mechanism, not policy. It only lists the commands that
//! installed distributions declare and turns one of them into a callable.
//!
//! The [`TargetResolver`] trait defines the contract for resolution policy.
//! [`Resolver`] composes the launcher's precedence out of single-source
//! resolvers.
//!
//! # Example
//!
//! ```
//! use apprun_shim::{RegistryIndex, ResolveMode, ResolveRequest, Resolver, StaticRegistry};
//!
//! let index = RegistryIndex::build(&StaticRegistry::new().with("mytool", "pkg.cli:main"));
//! let request = ResolveRequest {
//!     invoked_name: Some("mytool".to_string()),
//!     ..Default::default()
//! };
//!
//! let resolution = Resolver::new(&index, Vec::new())
//!     .resolve(&request, ResolveMode::WithDefault)
//!     .unwrap();
//! assert_eq!(resolution.descriptor.qualified_target(), "pkg.cli:main");
//! ```

pub use descriptor::{EntryPoint, LoadedTarget, TargetDescriptor};
pub use error::{Error, Result};
pub use registry::{
    CONSOLE_SCRIPTS, CachedRegistry, EntryPointRegistry, Registry, RegistryIndex, StaticRegistry,
    parse_entry_points,
};
pub use resolver::{
    KeyResolver, PairResolver, Resolution, ResolveMode, ResolveRequest, ResolvedFrom, Resolver,
    TargetResolver, TripleResolver,
};

mod descriptor;
mod error;
mod registry;
mod resolver;
