//! # Grappelli
//!
//! A runtime dependency-injection container for Rust.
//!
//! Grappelli wires applications together at run time: providers are
//! registered against hashable specifications, an object graph resolves
//! them recursively with scope-aware caching, and the whole declared
//! structure can be validated for missing dependencies and cycles before
//! the first instance is ever produced.
//!
//! ## Core Ideas
//!
//! - **Specifications**: string, type, tuple or categorized keys naming
//!   requestable things
//! - **Providers**: factory, function and instance recipes with explicit
//!   dependency maps
//! - **Scopes**: singleton, per-process and per-thread caches, plus custom
//!   scopes under user-chosen tags
//! - **Modules**: reusable declaration bundles, installable by hand or
//!   discovered at link time
//!
//! The implementation lives in [`grappelli_di`]; this crate re-exports its
//! public surface.
//!
//! ## Quick Start
//!
//! ```
//! use grappelli::{DependencyMap, ObjectGraph, ScopeTag, Spec, to_object};
//!
//! let graph = ObjectGraph::new();
//! graph.register_instance(Spec::name("name"), "django");
//! graph
//! 	.register_factory(
//! 		Spec::name("greeting"),
//! 		DependencyMap::new().with_position(Spec::name("name")),
//! 		Some(&ScopeTag::SINGLETON),
//! 		|args| {
//! 			let name = *args.positional_as::<&str>(0)?;
//! 			Ok(to_object(format!("hello, {name}")))
//! 		},
//! 	)
//! 	.unwrap();
//!
//! graph.validate().unwrap();
//! let greeting = graph.get_as::<String>(&Spec::name("greeting")).unwrap();
//! assert_eq!(*greeting, "hello, django");
//! ```

pub use grappelli_di::*;
