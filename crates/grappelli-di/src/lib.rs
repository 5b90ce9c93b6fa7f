//! Runtime dependency-injection container
//!
//! The container is built around three ideas. A [`Spec`] is a hashable key
//! naming a requestable thing: a string, a Rust type, a tuple or a
//! categorized tuple. A [`Provider`] is a recipe producing instances for one
//! specification, declaring its own needs as an explicit [`DependencyMap`].
//! An [`ObjectGraph`] ties the two together: it resolves specifications
//! recursively, caches instances in [`Scope`]s and validates the whole
//! declared structure before anything runs.
//!
//! # Resolution
//!
//! [`ObjectGraph::acquire`] fills a provider's argument slots from three
//! sources in order of precedence: caller-supplied [`Overrides`], deferred
//! [`FactoryHandle`]s for factory dependencies, and recursive acquisition
//! for direct dependencies. Scoped providers short-circuit to their cache.
//!
//! # Validation
//!
//! [`ObjectGraph::validate`] checks the declared dependency structure
//! without invoking any provider: every dependency must be registered, no
//! provider may depend on its own specification and no dependency cycle may
//! exist. Run it once after assembly; resolution itself never re-checks.
//!
//! # Examples
//!
//! ```
//! use grappelli_di::{DependencyMap, ObjectGraph, ScopeTag, Spec, to_object};
//!
//! struct Database {
//! 	url: String,
//! }
//!
//! let graph = ObjectGraph::new();
//! graph.register_instance(Spec::name("db_url"), String::from("sqlite://somedb"));
//! graph
//! 	.register_factory(
//! 		Spec::of::<Database>(),
//! 		DependencyMap::new().with_named("url", Spec::name("db_url")),
//! 		Some(&ScopeTag::SINGLETON),
//! 		|args| {
//! 			let url = args.keyword_as::<String>("url")?;
//! 			Ok(to_object(Database {
//! 				url: url.as_ref().clone(),
//! 			}))
//! 		},
//! 	)
//! 	.unwrap();
//!
//! graph.validate().unwrap();
//! let database = graph.get_as::<Database>(&Spec::of::<Database>()).unwrap();
//! assert_eq!(database.url, "sqlite://somedb");
//! ```

pub mod dependency;
pub mod error;
pub mod graph;
pub mod module;
pub mod provider;
pub mod registry;
pub mod scope;
pub mod spec;

pub use dependency::{
	ArgKey, Arguments, Dependency, DependencyMap, Object, Overrides, downcast_object, to_object,
};
pub use error::{Cycle, DiError, DiResult};
pub use graph::{FactoryHandle, ObjectGraph};
pub use module::{Binder, Module};
pub use provider::{
	BoundFunction, FactoryProvider, FunctionProvider, InstanceProvider, Provider, ProviderFn,
};
pub use registry::{ModuleEntry, discovered_modules};
pub use scope::{ProcessScope, Scope, ScopeTag, SingletonScope, ThreadScope};
pub use spec::{Spec, TypeKey};

// Re-exported for the `register_module!` macro expansion.
pub use inventory;
