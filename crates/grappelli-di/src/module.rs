//! Modules: reusable bundles of provider declarations
//!
//! A [`Module`] declares providers and scopes against a [`Binder`] instead
//! of a live graph, so one configuration can be installed into many graphs
//! and duplicate declarations are caught before anything is registered.
//!
//! # Examples
//!
//! ```
//! use grappelli_di::{
//! 	Binder, DependencyMap, DiResult, Module, ObjectGraph, Spec, to_object,
//! };
//!
//! struct DatabaseModule;
//!
//! impl Module for DatabaseModule {
//! 	fn configure(&self, binder: &mut Binder) -> DiResult<()> {
//! 		binder.bind_instance(Spec::name("db_url"), to_object("sqlite://somedb"))?;
//! 		binder.bind_factory(
//! 			Spec::name("db_connection"),
//! 			DependencyMap::new().with_position(Spec::name("db_url")),
//! 			None,
//! 			|args| {
//! 				let url = args.positional_as::<&str>(0)?;
//! 				Ok(to_object(format!("connected to {url}")))
//! 			},
//! 		)
//! 	}
//! }
//!
//! let graph = ObjectGraph::new();
//! graph.install(&DatabaseModule).unwrap();
//! graph.validate().unwrap();
//! ```

use crate::dependency::{Arguments, DependencyMap, Object};
use crate::error::{DiError, DiResult};
use crate::graph::ObjectGraph;
use crate::provider::{FactoryProvider, FunctionProvider, Provider, ProviderFn};
use crate::scope::{Scope, ScopeTag};
use crate::spec::Spec;
use std::sync::Arc;
use tracing::debug;

/// A reusable bundle of provider and scope declarations.
pub trait Module: Send + Sync {
	/// Declares this module's providers and scopes against `binder`.
	fn configure(&self, binder: &mut Binder) -> DiResult<()>;
}

enum Registration {
	Provider {
		specification: Spec,
		provider: Arc<dyn Provider>,
	},
	Factory {
		specification: Spec,
		dependencies: DependencyMap,
		scope: Option<ScopeTag>,
		factory: Arc<ProviderFn>,
	},
	Function {
		specification: Spec,
		dependencies: DependencyMap,
		scope: Option<ScopeTag>,
		function: Arc<ProviderFn>,
	},
	Instance {
		specification: Spec,
		instance: Object,
	},
}

impl Registration {
	fn specification(&self) -> &Spec {
		match self {
			Self::Provider { specification, .. }
			| Self::Factory { specification, .. }
			| Self::Function { specification, .. }
			| Self::Instance { specification, .. } => specification,
		}
	}
}

/// Collects a module's declarations before they touch a graph.
///
/// Each specification may be declared at most once per binder; a second
/// declaration fails immediately with [`DiError::DuplicateProvider`].
#[derive(Default)]
pub struct Binder {
	registrations: Vec<Registration>,
	scopes: Vec<(ScopeTag, Arc<dyn Scope>)>,
}

impl Binder {
	pub fn new() -> Self {
		Self::default()
	}

	fn push(&mut self, registration: Registration) -> DiResult<()> {
		let specification = registration.specification();
		if self
			.registrations
			.iter()
			.any(|existing| existing.specification() == specification)
		{
			return Err(DiError::DuplicateProvider(specification.clone()));
		}
		self.registrations.push(registration);
		Ok(())
	}

	/// Declares an arbitrary provider for `specification`.
	pub fn bind_provider(
		&mut self,
		specification: impl Into<Spec>,
		provider: Arc<dyn Provider>,
	) -> DiResult<()> {
		self.push(Registration::Provider {
			specification: specification.into(),
			provider,
		})
	}

	/// Declares a factory callable for `specification`.
	///
	/// `scope` names a tag that must be known to the target graph at install
	/// time, either built-in or declared through [`bind_scope`](Self::bind_scope).
	pub fn bind_factory<F>(
		&mut self,
		specification: impl Into<Spec>,
		dependencies: DependencyMap,
		scope: Option<ScopeTag>,
		factory: F,
	) -> DiResult<()>
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		self.push(Registration::Factory {
			specification: specification.into(),
			dependencies,
			scope,
			factory: Arc::new(factory),
		})
	}

	/// Declares a function for `specification`.
	pub fn bind_function<F>(
		&mut self,
		specification: impl Into<Spec>,
		dependencies: DependencyMap,
		scope: Option<ScopeTag>,
		function: F,
	) -> DiResult<()>
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		self.push(Registration::Function {
			specification: specification.into(),
			dependencies,
			scope,
			function: Arc::new(function),
		})
	}

	/// Declares a pre-built instance for `specification`.
	pub fn bind_instance(
		&mut self,
		specification: impl Into<Spec>,
		instance: Object,
	) -> DiResult<()> {
		self.push(Registration::Instance {
			specification: specification.into(),
			instance,
		})
	}

	/// Declares a scope instance under `tag`.
	pub fn bind_scope(&mut self, tag: impl Into<ScopeTag>, scope: Arc<dyn Scope>) {
		self.scopes.push((tag.into(), scope));
	}

	/// Number of provider declarations collected so far.
	pub fn len(&self) -> usize {
		self.registrations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.registrations.is_empty()
	}
}

impl ObjectGraph {
	/// Installs a module: runs its [`configure`](Module::configure) against a
	/// fresh binder, then registers the collected declarations.
	///
	/// Scopes are registered before providers, so a factory may reference a
	/// scope tag declared by the same module. On error nothing is partially
	/// registered except the declarations applied before the failure.
	pub fn install(&self, module: &dyn Module) -> DiResult<()> {
		let mut binder = Binder::new();
		module.configure(&mut binder)?;
		debug!(
			providers = binder.registrations.len(),
			scopes = binder.scopes.len(),
			"installing module"
		);

		for (tag, scope) in binder.scopes {
			self.register_scope(tag, scope);
		}
		for registration in binder.registrations {
			match registration {
				Registration::Provider {
					specification,
					provider,
				} => self.register_provider(specification, provider),
				Registration::Factory {
					specification,
					dependencies,
					scope,
					factory,
				} => {
					let provider = FactoryProvider::from_shared(dependencies, factory);
					let provider = match scope {
						Some(tag) => provider.with_scope(self.scope_instance(&tag)?),
						None => provider,
					};
					self.register_provider(specification, Arc::new(provider));
				}
				Registration::Function {
					specification,
					dependencies,
					scope,
					function,
				} => {
					let provider = FunctionProvider::from_shared(dependencies, function);
					let provider = match scope {
						Some(tag) => provider.with_scope(self.scope_instance(&tag)?),
						None => provider,
					};
					self.register_provider(specification, Arc::new(provider));
				}
				Registration::Instance {
					specification,
					instance,
				} => self.register_instance_arc(specification, instance),
			}
		}
		Ok(())
	}
}
