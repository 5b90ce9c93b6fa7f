//! The object graph: provider registry, resolver and validator
//!
//! An [`ObjectGraph`] maps specifications to providers and scope tags to
//! scope instances. Resolution walks provider dependency maps recursively,
//! filling each argument slot from caller overrides, deferred factory
//! handles or recursive acquisition, in that order of precedence.
//!
//! # Examples
//!
//! ```
//! use grappelli_di::{DependencyMap, ObjectGraph, ScopeTag, Spec, to_object};
//!
//! let graph = ObjectGraph::new();
//! graph.register_instance(Spec::name("greeting"), "hello");
//! graph
//! 	.register_factory(
//! 		Spec::name("message"),
//! 		DependencyMap::new().with_position(Spec::name("greeting")),
//! 		Some(&ScopeTag::SINGLETON),
//! 		|args| {
//! 			let greeting = *args.positional_as::<&str>(0)?;
//! 			Ok(to_object(format!("{greeting}, world")))
//! 		},
//! 	)
//! 	.unwrap();
//!
//! graph.validate().unwrap();
//! let message = graph.get_as::<String>(&Spec::name("message")).unwrap();
//! assert_eq!(*message, "hello, world");
//! ```

use crate::dependency::{
	Arguments, Dependency, DependencyMap, Object, Overrides, to_object,
};
use crate::error::{Cycle, DiError, DiResult};
use crate::provider::{FactoryProvider, FunctionProvider, InstanceProvider, Provider};
use crate::scope::{ProcessScope, Scope, ScopeTag, SingletonScope, ThreadScope};
use crate::spec::Spec;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, trace};

/// A container of registered scopes and providers, able to validate the
/// declared dependency structure and to produce provided objects.
pub struct ObjectGraph {
	// Weak self-pointer so factory handles can refer back without keeping
	// the graph alive through its own caches.
	handle: Weak<ObjectGraph>,
	providers: RwLock<HashMap<Spec, Arc<dyn Provider>>>,
	scopes: RwLock<HashMap<ScopeTag, Arc<dyn Scope>>>,
}

impl ObjectGraph {
	/// A new graph with the built-in `singleton`, `process` and `thread`
	/// scopes pre-registered.
	pub fn new() -> Arc<Self> {
		let graph = Arc::new_cyclic(|handle| Self {
			handle: handle.clone(),
			providers: RwLock::new(HashMap::new()),
			scopes: RwLock::new(HashMap::new()),
		});
		graph.register_scope(ScopeTag::SINGLETON, Arc::new(SingletonScope::new()));
		graph.register_scope(ScopeTag::PROCESS, Arc::new(ProcessScope::new()));
		graph.register_scope(ScopeTag::THREAD, Arc::new(ThreadScope::new()));
		graph
	}

	/// Registers a provider for `specification`, replacing any previous one.
	pub fn register_provider(&self, specification: impl Into<Spec>, provider: Arc<dyn Provider>) {
		let specification = specification.into();
		debug!(specification = %specification, "registering provider");
		let mut providers = self
			.providers
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		providers.insert(specification, provider);
	}

	/// Removes the provider for `specification`.
	///
	/// # Errors
	///
	/// [`DiError::UnknownSpecification`] when no provider is registered.
	pub fn unregister_provider(&self, specification: &Spec) -> DiResult<()> {
		let mut providers = self
			.providers
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		providers
			.remove(specification)
			.map(|_| ())
			.ok_or_else(|| DiError::UnknownSpecification(specification.clone()))
	}

	/// Registers a factory callable for `specification`.
	///
	/// The callable is invoked on every resolution unless `scope` is given,
	/// in which case the named scope caches its result.
	///
	/// # Errors
	///
	/// [`DiError::UnknownScope`] when `scope` names a tag the graph does not
	/// know.
	pub fn register_factory<F>(
		&self,
		specification: impl Into<Spec>,
		dependencies: DependencyMap,
		scope: Option<&ScopeTag>,
		factory: F,
	) -> DiResult<()>
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		let provider = FactoryProvider::new(dependencies, factory);
		let provider = match scope {
			Some(tag) => provider.with_scope(self.scope_instance(tag)?),
			None => provider,
		};
		self.register_provider(specification, Arc::new(provider));
		Ok(())
	}

	/// Registers a function for `specification`.
	///
	/// Resolving the specification yields a
	/// [`BoundFunction`](crate::BoundFunction) holding the function together
	/// with its resolved dependencies; the function itself is only run when
	/// the caller invokes the bound form.
	///
	/// # Errors
	///
	/// [`DiError::UnknownScope`] when `scope` names a tag the graph does not
	/// know.
	pub fn register_function<F>(
		&self,
		specification: impl Into<Spec>,
		dependencies: DependencyMap,
		scope: Option<&ScopeTag>,
		function: F,
	) -> DiResult<()>
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		let provider = FunctionProvider::new(dependencies, function);
		let provider = match scope {
			Some(tag) => provider.with_scope(self.scope_instance(tag)?),
			None => provider,
		};
		self.register_provider(specification, Arc::new(provider));
		Ok(())
	}

	/// Registers a pre-built value to be returned as-is for `specification`.
	pub fn register_instance<T: Any + Send + Sync>(
		&self,
		specification: impl Into<Spec>,
		instance: T,
	) {
		self.register_instance_arc(specification, to_object(instance));
	}

	/// Registers an already type-erased instance for `specification`.
	pub fn register_instance_arc(&self, specification: impl Into<Spec>, instance: Object) {
		self.register_provider(specification, Arc::new(InstanceProvider::new(instance)));
	}

	/// Registers a scope instance under `tag`, replacing any previous one.
	pub fn register_scope(&self, tag: impl Into<ScopeTag>, scope: Arc<dyn Scope>) {
		let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
		scopes.insert(tag.into(), scope);
	}

	/// Removes the scope registered under `tag`.
	///
	/// Providers already bound to the scope instance keep using it.
	///
	/// # Errors
	///
	/// [`DiError::UnknownScope`] when no scope is registered under the tag.
	pub fn unregister_scope(&self, tag: &ScopeTag) -> DiResult<()> {
		let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
		scopes
			.remove(tag)
			.map(|_| ())
			.ok_or_else(|| DiError::UnknownScope(tag.clone()))
	}

	/// The scope instance registered under `tag`.
	///
	/// # Errors
	///
	/// [`DiError::UnknownScope`] when no scope is registered under the tag.
	pub fn scope_instance(&self, tag: &ScopeTag) -> DiResult<Arc<dyn Scope>> {
		let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
		scopes
			.get(tag)
			.cloned()
			.ok_or_else(|| DiError::UnknownScope(tag.clone()))
	}

	/// Whether a provider is registered for `specification`.
	pub fn has_provider(&self, specification: &Spec) -> bool {
		let providers = self
			.providers
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		providers.contains_key(specification)
	}

	/// All registered specifications, in no particular order.
	pub fn specifications(&self) -> Vec<Spec> {
		let providers = self
			.providers
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		providers.keys().cloned().collect()
	}

	/// The provider registered for `specification`.
	///
	/// # Errors
	///
	/// [`DiError::UnknownSpecification`] when no provider is registered.
	pub fn provider(&self, specification: &Spec) -> DiResult<Arc<dyn Provider>> {
		let providers = self
			.providers
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		providers
			.get(specification)
			.cloned()
			.ok_or_else(|| DiError::UnknownSpecification(specification.clone()))
	}

	/// Resolves `specification`, filling the provider's argument slots from
	/// `overrides` and its declared dependencies.
	///
	/// For a conflicting slot the override value wins; override slots the
	/// provider never declared are passed through to the callable. Direct
	/// dependencies are resolved recursively without override propagation,
	/// factory dependencies receive a [`FactoryHandle`] instead of a value.
	///
	/// When the provider is scoped and its scope already holds an instance,
	/// that instance is returned without invoking anything.
	pub fn acquire(&self, specification: &Spec, overrides: Overrides) -> DiResult<Object> {
		let provider = self.provider(specification)?;

		if let Some(scope) = provider.scope() {
			if scope.contains(specification) {
				trace!(specification = %specification, "serving cached instance");
				return scope.load(specification);
			}
		}

		let mut realized = overrides;
		for (key, dependency) in provider.dependencies().iter() {
			if realized.contains(key) {
				continue;
			}
			match dependency {
				Dependency::Factory(target) => {
					realized.insert(
						key.clone(),
						to_object(FactoryHandle {
							graph: self.handle.clone(),
							specification: target.clone(),
						}),
					);
				}
				Dependency::Direct(target) => {
					realized.insert(key.clone(), self.acquire(target, Overrides::new())?);
				}
			}
		}

		trace!(specification = %specification, "invoking provider");
		let instance = provider.provide(realized.into_arguments())?;
		if let Some(scope) = provider.scope() {
			scope.store(specification, Arc::clone(&instance));
		}
		Ok(instance)
	}

	/// Resolves `specification` with no overrides.
	pub fn get(&self, specification: &Spec) -> DiResult<Object> {
		self.acquire(specification, Overrides::new())
	}

	/// Resolves `specification`, packing `arguments` into overrides under
	/// positions `0..n` and keyword names.
	pub fn get_with(&self, specification: &Spec, arguments: Arguments) -> DiResult<Object> {
		self.acquire(specification, Overrides::from(arguments))
	}

	/// Resolves `specification` and downcasts the instance to `T`.
	///
	/// # Errors
	///
	/// [`DiError::TypeMismatch`] when the produced instance is not a `T`.
	pub fn get_as<T: Any + Send + Sync>(&self, specification: &Spec) -> DiResult<Arc<T>> {
		let instance = self.get(specification)?;
		instance
			.downcast::<T>()
			.map_err(|_| DiError::TypeMismatch {
				subject: specification.to_string(),
				expected: std::any::type_name::<T>(),
			})
	}

	/// Asserts that every registered specification can actually be realized:
	/// all dependencies are present and there are no self-dependencies or
	/// dependency cycles.
	///
	/// Factory dependencies count as edges here even though resolution defers
	/// them, so a graph that would only loop at call time is still rejected.
	/// The first problem found aborts validation.
	///
	/// # Errors
	///
	/// [`DiError::MissingDependency`], [`DiError::SelfDependency`] or
	/// [`DiError::DependencyCycle`].
	pub fn validate(&self) -> DiResult<()> {
		let providers = {
			let providers = self
				.providers
				.read()
				.unwrap_or_else(PoisonError::into_inner);
			providers.clone()
		};

		// Tarjan's strongly connected components algorithm with an added
		// self-dependency check.
		let mut tarjan = Tarjan {
			providers: &providers,
			index: 0,
			indices: HashMap::new(),
			lowlinks: HashMap::new(),
			stack: Vec::new(),
		};
		for specification in providers.keys() {
			if !tarjan.indices.contains_key(specification) {
				tarjan.strongconnect(specification)?;
			}
		}
		debug!(providers = providers.len(), "object graph validated");
		Ok(())
	}
}

impl fmt::Debug for ObjectGraph {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let providers = self
			.providers
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
		f.debug_struct("ObjectGraph")
			.field("providers", &providers.len())
			.field("scopes", &scopes.keys().collect::<Vec<_>>())
			.finish()
	}
}

struct Tarjan<'graph> {
	providers: &'graph HashMap<Spec, Arc<dyn Provider>>,
	index: usize,
	indices: HashMap<Spec, usize>,
	lowlinks: HashMap<Spec, usize>,
	stack: Vec<Spec>,
}

impl Tarjan<'_> {
	fn strongconnect(&mut self, specification: &Spec) -> DiResult<()> {
		self.indices.insert(specification.clone(), self.index);
		self.lowlinks.insert(specification.clone(), self.index);
		self.index += 1;
		self.stack.push(specification.clone());

		let dependencies: Vec<Spec> = self.providers[specification]
			.dependencies()
			.iter()
			.map(|(_, dependency)| dependency.specification().clone())
			.collect();

		for dependency in dependencies {
			if !self.providers.contains_key(&dependency) {
				return Err(DiError::MissingDependency {
					dependant: specification.clone(),
					dependency,
				});
			}
			if dependency == *specification {
				return Err(DiError::SelfDependency(specification.clone()));
			}
			if !self.indices.contains_key(&dependency) {
				self.strongconnect(&dependency)?;
				let lowlink = self.lowlinks[specification].min(self.lowlinks[&dependency]);
				self.lowlinks.insert(specification.clone(), lowlink);
			} else if self.stack.contains(&dependency) {
				let lowlink = self.lowlinks[specification].min(self.indices[&dependency]);
				self.lowlinks.insert(specification.clone(), lowlink);
			}
		}

		if self.lowlinks[specification] == self.indices[specification] {
			let mut component = Vec::new();
			loop {
				let popped = self.stack.pop().expect("stack holds the component root");
				let done = popped == *specification;
				component.push(popped);
				if done {
					break;
				}
			}
			if component.len() > 1 {
				// Reversed pop order: each element depends on the previous
				// one and the first depends on the last.
				component.reverse();
				return Err(DiError::DependencyCycle(Cycle(component)));
			}
		}
		Ok(())
	}
}

/// A deferred-resolution handle injected for factory dependencies.
///
/// Calling the handle resolves its specification through the originating
/// graph at call time, so a wide-scoped object can repeatedly obtain fresh
/// or narrower-scoped instances.
pub struct FactoryHandle {
	graph: Weak<ObjectGraph>,
	specification: Spec,
}

impl FactoryHandle {
	/// The specification the handle resolves.
	pub fn specification(&self) -> &Spec {
		&self.specification
	}

	/// Resolves the specification with no extra arguments.
	pub fn call0(&self) -> DiResult<Object> {
		self.call(Arguments::new())
	}

	/// Resolves the specification, passing `arguments` as overrides the same
	/// way [`ObjectGraph::get_with`] does.
	///
	/// # Errors
	///
	/// [`DiError::GraphReleased`] when the graph was dropped before the call.
	pub fn call(&self, arguments: Arguments) -> DiResult<Object> {
		let graph = self
			.graph
			.upgrade()
			.ok_or_else(|| DiError::GraphReleased(self.specification.clone()))?;
		graph.get_with(&self.specification, arguments)
	}

	/// Resolves the specification and downcasts the instance to `T`.
	pub fn call_as<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
		let instance = self.call0()?;
		instance
			.downcast::<T>()
			.map_err(|_| DiError::TypeMismatch {
				subject: self.specification.to_string(),
				expected: std::any::type_name::<T>(),
			})
	}
}

impl fmt::Debug for FactoryHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FactoryHandle")
			.field("specification", &self.specification)
			.finish()
	}
}
