//! Providers: the recipes the graph invokes to produce instances
//!
//! Three provider flavours exist. A [`FactoryProvider`] invokes its callable
//! and yields whatever the callable returns. A [`FunctionProvider`] does not
//! invoke anything at resolution time; it yields a [`BoundFunction`] holding
//! the callable together with the resolved dependencies, to be called later
//! with further arguments. An [`InstanceProvider`] yields a pre-built value
//! as-is.

use crate::dependency::{Arguments, DependencyMap, Object, to_object};
use crate::error::DiResult;
use crate::scope::Scope;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// The callable signature every factory and function provider wraps.
pub type ProviderFn = dyn Fn(Arguments) -> DiResult<Object> + Send + Sync;

/// A recipe for producing instances of one specification.
pub trait Provider: Send + Sync {
	/// The argument slots this provider needs the graph to fill.
	fn dependencies(&self) -> &DependencyMap;

	/// The scope caching this provider's instances, if any.
	fn scope(&self) -> Option<&Arc<dyn Scope>> {
		None
	}

	/// Produces an instance from fully resolved arguments.
	fn provide(&self, arguments: Arguments) -> DiResult<Object>;
}

/// Provider invoking a callable with resolved arguments on every request.
///
/// # Examples
///
/// ```
/// use grappelli_di::{Arguments, DependencyMap, FactoryProvider, Provider, to_object};
///
/// let provider = FactoryProvider::new(DependencyMap::new(), |_args| Ok(to_object(5i32)));
/// let instance = provider.provide(Arguments::new()).unwrap();
/// assert_eq!(*instance.downcast::<i32>().unwrap(), 5);
/// ```
pub struct FactoryProvider {
	dependencies: DependencyMap,
	factory: Arc<ProviderFn>,
	scope: Option<Arc<dyn Scope>>,
}

impl FactoryProvider {
	pub fn new<F>(dependencies: DependencyMap, factory: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		Self::from_shared(dependencies, Arc::new(factory))
	}

	/// Builds a provider around an already shared callable.
	pub fn from_shared(dependencies: DependencyMap, factory: Arc<ProviderFn>) -> Self {
		Self {
			dependencies,
			factory,
			scope: None,
		}
	}

	/// Attaches the scope caching this provider's instances.
	pub fn with_scope(mut self, scope: Arc<dyn Scope>) -> Self {
		self.scope = Some(scope);
		self
	}
}

impl Provider for FactoryProvider {
	fn dependencies(&self) -> &DependencyMap {
		&self.dependencies
	}

	fn scope(&self) -> Option<&Arc<dyn Scope>> {
		self.scope.as_ref()
	}

	fn provide(&self, arguments: Arguments) -> DiResult<Object> {
		(self.factory)(arguments)
	}
}

/// Provider yielding the callable itself, partially applied with its
/// resolved dependencies.
///
/// Resolving a function specification never invokes the callable; the caller
/// receives a [`BoundFunction`] and decides when, and with which extra
/// arguments, to call it.
pub struct FunctionProvider {
	dependencies: DependencyMap,
	function: Arc<ProviderFn>,
	scope: Option<Arc<dyn Scope>>,
}

impl FunctionProvider {
	pub fn new<F>(dependencies: DependencyMap, function: F) -> Self
	where
		F: Fn(Arguments) -> DiResult<Object> + Send + Sync + 'static,
	{
		Self::from_shared(dependencies, Arc::new(function))
	}

	pub fn from_shared(dependencies: DependencyMap, function: Arc<ProviderFn>) -> Self {
		Self {
			dependencies,
			function,
			scope: None,
		}
	}

	/// Attaches the scope caching this provider's bound functions.
	pub fn with_scope(mut self, scope: Arc<dyn Scope>) -> Self {
		self.scope = Some(scope);
		self
	}
}

impl Provider for FunctionProvider {
	fn dependencies(&self) -> &DependencyMap {
		&self.dependencies
	}

	fn scope(&self) -> Option<&Arc<dyn Scope>> {
		self.scope.as_ref()
	}

	fn provide(&self, arguments: Arguments) -> DiResult<Object> {
		Ok(to_object(BoundFunction {
			function: Arc::clone(&self.function),
			injected: arguments,
		}))
	}
}

/// A callable partially applied with injected dependencies.
///
/// Call-time arguments win over injected ones slot by slot: call positional
/// arguments overwrite the injected prefix (and extend past it), call
/// keywords replace injected keywords of the same name.
///
/// # Examples
///
/// ```
/// use grappelli_di::{Arguments, BoundFunction, to_object};
/// use std::sync::Arc;
///
/// let bound = BoundFunction::new(
/// 	Arc::new(|args: Arguments| {
/// 		let a = *args.positional_as::<i32>(0)?;
/// 		let b = *args.positional_as::<i32>(1)?;
/// 		Ok(to_object(a + b))
/// 	}),
/// 	Arguments::new()
/// 		.with_positional(to_object(1i32))
/// 		.with_positional(to_object(2i32)),
/// );
///
/// // The call-supplied 10 replaces the injected 1.
/// let sum = bound
/// 	.call(Arguments::new().with_positional(to_object(10i32)))
/// 	.unwrap();
/// assert_eq!(*sum.downcast::<i32>().unwrap(), 12);
/// ```
pub struct BoundFunction {
	function: Arc<ProviderFn>,
	injected: Arguments,
}

impl BoundFunction {
	pub fn new(function: Arc<ProviderFn>, injected: Arguments) -> Self {
		Self { function, injected }
	}

	/// The injected arguments the function was bound with.
	pub fn injected(&self) -> &Arguments {
		&self.injected
	}

	/// Invokes the function with the injected arguments alone.
	pub fn call0(&self) -> DiResult<Object> {
		self.call(Arguments::new())
	}

	/// Invokes the function, merging `arguments` over the injected ones.
	pub fn call(&self, arguments: Arguments) -> DiResult<Object> {
		let mut positional = self.injected.positional.clone();
		for (position, value) in arguments.positional.into_iter().enumerate() {
			if position < positional.len() {
				positional[position] = value;
			} else {
				positional.push(value);
			}
		}

		let mut keyword: HashMap<Cow<'static, str>, Object> = self.injected.keyword.clone();
		keyword.extend(arguments.keyword);

		(self.function)(Arguments { positional, keyword })
	}
}

/// Provider returning a pre-built instance.
///
/// Instances are their own cache, so instance providers accept no scope.
/// The dependency map is always empty.
pub struct InstanceProvider {
	instance: Object,
	dependencies: DependencyMap,
}

impl InstanceProvider {
	pub fn new(instance: Object) -> Self {
		Self {
			instance,
			dependencies: DependencyMap::new(),
		}
	}
}

impl Provider for InstanceProvider {
	fn dependencies(&self) -> &DependencyMap {
		&self.dependencies
	}

	fn provide(&self, _arguments: Arguments) -> DiResult<Object> {
		Ok(Arc::clone(&self.instance))
	}
}
