//! Dependency declarations and resolved argument plumbing
//!
//! Providers declare what they need as a [`DependencyMap`]: an explicit,
//! ordered mapping from argument slots to specifications. The map is a
//! first-class value handed over at registration time, so the graph can
//! inspect and validate it without invoking anything. Nothing is inferred by
//! reflection.

use crate::error::{DiError, DiResult};
use crate::spec::Spec;
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased produced instance, shared between scopes and callers.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Erases a value into an [`Object`].
///
/// # Examples
///
/// ```
/// use grappelli_di::{downcast_object, to_object};
///
/// let obj = to_object(7i32);
/// assert_eq!(*downcast_object::<i32>(&obj).unwrap(), 7);
/// ```
pub fn to_object<T: Any + Send + Sync>(value: T) -> Object {
	Arc::new(value)
}

/// Attempts to recover a typed handle from an [`Object`].
pub fn downcast_object<T: Any + Send + Sync>(object: &Object) -> Option<Arc<T>> {
	object.clone().downcast::<T>().ok()
}

/// An argument slot of a provider callable: a 0-based position or a name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ArgKey {
	/// Positional slot.
	Position(usize),
	/// Keyword slot.
	Name(Cow<'static, str>),
}

impl From<usize> for ArgKey {
	fn from(position: usize) -> Self {
		Self::Position(position)
	}
}

impl From<&'static str> for ArgKey {
	fn from(name: &'static str) -> Self {
		Self::Name(Cow::Borrowed(name))
	}
}

impl fmt::Display for ArgKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Position(position) => write!(f, "positional argument {position}"),
			Self::Name(name) => write!(f, "keyword argument `{name}`"),
		}
	}
}

/// A declared dependency of a provider.
///
/// A `Direct` dependency is resolved eagerly before the provider is invoked.
/// A `Factory` dependency injects a deferred-resolution handle instead: the
/// provider receives a callable that resolves the target specification each
/// time it is invoked. Factories are how a long-lived object obtains fresh
/// instances from a narrower scope, e.g. a per-thread database connection
/// inside an application singleton.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Dependency {
	/// Resolve the specification before invoking the provider.
	Direct(Spec),
	/// Inject a [`FactoryHandle`](crate::graph::FactoryHandle) for the
	/// specification instead of a resolved value.
	Factory(Spec),
}

impl Dependency {
	/// A directly resolved dependency.
	pub fn direct(specification: impl Into<Spec>) -> Self {
		Self::Direct(specification.into())
	}

	/// A deferred factory-request dependency.
	pub fn factory(specification: impl Into<Spec>) -> Self {
		Self::Factory(specification.into())
	}

	/// The target specification, regardless of resolution mode.
	pub fn specification(&self) -> &Spec {
		match self {
			Self::Direct(specification) | Self::Factory(specification) => specification,
		}
	}

	/// Whether this dependency injects a deferred handle.
	pub fn is_deferred(&self) -> bool {
		matches!(self, Self::Factory(_))
	}
}

impl From<Spec> for Dependency {
	fn from(specification: Spec) -> Self {
		Self::Direct(specification)
	}
}

impl From<&'static str> for Dependency {
	fn from(name: &'static str) -> Self {
		Self::Direct(Spec::from(name))
	}
}

impl From<String> for Dependency {
	fn from(name: String) -> Self {
		Self::Direct(Spec::from(name))
	}
}

/// A provider's declared dependency map: `argument slot -> specification`.
///
/// Entries keep their declaration order; re-declaring a slot replaces the
/// previous entry in place.
///
/// # Examples
///
/// ```
/// use grappelli_di::{ArgKey, Dependency, DependencyMap, Spec};
///
/// let deps = DependencyMap::new()
/// 	.with_position(Spec::name("logger"))
/// 	.with_named("db", Dependency::factory(Spec::name("db_connection")));
///
/// assert_eq!(deps.len(), 2);
/// assert!(deps.contains_key(&ArgKey::Position(0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DependencyMap {
	entries: Vec<(ArgKey, Dependency)>,
}

impl DependencyMap {
	/// An empty dependency map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces the dependency for `key`.
	pub fn insert(&mut self, key: impl Into<ArgKey>, dependency: impl Into<Dependency>) {
		let key = key.into();
		let dependency = dependency.into();
		if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
			entry.1 = dependency;
		} else {
			self.entries.push((key, dependency));
		}
	}

	/// Appends a dependency at the next free positional slot.
	pub fn with_position(mut self, dependency: impl Into<Dependency>) -> Self {
		let next = self
			.entries
			.iter()
			.filter_map(|(key, _)| match key {
				ArgKey::Position(position) => Some(position + 1),
				ArgKey::Name(_) => None,
			})
			.max()
			.unwrap_or(0);
		self.insert(ArgKey::Position(next), dependency);
		self
	}

	/// Declares a dependency at an explicit positional slot.
	pub fn with_at(mut self, position: usize, dependency: impl Into<Dependency>) -> Self {
		self.insert(ArgKey::Position(position), dependency);
		self
	}

	/// Declares a dependency for a keyword slot.
	pub fn with_named(
		mut self,
		name: impl Into<Cow<'static, str>>,
		dependency: impl Into<Dependency>,
	) -> Self {
		self.insert(ArgKey::Name(name.into()), dependency);
		self
	}

	/// Looks up the dependency declared for `key`.
	pub fn get(&self, key: &ArgKey) -> Option<&Dependency> {
		self.entries
			.iter()
			.find(|(existing, _)| existing == key)
			.map(|(_, dependency)| dependency)
	}

	pub fn contains_key(&self, key: &ArgKey) -> bool {
		self.get(key).is_some()
	}

	/// Iterates entries in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&ArgKey, &Dependency)> {
		self.entries.iter().map(|(key, dependency)| (key, dependency))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Fully resolved arguments handed to a provider callable, partitioned into
/// positional and keyword buckets.
#[derive(Clone, Default)]
pub struct Arguments {
	pub(crate) positional: Vec<Object>,
	pub(crate) keyword: HashMap<Cow<'static, str>, Object>,
}

impl Arguments {
	/// No arguments.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a positional argument.
	pub fn with_positional(mut self, value: Object) -> Self {
		self.positional.push(value);
		self
	}

	/// Sets a keyword argument, replacing any previous value for the name.
	pub fn with_keyword(mut self, name: impl Into<Cow<'static, str>>, value: Object) -> Self {
		self.keyword.insert(name.into(), value);
		self
	}

	/// The positional bucket, in ascending slot order.
	pub fn positional(&self) -> &[Object] {
		&self.positional
	}

	/// The positional argument at `position`, if present.
	pub fn get(&self, position: usize) -> Option<&Object> {
		self.positional.get(position)
	}

	/// The keyword argument named `name`, if present.
	pub fn keyword(&self, name: &str) -> Option<&Object> {
		self.keyword.get(name)
	}

	pub fn len(&self) -> usize {
		self.positional.len() + self.keyword.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positional.is_empty() && self.keyword.is_empty()
	}

	/// Downcasts the positional argument at `position`.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_di::{Arguments, to_object};
	///
	/// let args = Arguments::new().with_positional(to_object(33i32));
	/// assert_eq!(*args.positional_as::<i32>(0).unwrap(), 33);
	/// ```
	pub fn positional_as<T: Any + Send + Sync>(&self, position: usize) -> DiResult<Arc<T>> {
		self.get(position)
			.and_then(downcast_object::<T>)
			.ok_or_else(|| DiError::TypeMismatch {
				subject: ArgKey::Position(position).to_string(),
				expected: std::any::type_name::<T>(),
			})
	}

	/// Downcasts the keyword argument named `name`.
	pub fn keyword_as<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
		self.keyword(name)
			.and_then(downcast_object::<T>)
			.ok_or_else(|| DiError::TypeMismatch {
				subject: ArgKey::Name(Cow::Owned(name.to_owned())).to_string(),
				expected: std::any::type_name::<T>(),
			})
	}
}

impl fmt::Debug for Arguments {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Arguments")
			.field("positional", &self.positional.len())
			.field("keyword", &self.keyword.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Caller-supplied argument overrides for [`acquire`](crate::ObjectGraph::acquire).
///
/// Values present here always win over injected dependencies for the same
/// slot, and fill in slots the provider never declared.
#[derive(Clone, Default)]
pub struct Overrides {
	values: HashMap<ArgKey, Object>,
}

impl Overrides {
	/// No overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the value for an argument slot.
	pub fn insert(&mut self, key: impl Into<ArgKey>, value: Object) {
		self.values.insert(key.into(), value);
	}

	/// Sets a positional slot.
	pub fn with_position(mut self, position: usize, value: Object) -> Self {
		self.insert(ArgKey::Position(position), value);
		self
	}

	/// Sets a keyword slot.
	pub fn with_named(mut self, name: impl Into<Cow<'static, str>>, value: Object) -> Self {
		self.insert(ArgKey::Name(name.into()), value);
		self
	}

	pub fn contains(&self, key: &ArgKey) -> bool {
		self.values.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Partitions the realized slot map into provider-callable arguments.
	///
	/// Positional slots are ordered by ascending index; gaps are permitted
	/// and simply close up, mirroring how a sorted argument list is built.
	pub(crate) fn into_arguments(self) -> Arguments {
		let mut positional: Vec<(usize, Object)> = Vec::new();
		let mut keyword = HashMap::new();
		for (key, value) in self.values {
			match key {
				ArgKey::Position(position) => positional.push((position, value)),
				ArgKey::Name(name) => {
					keyword.insert(name, value);
				}
			}
		}
		positional.sort_by_key(|(position, _)| *position);
		Arguments {
			positional: positional.into_iter().map(|(_, value)| value).collect(),
			keyword,
		}
	}
}

impl From<Arguments> for Overrides {
	/// Packs positional arguments under keys `0..n` and keyword arguments
	/// under their names, matching the `get`-style calling convention.
	fn from(arguments: Arguments) -> Self {
		let mut overrides = Self::new();
		for (position, value) in arguments.positional.into_iter().enumerate() {
			overrides.insert(ArgKey::Position(position), value);
		}
		for (name, value) in arguments.keyword {
			overrides.insert(ArgKey::Name(name), value);
		}
		overrides
	}
}
