//! Instance scopes
//!
//! A scope is a cache of produced instances keyed by [`Spec`], with a
//! lifecycle policy deciding how long and how widely cached values are
//! visible. The graph, never the provider, consults the scope before
//! invoking a provider and stores the result afterwards.
//!
//! Three lifecycle variants ship with the container: [`SingletonScope`]
//! (one process-wide cache), [`ProcessScope`] (reset when the process
//! identity changes, so forked children never see inherited state) and
//! [`ThreadScope`] (a disjoint cache per calling thread, created lazily).
//! Scopes never evict; a cache lives as long as its owner.

use crate::dependency::Object;
use crate::error::{DiError, DiResult};
use crate::spec::Spec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread::ThreadId;

/// The name under which a scope instance is registered with the graph.
///
/// # Examples
///
/// ```
/// use grappelli_di::ScopeTag;
///
/// assert_eq!(ScopeTag::SINGLETON.as_str(), "singleton");
/// let custom = ScopeTag::new("request");
/// assert_ne!(custom, ScopeTag::THREAD);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ScopeTag(Cow<'static, str>);

impl ScopeTag {
	/// The built-in singleton scope tag.
	pub const SINGLETON: ScopeTag = ScopeTag(Cow::Borrowed("singleton"));
	/// The built-in per-process scope tag.
	pub const PROCESS: ScopeTag = ScopeTag(Cow::Borrowed("process"));
	/// The built-in per-thread scope tag.
	pub const THREAD: ScopeTag = ScopeTag(Cow::Borrowed("thread"));

	/// A custom scope tag.
	pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&'static str> for ScopeTag {
	fn from(name: &'static str) -> Self {
		Self(Cow::Borrowed(name))
	}
}

impl fmt::Display for ScopeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A cache of produced instances keyed by specification.
///
/// Implementations must be safe under concurrent access: singleton and
/// process scopes are shared across every resolving thread. `store` is
/// last-write-wins: two threads racing on a cold entry may both invoke the
/// provider, and the second store simply overwrites the first.
pub trait Scope: Send + Sync {
	/// Whether an instance is cached for `specification`. No side effects.
	fn contains(&self, specification: &Spec) -> bool;

	/// Returns the cached instance for `specification`.
	///
	/// # Errors
	///
	/// [`DiError::NotCached`] when nothing was stored for the specification.
	fn load(&self, specification: &Spec) -> DiResult<Object>;

	/// Caches `instance` under `specification`, overwriting any previous
	/// value.
	fn store(&self, specification: &Spec, instance: Object);
}

/// Scope caching one instance per specification for the life of the graph.
///
/// # Examples
///
/// ```
/// use grappelli_di::{Scope, SingletonScope, Spec, to_object};
///
/// let scope = SingletonScope::new();
/// let spec = Spec::name("config");
///
/// assert!(!scope.contains(&spec));
/// scope.store(&spec, to_object(42i32));
/// assert!(scope.contains(&spec));
/// ```
#[derive(Default)]
pub struct SingletonScope {
	cache: RwLock<HashMap<Spec, Object>>,
}

impl SingletonScope {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Scope for SingletonScope {
	fn contains(&self, specification: &Spec) -> bool {
		let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
		cache.contains_key(specification)
	}

	fn load(&self, specification: &Spec) -> DiResult<Object> {
		let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
		cache
			.get(specification)
			.cloned()
			.ok_or_else(|| DiError::NotCached(specification.clone()))
	}

	fn store(&self, specification: &Spec, instance: Object) {
		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		cache.insert(specification.clone(), instance);
	}
}

struct ProcessState {
	pid: u32,
	cache: HashMap<Spec, Object>,
}

/// Scope caching per-process.
///
/// The whole cache is dropped when the observed process id differs from the
/// one recorded at the previous access, so instances created before a fork
/// are never served in the child.
pub struct ProcessScope {
	state: Mutex<ProcessState>,
}

impl ProcessScope {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(ProcessState {
				pid: std::process::id(),
				cache: HashMap::new(),
			}),
		}
	}

	fn with_current<R>(&self, f: impl FnOnce(&mut HashMap<Spec, Object>) -> R) -> R {
		let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
		let pid = std::process::id();
		if state.pid != pid {
			state.pid = pid;
			state.cache = HashMap::new();
		}
		f(&mut state.cache)
	}
}

impl Default for ProcessScope {
	fn default() -> Self {
		Self::new()
	}
}

impl Scope for ProcessScope {
	fn contains(&self, specification: &Spec) -> bool {
		self.with_current(|cache| cache.contains_key(specification))
	}

	fn load(&self, specification: &Spec) -> DiResult<Object> {
		self.with_current(|cache| {
			cache
				.get(specification)
				.cloned()
				.ok_or_else(|| DiError::NotCached(specification.clone()))
		})
	}

	fn store(&self, specification: &Spec, instance: Object) {
		self.with_current(|cache| {
			cache.insert(specification.clone(), instance);
		});
	}
}

/// Scope caching per calling thread.
///
/// Each thread sees its own disjoint cache, created lazily on first store
/// from that thread, so no cross-thread synchronization of cached values is
/// ever needed.
#[derive(Default)]
pub struct ThreadScope {
	caches: RwLock<HashMap<ThreadId, HashMap<Spec, Object>>>,
}

impl ThreadScope {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Scope for ThreadScope {
	fn contains(&self, specification: &Spec) -> bool {
		let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
		caches
			.get(&std::thread::current().id())
			.is_some_and(|cache| cache.contains_key(specification))
	}

	fn load(&self, specification: &Spec) -> DiResult<Object> {
		let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
		caches
			.get(&std::thread::current().id())
			.and_then(|cache| cache.get(specification))
			.cloned()
			.ok_or_else(|| DiError::NotCached(specification.clone()))
	}

	fn store(&self, specification: &Spec, instance: Object) {
		let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
		caches
			.entry(std::thread::current().id())
			.or_default()
			.insert(specification.clone(), instance);
	}
}
