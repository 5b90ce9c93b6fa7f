//! Error types for the object graph and its collaborators

use crate::scope::ScopeTag;
use crate::spec::Spec;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while registering, validating or resolving
/// providers.
///
/// Every variant aborts the operation that raised it; the container performs
/// no retries and no partial recovery. Configuration errors are meant to be
/// fixed by the operator, not handled at run time.
#[derive(Debug, Error)]
pub enum DiError {
	/// `acquire`/`get` referenced a specification with no registered provider.
	#[error("no provider registered for specification {0}")]
	UnknownSpecification(Spec),

	/// A provider was registered against a scope tag unknown to the graph.
	#[error("scope tag {0} was not registered within the object graph")]
	UnknownScope(ScopeTag),

	/// A provider is dependent, directly or through a factory request, on the
	/// specification it itself provides.
	#[error("provider for {0} is dependent on itself")]
	SelfDependency(Spec),

	/// A provider depends on a specification that cannot be satisfied within
	/// the object graph.
	#[error("cannot find dependency {dependency} for {dependant} provider")]
	MissingDependency {
		/// Specification of the provider whose dependency cannot be satisfied.
		dependant: Spec,
		/// Specification of the missing dependency.
		dependency: Spec,
	},

	/// Two or more specifications are mutually dependent.
	#[error("dependency cycle: {0}")]
	DependencyCycle(Cycle),

	/// A scope was asked to load an instance it never cached.
	#[error("no cached instance for specification {0}")]
	NotCached(Spec),

	/// A module declared more than one provider for a single specification.
	#[error("module declares more than one provider for specification {0}")]
	DuplicateProvider(Spec),

	/// A deferred factory handle outlived the object graph it was minted by.
	#[error("object graph was released before the factory for {0} was called")]
	GraphReleased(Spec),

	/// A value did not downcast to the type the caller expected.
	#[error("value for {subject} does not have the expected type {expected}")]
	TypeMismatch {
		/// What was being downcast, e.g. a specification or an argument slot.
		subject: String,
		/// Name of the expected Rust type.
		expected: &'static str,
	},

	/// A user-supplied provider callable failed.
	#[error("provider for {specification} failed")]
	Provider {
		/// Specification the failing provider was registered under.
		specification: Spec,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

impl DiError {
	/// Wraps an arbitrary error raised inside a provider callable.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_di::{DiError, Spec};
	///
	/// let err = DiError::provider(Spec::name("db"), "connection refused");
	/// assert_eq!(err.to_string(), "provider for db failed");
	/// ```
	pub fn provider(
		specification: Spec,
		source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
	) -> Self {
		Self::Provider {
			specification,
			source: source.into(),
		}
	}
}

pub type DiResult<T> = Result<T, DiError>;

/// An ordered dependency cycle.
///
/// Each element depends on the previous one and the first element depends on
/// the last, so the rendered form repeats the first element at the end.
///
/// # Examples
///
/// ```
/// use grappelli_di::{Cycle, Spec};
///
/// let cycle = Cycle(vec![Spec::name("a"), Spec::name("b")]);
/// assert_eq!(cycle.to_string(), "a -> b -> a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle(pub Vec<Spec>);

impl Cycle {
	/// Specifications participating in the cycle, in dependency order.
	pub fn specifications(&self) -> &[Spec] {
		&self.0
	}
}

impl fmt::Display for Cycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (position, specification) in self.0.iter().enumerate() {
			if position > 0 {
				write!(f, " -> ")?;
			}
			write!(f, "{specification}")?;
		}
		if let Some(first) = self.0.first() {
			write!(f, " -> {first}")?;
		}
		Ok(())
	}
}
