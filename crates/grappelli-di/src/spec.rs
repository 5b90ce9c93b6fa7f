//! Specifications: the hashable keys identifying requestable things
//!
//! A [`Spec`] is a structural value: a name, a Rust type, an ordered tuple of
//! further specifications, or a *categorized* tuple. Categories let two
//! structurally equal keys coexist without colliding: two subsystems can
//! both key a provider on `"database"` as long as they declare different
//! category marker types.
//!
//! # Examples
//!
//! ```
//! use grappelli_di::Spec;
//!
//! struct Public;
//! struct Secret;
//!
//! let public = Spec::categorized::<Public>([Spec::name("database")]);
//! let secret = Spec::categorized::<Secret>([Spec::name("database")]);
//!
//! assert_ne!(public, secret);
//! ```

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A Rust type used as a specification element or a category marker.
///
/// Equality and hashing consider only the [`TypeId`]; the type name is
/// carried solely for display.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Builds the key for type `T`.
	pub fn of<T: 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// The full name of the underlying type.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// The type name with its module path stripped.
	pub fn short_name(&self) -> &'static str {
		self.name.rsplit("::").next().unwrap_or(self.name)
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.short_name())
	}
}

/// A specification: the key under which a provider is registered and an
/// instance is requested.
///
/// Specifications compare structurally and hash stably for the lifetime of
/// the graph, so they are usable as map keys everywhere in the container.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Spec {
	/// A plain string key.
	Name(Cow<'static, str>),
	/// A Rust type used as a key.
	Type(TypeKey),
	/// An ordered tuple of specifications, used to disambiguate overlapping
	/// names, e.g. `(db_connection, "archive")`.
	Tuple(Vec<Spec>),
	/// A tuple scoped to a category marker type. Structurally equal tuples
	/// under different categories are distinct specifications.
	Categorized(TypeKey, Vec<Spec>),
}

impl Spec {
	/// A string specification.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_di::Spec;
	///
	/// assert_eq!(Spec::name("db"), Spec::from("db"));
	/// ```
	pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
		Self::Name(name.into())
	}

	/// A specification keyed by the Rust type `T`.
	pub fn of<T: 'static>() -> Self {
		Self::Type(TypeKey::of::<T>())
	}

	/// An ordered tuple of specification elements.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_di::Spec;
	///
	/// let archive = Spec::tuple([Spec::name("db"), Spec::name("archive")]);
	/// assert_eq!(archive.to_string(), "(db, archive)");
	/// ```
	pub fn tuple(elements: impl IntoIterator<Item = Spec>) -> Self {
		Self::Tuple(elements.into_iter().collect())
	}

	/// A tuple wrapped in category `C`.
	pub fn categorized<C: 'static>(elements: impl IntoIterator<Item = Spec>) -> Self {
		Self::Categorized(TypeKey::of::<C>(), elements.into_iter().collect())
	}
}

impl From<&'static str> for Spec {
	fn from(name: &'static str) -> Self {
		Self::Name(Cow::Borrowed(name))
	}
}

impl From<String> for Spec {
	fn from(name: String) -> Self {
		Self::Name(Cow::Owned(name))
	}
}

impl fmt::Display for Spec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fn write_elements(f: &mut fmt::Formatter<'_>, elements: &[Spec]) -> fmt::Result {
			f.write_str("(")?;
			for (position, element) in elements.iter().enumerate() {
				if position > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{element}")?;
			}
			f.write_str(")")
		}

		match self {
			Self::Name(name) => f.write_str(name),
			Self::Type(key) => write!(f, "{key}"),
			Self::Tuple(elements) => write_elements(f, elements),
			Self::Categorized(category, elements) => {
				write!(f, "{category}")?;
				write_elements(f, elements)
			}
		}
	}
}
