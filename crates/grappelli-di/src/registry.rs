//! Static module discovery
//!
//! Modules can be announced at link time and installed in one call, so an
//! application binary assembles its graph without a central list of every
//! configuration module.

use crate::error::DiResult;
use crate::graph::ObjectGraph;
use crate::module::Module;
use tracing::debug;

/// A module announced for static discovery.
///
/// Entries are collected at link time; the constructor builds a fresh module
/// value each time discovery runs.
pub struct ModuleEntry {
	/// Human-readable name, used for logging and deterministic ordering.
	pub name: &'static str,
	pub constructor: fn() -> Box<dyn Module>,
}

inventory::collect!(ModuleEntry);

/// Announces a module for discovery by [`ObjectGraph::install_discovered`].
///
/// # Example
///
/// ```rust,ignore
/// use grappelli_di::{register_module, Binder, DiResult, Module};
///
/// struct DatabaseModule;
///
/// impl Module for DatabaseModule {
/// 	fn configure(&self, binder: &mut Binder) -> DiResult<()> {
/// 		Ok(())
/// 	}
/// }
///
/// register_module!("database", || Box::new(DatabaseModule));
/// ```
#[macro_export]
macro_rules! register_module {
	($name:expr, $constructor:expr) => {
		$crate::inventory::submit! {
			$crate::ModuleEntry {
				name: $name,
				constructor: $constructor,
			}
		}
	};
}

/// All announced modules, sorted by name.
///
/// Link-time collection order is unspecified, so the sort keeps installs
/// deterministic across builds.
pub fn discovered_modules() -> Vec<&'static ModuleEntry> {
	let mut entries: Vec<&'static ModuleEntry> = inventory::iter::<ModuleEntry>().collect();
	entries.sort_by_key(|entry| entry.name);
	entries
}

impl ObjectGraph {
	/// Installs every announced module, in name order.
	///
	/// The first failing install aborts and its error is returned; modules
	/// installed before the failure stay registered.
	pub fn install_discovered(&self) -> DiResult<()> {
		for entry in discovered_modules() {
			debug!(module = entry.name, "installing discovered module");
			let module = (entry.constructor)();
			self.install(module.as_ref())?;
		}
		Ok(())
	}
}
