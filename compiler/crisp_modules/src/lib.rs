//! Modules bundled with crisp.
//!
//! - [`stdlib`]: the `std` module every interpreter starts with
//! - [`aragonos`]: commands for Aragon DAOs, loaded with `load aragonos`
//!
//! [`default_registry`] knows both.

pub mod aragonos;
pub mod stdlib;

mod tx;

#[cfg(test)]
mod test_support;

use crisp_eval::ModuleRegistry;

/// A registry with every bundled module.
pub fn default_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry
        .register(stdlib::NAME, stdlib::module)
        .register(aragonos::NAME, aragonos::module);
    registry
}
