//! Built-in scraper units
//!
//! Every unit in this module is listed in [`register_all`]; adding a unit
//! means adding its module here and one `register` line.

pub mod example;
pub mod sencanada;

use crate::registry::Registry;

/// Registers every built-in unit, in run order
pub fn register_all(registry: Registry) -> Registry {
    registry
        .register(sencanada::NAME, sencanada::build)
        .register(example::NAME, example::build)
}
