//! Propellant mixer rules engine.
//!
//! Connected propellant slots are resolved into a combination, the thruster's
//! stats are rescaled against the combination it was built with, and engines
//! simulate ignition with optional ignitor resources. The member crates are
//! re-exported here so front-ends depend on a single library.

pub use mixer_config as config;
pub use mixer_core as common;
pub use mixer_export as export;
pub use mixer_ignition as ignition;
pub use mixer_propulsion as propulsion;
pub use mixer_rescale as rescale;
pub use mixer_resolver as resolver;
pub use mixer_thruster as thruster;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
