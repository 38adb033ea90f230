//! Power network resolution for the Spheric simulation (spec.md 4.F).
//!
//! # Modules
//!
//! - [`error`] -- Error types for power resolution.
//! - [`resolver`] -- Flood-fill network construction and brownout rules.

pub mod error;
pub mod resolver;

pub use error::PowerError;
pub use resolver::{
    PRODUCER_CAPACITY, PowerNode, bio_generator_output, is_power_carrying, power_draw,
    power_radius, resolve_networks, shadow_panel_power_output,
};
