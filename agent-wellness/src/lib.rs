//! The `holistic-wellness` capabilities.
//!
//! [`scoring`] holds the pure scoring rules, [`plans`] the meal and breathing
//! catalogs, and [`capabilities`] wires both into a
//! [`CapabilityRegistry`](agent_tools::CapabilityRegistry).

#![warn(missing_docs, clippy::pedantic)]

pub mod capabilities;
pub mod plans;
pub mod scoring;

pub use capabilities::{
    BREATHING_SESSION, MEAL_PLAN, PROCESS_DATASTREAM, register, wellness_report,
};
pub use scoring::{
    AvatarState, Category, Signals, WellnessReport, compute_wellness, map_to_category,
};
