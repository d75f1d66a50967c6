//! Domain models for work-time calculations.
//!
//! This module contains the calculation input as entered by the user, the
//! conversion model that turns it into time breakdowns, and configuration.

/// Calculation input and validation.
pub mod input;
pub use input::{CalculationInput, Field, InvalidInputError, ParsedInput};

/// The price-to-work-time conversion model.
pub mod model;
pub use model::{CalculationResult, HourlyRate, TimeBreakdown, compute_result};

mod config;
pub use config::Config;
