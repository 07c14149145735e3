//! Output formatting for topology plans.
//!
//! This module handles rendering a plan:
//! - [`csv`] - CSV output formatting
//! - [`json`] - JSON document output
//! - [`terminal`] - Terminal helpers with colors

mod csv;
mod json;
mod terminal;

pub use csv::{format_row, plan_print, plan_rows, PlanPrintRow};
pub use json::plan_json;
pub use terminal::{format_field, plan_summary};
