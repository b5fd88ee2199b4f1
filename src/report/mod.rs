//! Rendering and export.
//!
//! Tabular terminal output, CSV export, and the terminal points chart.
//! Everything here consumes the aggregator's plain data structures; no
//! fetching or accumulation happens at this layer.

pub mod chart;
pub mod export;
pub mod table;
