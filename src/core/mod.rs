//! Core workflow engine.
//!
//! This module contains:
//! - State: the shared record steps write into
//! - Graph: static topology, router, and the bounded retry branch
//! - Executor: the walk loop from start to terminal
//! - Extract: degrade-gracefully structured extraction
//! - Safety: the node-visit backstop

pub mod executor;
pub mod extract;
pub mod graph;
pub mod safety;
pub mod state;

// Re-export commonly used types
pub use executor::{Executor, RunReport};
pub use extract::{extract, Extraction, Tier};
pub use graph::{Edge, Graph, NodeId, Route, ValidationRouter};
pub use safety::{RunLimits, SafetyViolation, VisitTracker};
pub use state::{DocState, StateUpdate, TextField, DIAGRAM_FIELDS};
