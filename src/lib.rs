//! standoc - Graph-driven generator for standard framework documentation
//!
//! A fixed pipeline of generator-backed steps walks a directed graph and
//! fills a shared state with the sections of a framework standard. One
//! conditional branch retries diagram generation a bounded number of
//! times; the run always terminates, accepting degraded content once the
//! cap is reached. The final state is emitted as an mkdocs site.
//!
//! # Architecture
//!
//! - `core`: the workflow engine (state, graph, router, executor,
//!   extraction ladder, visit backstop)
//! - `steps`: the concrete pipeline steps
//! - `adapters`: external collaborators (Gemini generator, mermaid CLI)
//! - `site`: the documentation emitter, run once after the terminal node
//! - `config`: layered settings, injected at construction time
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate a documentation site
//! standoc generate --topic "High TPS API Service"
//!
//! # Check the environment
//! standoc doctor
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod site;
pub mod steps;

// Re-export main types at crate root for convenience
pub use config::Settings;
pub use core::{DocState, Executor, Graph, NodeId, RunReport, StateUpdate, TextField};
pub use steps::{standard_steps, Step, StepRegistry};
