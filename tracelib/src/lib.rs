//! # TraceLib
//!
//! Tracelib mechanizes the bookkeeping of manual cache-trace exercises
//!
//! Given a sequence of memory accesses and a cache organization it reproduces, access by access,
//! the hit/miss outcome, the cache lines touched, and whether a replacement occurred. Four
//! organizations are covered (direct-mapped, fully-associative, 2-way and 4-way set-associative)
//! in two modes: deriving tag/index/offset from raw addresses, or completing rows whose fields
//! were already decomposed by hand
//!
//! Traces are short and pedagogical, so the library prioritises faithfulness to the worked-table
//! conventions over throughput

/// Contains the occupancy stores for the four cache organizations, with their replacement rules
pub mod cache;

/// Contains definitions for the JSON input format accepted by the simulator
pub mod config;

/// Contains the address-expression evaluator used by the command line front end
pub mod expr;

/// Contains cache geometry resolution and address decomposition
pub mod geometry;

/// Contains the ordered result row type shared by both simulation modes
pub mod row;

/// Contains the simulators that drive a store over a trace or over pre-decomposed rows
pub mod simulator;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
