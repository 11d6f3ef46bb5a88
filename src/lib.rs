//! Traceweave
//!
//! Turns the flat, time-ordered call-event log produced by an external
//! instrumentation collector into a navigable execution graph, and answers
//! two questions over it:
//!
//! - what is the call stack at the moment a given event occurred?
//! - what are all the distinct alternative call stacks that could have
//!   reached an equivalent program point?
//!
//! The latter feeds debugger-style "where" datasets. A pattern compressor
//! additionally folds long repeating event runs (loops, recursive fan-out)
//! into nested group descriptors for presentation.
//!
//! The collector itself (frame inspection, breakpoint triggers, argument
//! capture) is out of scope; this crate consumes its JSON event contract
//! and hands structured results back to external formatting tools.

pub mod graph;
pub mod output;
pub mod parser;
pub mod paths;
pub mod patterns;
pub mod utils;
