//! Generic tree-producing parser

pub mod engine;
pub mod tree;

pub use engine::Parser;
pub use tree::{NodeId, ParseTree};
