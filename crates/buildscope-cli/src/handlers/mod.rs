pub mod config;
pub mod diff;
pub mod explain;
pub mod tree;
