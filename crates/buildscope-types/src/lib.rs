pub mod config;
pub mod error;
pub mod event;
pub mod tree;

pub use config::*;
pub use error::{Error, Result};
pub use event::*;
pub use tree::*;
