pub mod event;
pub mod payload;
pub mod record;

pub use event::*;
pub use payload::*;
pub use record::*;
