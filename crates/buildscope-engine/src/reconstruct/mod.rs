mod reconstructor;
mod unknown;

pub use reconstructor::Reconstructor;
pub use unknown::UnknownDataTally;

use buildscope_types::{LogRecord, Result, Tree, UnknownDataBehavior};

/// Knobs for one reconstruction run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// What to do with records the reader does not understand
    pub unknown_data_behavior: UnknownDataBehavior,
    /// Run the bulk string-interning pass once the stream is exhausted
    pub intern_strings: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            unknown_data_behavior: UnknownDataBehavior::Warning,
            intern_strings: true,
        }
    }
}

impl ReconstructOptions {
    pub fn with_unknown_data_behavior(mut self, behavior: UnknownDataBehavior) -> Self {
        self.unknown_data_behavior = behavior;
        self
    }

    pub fn with_interning(mut self, enabled: bool) -> Self {
        self.intern_strings = enabled;
        self
    }
}

/// Fold a complete record stream into a finished tree
pub fn reconstruct<I>(records: I, options: ReconstructOptions) -> Result<Tree>
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut reconstructor = Reconstructor::new(options);
    for record in records {
        reconstructor.feed(record)?;
    }
    reconstructor.finish()
}
