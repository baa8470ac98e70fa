mod compare;
mod tokenizer;

pub use compare::{CommandLineDiff, compare, compare_tasks, try_compare};
pub use tokenizer::{CommandLine, Parameter, tokenize};
