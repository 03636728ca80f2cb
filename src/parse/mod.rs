pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::split_pipeline;
pub use tokenize::{base_command, tokenize};
pub use types::{Operator, Pipeline, Segment};
