mod output;

pub use output::{DisplayOptions, Output};
