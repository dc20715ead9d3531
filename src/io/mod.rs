pub mod input;

pub use input::{LineSource, ReadOutcome, StdinReader};
