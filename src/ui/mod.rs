//! Terminal front end for the demo binary

mod cli;

pub use cli::*;
