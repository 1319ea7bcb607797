//! Configuration loading and validation

mod settings;
#[cfg(test)]
mod tests;

pub use settings::*;
