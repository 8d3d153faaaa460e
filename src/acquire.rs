//! Track acquisition: classify what the user typed, then download it with the
//! extractor or import it from disk.

mod download;
mod input;
mod local;
mod probe;
mod process;
mod worker;

pub use input::Input;
pub use probe::remediation;
pub use worker::{AcquireEvent, Acquirer};

#[cfg(test)]
mod tests;
