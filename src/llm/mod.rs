pub mod client;
pub mod extract;
pub mod prompts;
pub mod validation;

pub use client::*;
pub use extract::*;
pub use prompts::*;
pub use validation::*;

#[cfg(test)]
pub(crate) mod testing;
