pub mod profile;
pub mod transcript;
pub mod watson;

pub use profile::*;
pub use transcript::*;
pub use watson::*;
