pub mod analysis;
pub mod webhook;

pub use analysis::*;
pub use webhook::*;
