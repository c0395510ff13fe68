mod generator;
mod instruction;
mod listing;

pub use generator::*;
pub use instruction::*;
pub use listing::*;
