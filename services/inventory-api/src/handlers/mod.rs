pub mod health;
pub mod inventory;
pub mod loads;

pub use health::*;
pub use inventory::*;
pub use loads::*;
