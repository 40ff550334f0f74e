mod interface;
mod partition;
mod set;

pub use interface::*;
pub use partition::*;
pub use set::*;
