mod metsar;
mod reports;
mod stations;

pub use metsar::*;
pub use reports::*;
pub use stations::*;
