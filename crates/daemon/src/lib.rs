mod batch;
mod domains;
mod geo;
mod parquet_handler;
mod providers;
mod utils;

pub use batch::*;
pub use domains::*;
pub use geo::*;
pub use parquet_handler::*;
pub use providers::*;
pub use utils::*;
