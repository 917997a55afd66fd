pub mod config;
pub mod layer;
pub mod tile;

pub use config::*;
pub use layer::*;
pub use tile::*;
