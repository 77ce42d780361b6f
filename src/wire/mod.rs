pub mod types;
pub use types::*;

pub mod alias_map;
pub use alias_map::*;

pub mod mapper;
pub use mapper::*;
