pub mod collection;
pub mod condition;
pub mod filter_builder;
pub mod group_by;
pub mod join;
pub mod limit_offset_parser;
pub mod order_by;
pub mod parameters;
pub mod predicate;

pub use collection::*;
pub use condition::*;
pub use filter_builder::*;
pub use group_by::*;
pub use join::*;
pub use limit_offset_parser::*;
pub use order_by::*;
pub use parameters::*;
pub use predicate::*;
