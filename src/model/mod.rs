pub mod operator;
pub use operator::*;

pub mod filter;
pub use filter::*;

pub mod join;
pub use join::*;

pub mod sort;
pub use sort::*;

pub mod pager;
pub use pager::*;

pub mod parameter;
pub use parameter::*;

pub mod aggregate;
pub use aggregate::*;

pub mod query;
pub use query::*;
