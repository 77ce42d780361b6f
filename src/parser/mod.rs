pub mod query_parser;
pub use query_parser::*;

pub mod phase;
pub use phase::*;

pub mod parse_error;
pub use parse_error::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;

pub mod comments;
pub use comments::*;

pub mod splitter;
pub use splitter::*;

pub mod clause_extractor;
pub use clause_extractor::*;

pub mod select_list;
pub use select_list::*;

pub mod structured_parser;
pub use structured_parser::*;

pub mod ast;
