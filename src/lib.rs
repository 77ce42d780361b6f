pub mod model;

pub mod parser;

pub mod synth;

pub mod schema;
pub use schema::{SchemaDirectory, SchemaProvider, TableSchema};

pub mod wire;
pub use wire::{json_to_sql, sql_to_json, WireMapper, WireQuery};

pub mod grid;
pub use grid::{GridDeltas, GridSession};

pub mod backend;

pub mod config;
pub use config::{Config, JoinStyle};

pub mod error;
pub use error::EngineError;
