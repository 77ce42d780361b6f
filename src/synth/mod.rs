pub mod filter_renderer;
pub use filter_renderer::*;

pub mod sql_synthesizer;
pub use sql_synthesizer::*;
