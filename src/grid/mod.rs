pub mod deltas;
pub use deltas::*;

pub mod merger;
pub use merger::*;

pub mod session;
pub use session::*;
