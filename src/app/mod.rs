pub mod context;
pub mod error;
pub mod logging;

pub use context::AppContext;
pub use error::{ArborError, Result};
pub use logging::{close_logger, init_logger, LogGuard};
