pub mod epoch;
pub mod logging;

pub use epoch::{Epoch, Stamped};
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger, max_level_from_env};

// Re-export log crate so downstream crates can use ember_base::log::*
pub use log;
