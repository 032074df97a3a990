pub use self::writer::*;
pub use self::logger::{SerialLogger, init as init_logger};

pub mod logger;
pub mod writer;
