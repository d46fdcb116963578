//! External service integrations.

pub mod gemini {
    pub use crate::services::*;
}

pub mod csv_io {
    pub use crate::csv_io::*;
}
