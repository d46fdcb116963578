// Domain-layer modules and shared errors/models
pub mod batch {
    pub use crate::batch::*;
}

pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
