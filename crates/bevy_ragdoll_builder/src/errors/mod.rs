mod loader_error;
mod ragdoll_error;

pub use loader_error::*;
pub use ragdoll_error::*;
