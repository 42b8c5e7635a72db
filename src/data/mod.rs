pub mod fiducials;
pub mod loader;
pub mod transform;

pub use fiducials::*;
pub use loader::*;
pub use transform::*;
