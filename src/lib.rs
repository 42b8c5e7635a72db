pub mod algorithms;
pub mod analysis;
pub mod config;
pub mod data;
pub mod logging;
pub mod utils;
pub mod wizard;

pub use algorithms::*;
pub use analysis::*;
pub use data::*;
pub use wizard::RegistrationWizard;

pub type Result<T> = anyhow::Result<T>;
