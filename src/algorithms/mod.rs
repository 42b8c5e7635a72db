pub mod landmark;

pub use landmark::*;
