//! Device addressing shared by the Security Manager and its collaborators

pub mod types;

pub use types::*;
