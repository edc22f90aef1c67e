//! Domain models for the PharmaStock platform

mod alert;
mod batch;
mod issue;
mod receipt;

pub use alert::*;
pub use batch::*;
pub use issue::*;
pub use receipt::*;
