//! Authentication: login gate and session tokens

pub mod gate;
pub mod session;

pub use session::{Identity, Role};
