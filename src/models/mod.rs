//! Data models for the Q&A forum application.
//!
//! Wire format is camelCase JSON matching the single-page-application client.

mod answer;
mod question;
mod user;
mod vote;

pub use answer::*;
pub use question::*;
pub use user::*;
pub use vote::*;
