//! Git integration
//!
//! [`Git2Repository`] implements [`VcsRepository`] on top of libgit2.

pub mod repository;
pub mod traits;

pub use repository::{Git2Repository, GitCredentials};
pub use traits::{VcsRepository, WorkingTree};
