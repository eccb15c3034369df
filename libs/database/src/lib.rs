//! PostgreSQL connection management and repository plumbing shared by
//! every domain crate in the workspace.

pub mod common;
pub mod postgres;
pub mod repository;

pub use common::{DatabaseError, DatabaseResult};
pub use repository::BaseRepository;
