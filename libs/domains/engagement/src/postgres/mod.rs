//! PostgreSQL implementations of the engagement repository traits.

mod directory;
mod events;
mod gatherings;
mod visitors;

pub use directory::PgDirectoryRepository;
pub use events::PgEventsRepository;
pub use gatherings::PgGatheringsRepository;
pub use visitors::PgVisitorsRepository;
