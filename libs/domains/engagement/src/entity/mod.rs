//! Sea-ORM entities for the directory, scheduling and visitor tables.
//!
//! These tables are owned by the membership/scheduling collaborators;
//! this crate only reads them, except for the two guarded writes
//! (`engagement_status` flag, `escalated_at` marker).

pub mod attendance_records;
pub mod churches;
pub mod event_registrations;
pub mod events;
pub mod gatherings;
pub mod group_members;
pub mod groups;
pub mod ministry_members;
pub mod profiles;
pub mod visitors;
