//! Database engine for DeskDB
//!
//! This crate ties the record types to the storage medium:
//! - Database: open/ephemeral/builder, configuration, export/backup/restore
//! - Partitions: lazily-loaded, indexed record caches written through on
//!   every mutation
//! - Primitives: ArticleStore, UserStore, CommentStore, NewsletterStore
//! - Clock: injectable time source
//!
//! The engine is the only component that knows about:
//! - Partition layout on the medium
//! - Cross-partition operations (restore, clear)
//! - Input limits and the daily comment limit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod database;
pub mod partition;
pub mod primitives;

pub use clock::{Clock, ManualClock, SystemClock};
pub use database::{Database, DatabaseBuilder, DeskConfig, SearchConfig, CONFIG_FILE_NAME};
pub use primitives::{ArticleStore, CommentStore, NewsletterStore, UserStore};
