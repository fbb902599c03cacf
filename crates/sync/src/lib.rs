//! Keeps link records in step with the files they point at.
//!
//! Linked files carry a file identifier in a marker comment near their top,
//! and the link store maps each identifier to the file's current path. When
//! directories are copied, moved or removed, the operations in this crate
//! bring the store (and, for copies, the files themselves) back in line:
//!
//! - [`reconcile_on_copy`]: copies get identifiers of their own.
//! - [`reconcile_on_move`]: records follow their files; call [`snapshot`]
//!   before the move.
//! - [`remove_links_recursive`]: call before deleting a directory.
//! - [`refresh_links_in_dir`]: re-record paths from the files on disk.
//!
//! Every operation takes a [`Context`] and a scope naming the virtual
//! filesystem the paths belong to.

mod context;
pub mod error;
mod link;
mod reconcile;
mod report;
mod snapshot;
#[cfg(test)]
mod testing;

pub use crate::context::{Context, IdGenerator, IdHandle, UuidGenerator};
pub use crate::link::{
    create_link_for_file, get_file_link, get_file_link_by_path, remove_file_link, update_file_link,
};
pub use crate::reconcile::{reconcile_on_copy, reconcile_on_move, refresh_links_in_dir, remove_links_recursive};
pub use crate::report::{FileOutcome, Outcome, Report, SkipReason};
pub use crate::snapshot::{Snapshot, snapshot};
