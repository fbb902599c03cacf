//! Single-file link operations.
//!
//! These are the building blocks of reconciliation and are also used
//! directly when a single file is created, saved, deleted or inspected.
//! Unlike the bulk operations they report failure through their `Result`.

use crate::context::Context;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use linkmap_store::LinkRecord;
use std::path::Path;
use tracing::instrument;

/// Read the identifier from a file's link marker.
///
/// An empty token counts as no identifier: it can be neither looked up nor
/// replaced.
pub(crate) async fn read_file_id(ctx: &Context, path: &Path) -> Result<Option<String>> {
    let head = ctx.fs.read_head(path, ctx.head_bytes).await.or_raise(|| ErrorKind::Filesystem)?;
    Ok(head.as_deref().and_then(linkmap_fs::read_file_id).filter(|id| !id.is_empty()))
}

async fn require_file_id(ctx: &Context, path: &Path) -> Result<String> {
    read_file_id(ctx, path).await?.ok_or_raise(|| ErrorKind::MissingFileId(path.to_path_buf()))
}

/// Give a file a brand new identifier and record it.
///
/// The identifier currently in the file's marker is replaced everywhere in
/// the file, and the store records the new identifier at `path`. The record
/// of the file the marker came from, if any, is left alone.
///
/// Returns the new identifier.
///
/// # Errors
/// - [`ErrorKind::MissingFileId`] if the file has no marker.
/// - [`ErrorKind::Filesystem`] if the file cannot be read or rewritten.
/// - [`ErrorKind::Store`] if the record cannot be written. The file has
///   already been rewritten by then.
#[instrument(skip(ctx, path), fields(path = %path.display()))]
pub async fn create_link_for_file(ctx: &Context, scope: &str, path: &Path) -> Result<String> {
    let old_id = require_file_id(ctx, path).await?;
    let new_id = ctx.ids.generate();
    ctx.fs.replace_token(path, &old_id, &new_id).await.or_raise(|| ErrorKind::Filesystem)?;
    ctx.store.insert(scope, &new_id, path).await.or_raise(|| ErrorKind::Store)?;
    tracing::debug!(from = %old_id, to = %new_id, "Created file link");
    Ok(new_id)
}

/// Point the record of the identifier in the file's marker at the file's
/// current path.
///
/// Returns the identifier, or `None` if no record carries it. Files that were
/// never linked stay unlinked; only [`create_link_for_file`] and copies
/// create records.
#[instrument(skip(ctx, path), fields(path = %path.display()))]
pub async fn update_file_link(ctx: &Context, scope: &str, path: &Path) -> Result<Option<String>> {
    let file_id = require_file_id(ctx, path).await?;
    if !ctx.store.upsert_path_for_id(scope, &file_id, path).await.or_raise(|| ErrorKind::Store)? {
        tracing::debug!(file_id = %file_id, "No link record for file id");
        return Ok(None);
    }
    tracing::debug!(file_id = %file_id, "Updated file link");
    Ok(Some(file_id))
}

/// Forget the record at `path`. Returns `false` if there was none.
pub async fn remove_file_link(ctx: &Context, scope: &str, path: &Path) -> Result<bool> {
    ctx.store.remove_by_path(scope, path).await.or_raise(|| ErrorKind::Store)
}

/// Records carrying `file_id`, ordered by path.
pub async fn get_file_link(ctx: &Context, scope: &str, file_id: &str) -> Result<Vec<LinkRecord>> {
    ctx.store.find_by_id(scope, file_id).await.or_raise(|| ErrorKind::Store)
}

pub async fn get_file_link_by_path(ctx: &Context, scope: &str, path: &Path) -> Result<Option<LinkRecord>> {
    let records = ctx.store.find_by_path(scope, path).await.or_raise(|| ErrorKind::Store)?;
    if records.len() > 1 {
        tracing::warn!(scope, path = %path.display(), count = records.len(), "Multiple link records for one path");
    }
    Ok(records.into_iter().next())
}
