use std::path::PathBuf;
use time::UtcDateTime;

/// Length of generated link record ids.
const LINK_ID_LENGTH: usize = 14;

/// Stored association between a file identifier and the file's current path.
///
/// At most one record exists per (scope, path). Several records may share a
/// file identifier, although in practice identifiers are unique per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Short random id of the record itself (the public download link id).
    pub link_id: String,
    /// Virtual filesystem the record belongs to.
    pub scope: String,
    /// Identifier embedded in the file's link marker.
    pub file_id: String,
    /// Current path of the file.
    pub path: PathBuf,
    pub updated_at: UtcDateTime,
}
impl LinkRecord {
    /// Create a record with a freshly generated link id.
    pub fn new(scope: impl Into<String>, file_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            link_id: generate_link_id(),
            scope: scope.into(),
            file_id: file_id.into(),
            path: path.into(),
            updated_at: UtcDateTime::now(),
        }
    }
}

fn generate_link_id() -> String {
    nanoid::nanoid!(LINK_ID_LENGTH)
}
