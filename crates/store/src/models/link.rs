use crate::error::{Error, ErrorKind};
use crate::record::LinkRecord;
use exn::{OptionExt, ResultExt};
use std::path::PathBuf;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub(crate) link_id: String,
    pub(crate) scope: String,
    pub(crate) file_id: String,
    pub(crate) path: String,
    pub(crate) updated_at: i64,
}
impl TryFrom<&LinkRecord> for LinkRow {
    type Error = Error;
    fn try_from(record: &LinkRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            link_id: record.link_id.clone(),
            scope: record.scope.clone(),
            file_id: record.file_id.clone(),
            path: record.path.to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string(),
            updated_at: record.updated_at.unix_timestamp(),
        })
    }
}
impl TryFrom<LinkRow> for LinkRecord {
    type Error = Error;
    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            link_id: row.link_id,
            scope: row.scope,
            file_id: row.file_id,
            path: PathBuf::from(row.path),
            updated_at: UtcDateTime::from_unix_timestamp(row.updated_at)
                .or_raise(|| ErrorKind::InvalidData("update date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let updated = UtcDateTime::now();
        let row = LinkRow {
            link_id: "V1StGXR8_Z5jdH".to_string(),
            scope: "wfs-1".to_string(),
            file_id: "4f1c0b2e-7f0a-4c4e-9c38-1d2a7e5b9f00".to_string(),
            path: "/site/index.html".to_string(),
            updated_at: updated.unix_timestamp(),
        };
        let model = LinkRecord::try_from(row).unwrap();
        assert_eq!(model.path, PathBuf::from("/site/index.html"));
        // Converting to a Unix timestamp (measured in seconds) inherently strips the nanoseconds component.
        assert_eq!(model.updated_at, updated.replace_nanosecond(0).unwrap());
    }

    #[test]
    fn test_model_to_row() {
        let model = LinkRecord::new("wfs-1", "abc", "/site/style.css");
        let row = LinkRow::try_from(&model).unwrap();
        assert_eq!(row.path, "/site/style.css");
        assert_eq!(row.link_id, model.link_id);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let mut model = LinkRecord::new("wfs-1", "abc", "/x");
        model.path = PathBuf::from(OsStr::from_bytes(b"/bad\xff.html"));
        let err = LinkRow::try_from(&model).err().unwrap();
        assert!(matches!(&*err, ErrorKind::InvalidData("path")));
    }
}
