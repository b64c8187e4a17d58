use serde::{Deserialize, Serialize};

/// A single entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Directory entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "folder")]
    Folder,
    #[serde(rename = "file")]
    File,
}

/// Result of probing whether a file is already present on disk.
///
/// Callers use this to decide whether a download needs scheduling at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ready,
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_entry_wire_shape() {
        let entry = DirEntry {
            name: "checkpoints".into(),
            kind: EntryKind::Folder,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"checkpoints","type":"folder"}"#);
    }

    #[test]
    fn dir_entry_file_kind() {
        let json = r#"{"name":"model.safetensors","type":"file"}"#;
        let entry: DirEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::File);
    }

    #[test]
    fn file_status_serialization() {
        assert_eq!(
            serde_json::to_string(&FileStatus::Ready).unwrap(),
            "\"ready\""
        );
        assert_eq!(
            serde_json::to_string(&FileStatus::Missing).unwrap(),
            "\"missing\""
        );
    }
}
