use std::path::PathBuf;

/// One uploaded file as handed over by the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub extension: String,
    /// Where the request layer left the bytes.
    pub source: PathBuf,
}

impl Upload {
    /// Derives the extension from `file_name`, defaulting to `mp4`.
    pub fn new(file_name: impl Into<String>, source: PathBuf) -> Self {
        let file_name = file_name.into();
        let extension = std::path::Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "mp4".to_string());
        Self {
            file_name,
            extension,
            source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequest {
    pub uploads: Vec<Upload>,
    /// Title card text; no title card when absent.
    pub intro: Option<String>,
    /// Seed for the running timestamp, `YYYY-MM-DD hh:mm:ss AM`. Defaults to now.
    pub started_at: Option<String>,
}

/// An upload staged inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub original_name: String,
    pub extension: String,
    pub path: PathBuf,
    /// 1-based, contiguous, in upload order
    pub index: usize,
}
