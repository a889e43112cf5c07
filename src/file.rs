use crate::sourcemap::SourceMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub enum Contents {
    Null,
    Buffer(Vec<u8>),
    Stream(Box<dyn Read + Send>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Null => f.write_str("Null"),
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Contents::Stream(_) => f.write_str("Stream"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    pub mtime: Option<SystemTime>,
    pub size: u64,
}

#[derive(Debug)]
pub struct VinylFile {
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub path: Option<PathBuf>,
    pub contents: Contents,
    pub stat: Option<FileStat>,
    pub source_map: Option<SourceMap>,
}

impl Default for VinylFile {
    fn default() -> Self {
        Self {
            cwd: PathBuf::new(),
            base: PathBuf::new(),
            path: None,
            contents: Contents::Null,
            stat: None,
            source_map: None,
        }
    }
}

impl VinylFile {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_buffer(
        base: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        bytes: Vec<u8>,
    ) -> Self {
        let base = base.into();
        Self {
            cwd: base.clone(),
            base,
            path: Some(path.into()),
            contents: Contents::Buffer(bytes),
            ..Self::default()
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    pub fn buffer(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// `path` relative to `base`; the full path when it lies outside `base`.
    pub fn relative(&self) -> Option<&Path> {
        let path = self.path.as_deref()?;
        Some(path.strip_prefix(&self.base).unwrap_or(path))
    }

    pub fn basename(&self) -> Option<&str> {
        self.path.as_deref()?.file_name()?.to_str()
    }

    pub fn mtime(&self) -> Option<SystemTime> {
        self.stat.as_ref()?.mtime
    }

    pub fn clone_without_contents(&self) -> Self {
        Self {
            cwd: self.cwd.clone(),
            base: self.base.clone(),
            path: self.path.clone(),
            contents: Contents::Null,
            stat: self.stat.clone(),
            source_map: self.source_map.clone(),
        }
    }
}
