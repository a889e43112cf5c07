use crate::error::{Error, Result};
use crate::file::VinylFile;
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
pub enum Target {
    Path(String),
    Template(VinylFile),
}

fn push_component(acc: &mut PathBuf, component: Component<'_>) {
    match component {
        Component::CurDir => {}
        Component::ParentDir => {
            if matches!(acc.components().next_back(), Some(Component::Normal(_))) {
                acc.pop();
            } else if !acc.has_root() {
                acc.push("..");
            }
        }
        other => acc.push(other.as_os_str()),
    }
}

/// Appends `target` under `base` even when it is absolute, resolving `.` and
/// `..` lexically.
pub fn join_normalized(base: &Path, target: &str) -> PathBuf {
    let mut joined = PathBuf::new();
    for component in base.components() {
        push_component(&mut joined, component);
    }
    for component in Path::new(target).components() {
        if !matches!(component, Component::Prefix(_) | Component::RootDir) {
            push_component(&mut joined, component);
        }
    }
    joined
}

impl Target {
    pub fn file_name(&self) -> Result<String> {
        match self {
            Target::Path(path) if path.is_empty() => Err(Error::MissingTarget),
            Target::Path(path) => Ok(path.clone()),
            Target::Template(file) => file
                .path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or(Error::MissingPath),
        }
    }
}

impl From<&str> for Target {
    fn from(path: &str) -> Self {
        Target::Path(path.to_string())
    }
}

impl From<String> for Target {
    fn from(path: String) -> Self {
        Target::Path(path)
    }
}

impl From<VinylFile> for Target {
    fn from(file: VinylFile) -> Self {
        Target::Template(file)
    }
}
