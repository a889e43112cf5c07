//! Source Map revision 3: the JSON document, its mappings and a builder.

mod builder;
pub mod mappings;
pub mod vlq;

pub use builder::{OriginalRef, SourceMapBuilder};
pub use mappings::{Mapping, Original};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    #[error("source map JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("caractere VLQ inválido {0:?}")]
    InvalidVlqCharacter(char),
    #[error("valor VLQ truncado em {0:?}")]
    TruncatedVlq(String),
    #[error("valor VLQ grande demais em {0:?}")]
    VlqOverflow(String),
    #[error("segmento de mapeamento inválido {0:?}")]
    InvalidSegment(String),
}

fn default_version() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl SourceMap {
    /// Map as written by a pipeline step that has not transformed the file yet:
    /// one source, its content, no mappings.
    pub fn initial(source: &str, content: &str) -> Self {
        Self {
            version: 3,
            file: Some(source.to_string()),
            source_root: None,
            sources: vec![source.to_string()],
            sources_content: Some(vec![Some(content.to_string())]),
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SourceMapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SourceMapError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, SourceMapError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode_mappings(&self) -> Result<Vec<Mapping>, SourceMapError> {
        mappings::decode(&self.mappings)
    }

    /// Source name with `sourceRoot` applied.
    pub fn resolved_source(&self, index: u32) -> Option<String> {
        let source = self.sources.get(index as usize)?;
        match self.source_root.as_deref() {
            Some(root) if !root.is_empty() => {
                Some(format!("{}/{}", root.trim_end_matches('/'), source))
            }
            _ => Some(source.clone()),
        }
    }

    pub fn source_content(&self, index: u32) -> Option<&str> {
        self.sources_content
            .as_ref()?
            .get(index as usize)?
            .as_deref()
    }
}
