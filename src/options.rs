use serde::Deserialize;

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// When the collector decides whether the merge tracks source maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceMapMode {
    /// Fixed when the concatenator is created, i.e. by the first retained file.
    /// A map arriving later does not switch an already running merge.
    #[default]
    FirstFile,
    /// Files are buffered and the mode is decided from all of them at finalize.
    Rescan,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConcatOptions {
    pub new_line: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub create_if_none_target: bool,
    pub source_map_mode: SourceMapMode,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            new_line: LINE_ENDING.to_string(),
            prefix: None,
            suffix: None,
            create_if_none_target: false,
            source_map_mode: SourceMapMode::default(),
        }
    }
}

impl ConcatOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
