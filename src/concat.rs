use crate::sourcemap::{Mapping, OriginalRef, SourceMap, SourceMapBuilder, SourceMapError};

pub fn unix_style(path: &str) -> String {
    path.replace('\\', "/")
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

struct MapTracker {
    builder: SourceMapBuilder,
    line_offset: u32,
    column_offset: u32,
    separator_lines: u32,
    separator_columns: u32,
}

impl MapTracker {
    fn new(file_name: &str, separator: &str) -> Self {
        let mut separator_lines = 0;
        let mut separator_columns = 0;
        for ch in separator.chars() {
            separator_columns += ch.len_utf16() as u32;
            if ch == '\n' {
                separator_lines += 1;
                separator_columns = 0;
            }
        }

        Self {
            builder: SourceMapBuilder::new(Some(&unix_style(file_name))),
            line_offset: 0,
            column_offset: 0,
            separator_lines,
            separator_columns,
        }
    }

    fn merge_upstream(&mut self, upstream: &SourceMap, decoded: Vec<Mapping>) {
        for mapping in decoded {
            let Some(original) = mapping.original else {
                continue;
            };
            let Some(source) = upstream.resolved_source(original.source) else {
                continue;
            };
            let name = original
                .name
                .and_then(|idx| upstream.names.get(idx as usize))
                .map(String::as_str);
            let column_shift = if mapping.generated_line == 0 {
                self.column_offset
            } else {
                0
            };

            self.builder.add_mapping(
                self.line_offset + mapping.generated_line,
                column_shift + mapping.generated_column,
                Some(OriginalRef {
                    source: &source,
                    line: original.line,
                    column: original.column,
                    name,
                }),
            );
        }

        if let Some(contents) = &upstream.sources_content {
            for (idx, content) in contents.iter().enumerate() {
                if let Some(source) = upstream.resolved_source(idx as u32) {
                    self.builder.set_source_content(&source, content.as_deref());
                }
            }
        }
    }

    fn map_lines_identically(&mut self, label: &str, lines: u32, upstream: Option<&SourceMap>) {
        for line in 0..lines {
            let column = if line == 0 { self.column_offset } else { 0 };
            self.builder.add_mapping(
                self.line_offset + line,
                column,
                Some(OriginalRef {
                    source: label,
                    line,
                    column: 0,
                    name: None,
                }),
            );
        }

        if let Some(contents) = upstream.and_then(|m| m.sources_content.as_ref()) {
            self.builder
                .set_source_content(label, contents.first().and_then(|c| c.as_deref()));
        }
    }

    fn advance(&mut self, text: &str, lines: u32) {
        if lines > 1 {
            self.column_offset = 0;
        }
        if self.separator_lines == 0 {
            let tail = text.rsplit('\n').next().unwrap_or_default();
            self.column_offset += utf16_len(tail);
        }
        self.column_offset += self.separator_columns;
        self.line_offset += lines - 1 + self.separator_lines;
    }
}

pub struct Concat {
    content: Vec<u8>,
    chunks: usize,
    separator: Vec<u8>,
    tracker: Option<MapTracker>,
}

impl Concat {
    pub fn new(source_mapping: bool, file_name: &str, separator: &str) -> Self {
        Self {
            content: Vec::new(),
            chunks: 0,
            separator: separator.as_bytes().to_vec(),
            tracker: source_mapping.then(|| MapTracker::new(file_name, separator)),
        }
    }

    /// Adds one chunk. Without usable mappings in `source_map`, every line of
    /// `content` maps to column 0 of the same line in `label`. A malformed
    /// upstream map is rejected before anything is appended.
    pub fn add(
        &mut self,
        label: Option<&str>,
        content: &[u8],
        source_map: Option<&SourceMap>,
    ) -> Result<(), SourceMapError> {
        let upstream = match source_map.filter(|m| !m.mappings.is_empty()) {
            Some(upstream) if self.tracker.is_some() => {
                Some((upstream, upstream.decode_mappings()?))
            }
            _ => None,
        };

        if self.chunks > 0 {
            self.content.extend_from_slice(&self.separator);
        }
        self.content.extend_from_slice(content);
        self.chunks += 1;

        let Some(tracker) = self.tracker.as_mut() else {
            return Ok(());
        };

        let text = String::from_utf8_lossy(content);
        let lines = text.split('\n').count() as u32;

        match upstream {
            Some((upstream, decoded)) => tracker.merge_upstream(upstream, decoded),
            None => {
                let label = source_map
                    .and_then(|m| m.sources.first().cloned())
                    .or_else(|| label.map(unix_style));
                if let Some(label) = label {
                    tracker.map_lines_identically(&label, lines, source_map);
                }
            }
        }

        tracker.advance(&text, lines);
        Ok(())
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn source_mapping(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn source_map(&self) -> Result<Option<String>, SourceMapError> {
        self.tracker
            .as_ref()
            .map(|tracker| tracker.builder.build().to_json())
            .transpose()
    }
}
