use super::mappings::{self, Mapping, Original};
use super::SourceMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct OriginalRef<'a> {
    pub source: &'a str,
    pub line: u32,
    pub column: u32,
    pub name: Option<&'a str>,
}

/// Incrementally collects mappings and produces a [`SourceMap`].
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    sources: Vec<String>,
    source_ids: HashMap<String, u32>,
    names: Vec<String>,
    name_ids: HashMap<String, u32>,
    contents: HashMap<String, String>,
    mappings: Vec<Mapping>,
}

fn intern(value: &str, list: &mut Vec<String>, ids: &mut HashMap<String, u32>) -> u32 {
    if let Some(id) = ids.get(value) {
        return *id;
    }
    let id = list.len() as u32;
    list.push(value.to_string());
    ids.insert(value.to_string(), id);
    id
}

impl SourceMapBuilder {
    pub fn new(file: Option<&str>) -> Self {
        Self {
            file: file.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn add_mapping(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        original: Option<OriginalRef<'_>>,
    ) {
        let original = original.map(|o| Original {
            source: intern(o.source, &mut self.sources, &mut self.source_ids),
            line: o.line,
            column: o.column,
            name: o
                .name
                .map(|name| intern(name, &mut self.names, &mut self.name_ids)),
        });
        self.mappings.push(Mapping {
            generated_line,
            generated_column,
            original,
        });
    }

    /// `None` forgets previously recorded content for `source`.
    pub fn set_source_content(&mut self, source: &str, content: Option<&str>) {
        match content {
            Some(content) => {
                self.contents
                    .insert(source.to_string(), content.to_string());
            }
            None => {
                self.contents.remove(source);
            }
        }
    }

    pub fn build(&self) -> SourceMap {
        let mut ordered = self.mappings.clone();
        ordered.sort_by_key(|m| (m.generated_line, m.generated_column));

        let sources_content = if self.contents.is_empty() {
            None
        } else {
            Some(
                self.sources
                    .iter()
                    .map(|source| self.contents.get(source).cloned())
                    .collect(),
            )
        };

        SourceMap {
            version: 3,
            file: self.file.clone(),
            source_root: None,
            sources: self.sources.clone(),
            sources_content,
            names: self.names.clone(),
            mappings: mappings::encode(&ordered),
        }
    }
}
