use super::{vlq, SourceMapError};

/// Position in an original source. Indices point into `sources` / `names`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Original {
    pub source: u32,
    pub line: u32,
    pub column: u32,
    pub name: Option<u32>,
}

/// One decoded segment. Lines and columns are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub original: Option<Original>,
}

fn to_index(value: i64, segment: &str) -> Result<u32, SourceMapError> {
    u32::try_from(value).map_err(|_| SourceMapError::InvalidSegment(segment.to_string()))
}

pub fn decode(mappings: &str) -> Result<Vec<Mapping>, SourceMapError> {
    let mut decoded = Vec::new();
    let mut source: i64 = 0;
    let mut line: i64 = 0;
    let mut column: i64 = 0;
    let mut name: i64 = 0;

    for (generated_line, group) in mappings.split(';').enumerate() {
        let generated_line = to_index(generated_line as i64, group)?;
        let mut generated_column: i64 = 0;

        for segment in group.split(',').filter(|s| !s.is_empty()) {
            let fields = vlq::decode_segment(segment)?;
            if !matches!(fields.len(), 1 | 4 | 5) {
                return Err(SourceMapError::InvalidSegment(segment.to_string()));
            }

            generated_column += fields[0];
            let original = if fields.len() >= 4 {
                source += fields[1];
                line += fields[2];
                column += fields[3];
                let name = match fields.get(4) {
                    Some(delta) => {
                        name += delta;
                        Some(to_index(name, segment)?)
                    }
                    None => None,
                };
                Some(Original {
                    source: to_index(source, segment)?,
                    line: to_index(line, segment)?,
                    column: to_index(column, segment)?,
                    name,
                })
            } else {
                None
            };

            decoded.push(Mapping {
                generated_line,
                generated_column: to_index(generated_column, segment)?,
                original,
            });
        }
    }

    Ok(decoded)
}

pub fn encode(mappings: &[Mapping]) -> String {
    let mut out = String::new();
    let mut line: u32 = 0;
    let mut first_in_line = true;
    let mut prev_column: i64 = 0;
    let mut prev_source: i64 = 0;
    let mut prev_line: i64 = 0;
    let mut prev_original_column: i64 = 0;
    let mut prev_name: i64 = 0;

    for mapping in mappings {
        while line < mapping.generated_line {
            out.push(';');
            line += 1;
            prev_column = 0;
            first_in_line = true;
        }
        if !first_in_line {
            out.push(',');
        }
        first_in_line = false;

        let column = i64::from(mapping.generated_column);
        vlq::encode(column - prev_column, &mut out);
        prev_column = column;

        if let Some(original) = mapping.original {
            vlq::encode(i64::from(original.source) - prev_source, &mut out);
            prev_source = i64::from(original.source);
            vlq::encode(i64::from(original.line) - prev_line, &mut out);
            prev_line = i64::from(original.line);
            vlq::encode(i64::from(original.column) - prev_original_column, &mut out);
            prev_original_column = i64::from(original.column);
            if let Some(name) = original.name {
                vlq::encode(i64::from(name) - prev_name, &mut out);
                prev_name = i64::from(name);
            }
        }
    }

    out
}
