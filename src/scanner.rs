use crate::concat::unix_style;
use crate::config::Config;
use crate::file::{FileStat, VinylFile};
use crate::sourcemap::SourceMap;
use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub base: PathBuf,
    pub path: PathBuf,
}

struct Candidates<'a> {
    ext: &'a str,
    output: PathBuf,
}

impl<'a> Candidates<'a> {
    fn new(config: &'a Config) -> Self {
        let output = config.output_path();
        Self {
            ext: config.normalized_ext(),
            output: fs::canonicalize(&output).unwrap_or(output),
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.ext));
        ext_matches && fs::canonicalize(path).map_or(true, |real| real != self.output)
    }
}

/// Inputs keep the order given on the command line; directory entries are
/// visited depth-first, sorted by name within each directory.
pub fn collect_input_files(config: &Config) -> Result<Vec<InputFile>> {
    let candidates = Candidates::new(config);
    let mut files = Vec::new();

    for input in &config.inputs {
        if input.is_dir() {
            collect_directory(input, config.recursive, &candidates, &mut files)?;
        } else if input.is_file() {
            if candidates.accepts(input) {
                files.push(InputFile {
                    base: input.parent().map(Path::to_path_buf).unwrap_or_default(),
                    path: input.to_path_buf(),
                });
            }
        } else {
            return Err(anyhow!("Caminho inválido: {:?}", input));
        }
    }

    if files.is_empty() {
        log::warn!(
            "nenhum arquivo de entrada encontrado com a extensão {:?}",
            candidates.ext
        );
    }
    Ok(files)
}

fn collect_directory(
    dir: &Path,
    recursive: bool,
    candidates: &Candidates<'_>,
    files: &mut Vec<InputFile>,
) -> Result<()> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("Falha ao percorrer diretório {:?}", dir))?;
        if entry.path().is_file() && candidates.accepts(entry.path()) {
            files.push(InputFile {
                base: dir.to_path_buf(),
                path: entry.into_path(),
            });
        }
    }
    Ok(())
}

fn map_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}

pub fn load_file(input: &InputFile, source_maps: bool) -> Result<VinylFile> {
    let bytes =
        fs::read(&input.path).with_context(|| format!("Falha ao ler arquivo {:?}", input.path))?;
    let metadata = fs::metadata(&input.path)
        .with_context(|| format!("Falha ao ler metadados de {:?}", input.path))?;

    let mut file = VinylFile::from_buffer(&input.base, &input.path, bytes);
    file.stat = Some(FileStat {
        mtime: metadata.modified().ok(),
        size: metadata.len(),
    });

    if source_maps {
        let sibling = map_path(&input.path);
        let map = if sibling.is_file() {
            let raw = fs::read(&sibling)
                .with_context(|| format!("Falha ao ler source map {:?}", sibling))?;
            SourceMap::from_slice(&raw)
                .with_context(|| format!("Source map inválido em {:?}", sibling))?
        } else {
            let relative = file
                .relative()
                .map(|p| unix_style(&p.to_string_lossy()))
                .unwrap_or_default();
            let text = String::from_utf8_lossy(file.buffer().unwrap_or_default()).into_owned();
            SourceMap::initial(&relative, &text)
        };
        file.source_map = Some(map);
    }

    Ok(file)
}
