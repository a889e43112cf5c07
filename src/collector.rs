use crate::concat::Concat;
use crate::error::{Error, Result};
use crate::file::{Contents, VinylFile};
use crate::options::{ConcatOptions, SourceMapMode};
use crate::sourcemap::SourceMap;
use crate::target::{join_normalized, Target};
use log::{debug, warn};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulated {
    Appended,
    Skipped,
}

struct Pending {
    label: Option<String>,
    bytes: Vec<u8>,
    source_map: Option<SourceMap>,
}

pub struct ConcatCollector {
    target: Target,
    file_name: String,
    options: ConcatOptions,
    phase: Phase,
    using_source_maps: bool,
    latest_file: Option<VinylFile>,
    latest_mod: Option<SystemTime>,
    concat: Option<Concat>,
    pending: Vec<Pending>,
}

impl ConcatCollector {
    pub fn new(target: impl Into<Target>, options: ConcatOptions) -> Result<Self> {
        let target = target.into();
        let file_name = target.file_name()?;
        Ok(Self {
            target,
            file_name,
            options,
            phase: Phase::Idle,
            using_source_maps: false,
            latest_file: None,
            latest_mod: None,
            concat: None,
            pending: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_using_source_maps(&self) -> bool {
        self.using_source_maps
    }

    // Rejected files (streaming content, broken source map) leave the
    // collector untouched.
    pub fn accumulate(&mut self, mut file: VinylFile) -> Result<Accumulated> {
        self.phase = Phase::Accumulating;

        let bytes = match std::mem::replace(&mut file.contents, Contents::Null) {
            Contents::Null => {
                debug!("ignorando arquivo vazio {:?}", file.path);
                return Ok(Accumulated::Skipped);
            }
            Contents::Stream(_) => {
                warn!("conteúdo em stream não suportado: {:?}", file.path);
                return Err(Error::UnsupportedInputKind { file: file.path });
            }
            Contents::Buffer(bytes) => bytes,
        };

        if let Some(map) = file.source_map.as_ref().filter(|m| !m.mappings.is_empty()) {
            if let Err(source) = map.decode_mappings() {
                warn!("source map inválido em {:?}: {}", file.path, source);
                return Err(Error::InvalidSourceMap {
                    file: file.path,
                    source,
                });
            }
        }

        let using_source_maps = self.using_source_maps || file.source_map.is_some();
        if using_source_maps && !self.using_source_maps && self.concat.is_some() {
            warn!(
                "{:?} traz source map, mas a concatenação já começou sem source maps",
                file.path
            );
        }

        let label = file
            .relative()
            .map(|relative| relative.to_string_lossy().into_owned());
        debug!("acumulando {:?} ({} bytes)", label, bytes.len());

        match self.options.source_map_mode {
            SourceMapMode::FirstFile => {
                let file_name = &self.file_name;
                let new_line = &self.options.new_line;
                let concat = self
                    .concat
                    .get_or_insert_with(|| Concat::new(using_source_maps, file_name, new_line));
                concat
                    .add(label.as_deref(), &bytes, file.source_map.as_ref())
                    .map_err(|source| Error::InvalidSourceMap {
                        file: file.path.clone(),
                        source,
                    })?;
            }
            SourceMapMode::Rescan => self.pending.push(Pending {
                label,
                bytes,
                source_map: file.source_map.take(),
            }),
        }

        self.using_source_maps = using_source_maps;
        self.track_latest(&file);
        Ok(Accumulated::Appended)
    }

    fn track_latest(&mut self, file: &VinylFile) {
        let mtime = file.mtime();
        let newer = match (mtime, self.latest_mod) {
            (Some(current), Some(latest)) => current > latest,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if self.latest_file.is_none() || newer {
            self.latest_file = Some(file.clone_without_contents());
            self.latest_mod = mtime;
        }
    }

    fn build_rescanned(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut concat = Concat::new(
            self.using_source_maps,
            &self.file_name,
            &self.options.new_line,
        );
        for chunk in self.pending.drain(..) {
            concat.add(chunk.label.as_deref(), &chunk.bytes, chunk.source_map.as_ref())?;
        }
        self.concat = Some(concat);
        Ok(())
    }

    pub fn finalize(mut self) -> Result<Option<VinylFile>> {
        self.build_rescanned()?;

        if (self.latest_file.is_none() || self.concat.is_none())
            && !self.options.create_if_none_target
        {
            debug!("nenhum arquivo acumulado, nada a emitir");
            return Ok(None);
        }

        let mut joined = match &self.target {
            Target::Path(path) => match &self.latest_file {
                Some(latest) => {
                    let mut joined = latest.clone_without_contents();
                    joined.path = Some(join_normalized(&latest.base, path));
                    joined
                }
                None => VinylFile::with_path(path),
            },
            Target::Template(template) => template.clone_without_contents(),
        };
        joined.source_map = None;

        let mut buffer = Vec::new();
        if let Some(prefix) = &self.options.prefix {
            buffer.extend_from_slice(prefix.as_bytes());
        }
        if let Some(concat) = &self.concat {
            buffer.extend_from_slice(concat.content());
            if let Some(json) = concat.source_map()? {
                joined.source_map = Some(SourceMap::from_json(&json)?);
            }
        }
        if let Some(suffix) = &self.options.suffix {
            buffer.extend_from_slice(suffix.as_bytes());
        }
        joined.contents = Contents::Buffer(buffer);

        debug!("arquivo concatenado {:?} gerado", joined.path);
        Ok(Some(joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileStat;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn options(new_line: &str) -> ConcatOptions {
        ConcatOptions {
            new_line: new_line.into(),
            ..ConcatOptions::default()
        }
    }

    fn file(name: &str, body: &str) -> VinylFile {
        VinylFile::from_buffer("/proj/src", format!("/proj/src/{name}"), body.as_bytes().to_vec())
    }

    fn file_at(name: &str, body: &str, secs: u64) -> VinylFile {
        let mut f = file(name, body);
        f.stat = Some(FileStat {
            mtime: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
            size: body.len() as u64,
        });
        f
    }

    fn mapped(name: &str, body: &str) -> VinylFile {
        let mut f = file(name, body);
        f.source_map = Some(SourceMap::initial(name, body));
        f
    }

    fn streaming(name: &str) -> VinylFile {
        VinylFile {
            contents: Contents::Stream(Box::new(Cursor::new(b"streamed".to_vec()))),
            ..file(name, "")
        }
    }

    fn contents(file: &VinylFile) -> &str {
        std::str::from_utf8(file.buffer().unwrap()).unwrap()
    }

    #[test]
    fn joins_in_arrival_order() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        assert_eq!(collector.phase(), Phase::Idle);
        for (name, body) in [("a.js", "A"), ("b.js", "B"), ("c.js", "C")] {
            collector.accumulate(file(name, body)).unwrap();
        }
        assert_eq!(collector.phase(), Phase::Accumulating);

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB\nC");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn default_separator_is_platform_line_ending() {
        let mut collector = ConcatCollector::new("all.js", ConcatOptions::default()).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();
        collector.accumulate(file("b.js", "B")).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), format!("A{}B", crate::options::LINE_ENDING));
    }

    #[test]
    fn wraps_with_prefix_and_suffix() {
        let options = ConcatOptions {
            prefix: Some("(function(){\n".into()),
            suffix: Some("\n})();".into()),
            ..options("\n")
        };
        let mut collector = ConcatCollector::new("all.js", options).unwrap();
        collector.accumulate(file("a.js", "a();")).unwrap();
        collector.accumulate(file("b.js", "b();")).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "(function(){\na();\nb();\n})();");
    }

    #[test]
    fn no_input_emits_nothing_by_default() {
        let collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        assert!(collector.finalize().unwrap().is_none());
    }

    #[test]
    fn null_files_are_skipped() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        let outcome = collector.accumulate(VinylFile::with_path("/proj/src/empty.js")).unwrap();
        assert_eq!(outcome, Accumulated::Skipped);
        assert!(collector.finalize().unwrap().is_none());
    }

    #[test]
    fn no_input_with_create_if_none_target() {
        let wrapped = ConcatOptions {
            create_if_none_target: true,
            prefix: Some("/* head */".into()),
            suffix: Some("/* tail */".into()),
            ..options("\n")
        };
        let collector = ConcatCollector::new("all.js", wrapped).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path.as_deref(), Some(Path::new("all.js")));
        assert_eq!(contents(&out), "/* head *//* tail */");

        let bare = ConcatOptions {
            create_if_none_target: true,
            ..options("\n")
        };
        let out = ConcatCollector::new("all.js", bare)
            .unwrap()
            .finalize()
            .unwrap()
            .unwrap();
        assert_eq!(contents(&out), "");
    }

    #[test]
    fn output_metadata_follows_most_recent_file() {
        let mut collector = ConcatCollector::new("out.js", options("\n")).unwrap();
        collector.accumulate(file_at("one.js", "1", 10)).unwrap();
        collector.accumulate(file_at("two.js", "2", 30)).unwrap();
        collector.accumulate(file_at("three.js", "3", 20)).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/proj/src/out.js")));
        assert_eq!(
            out.mtime(),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(30))
        );
        assert_eq!(contents(&out), "1\n2\n3");
    }

    #[test]
    fn path_target_stays_under_latest_base() {
        let mut collector = ConcatCollector::new("/out.js", options("\n")).unwrap();
        collector.accumulate(file_at("one.js", "1", 10)).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/proj/src/out.js")));
        assert_eq!(out.relative(), Some(Path::new("out.js")));

        let mut collector = ConcatCollector::new("../out.js", options("\n")).unwrap();
        collector.accumulate(file_at("one.js", "1", 10)).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/proj/out.js")));
    }

    #[test]
    fn equal_mtime_keeps_earlier_file() {
        let mut collector = ConcatCollector::new("out.js", options("\n")).unwrap();
        let mut first = file_at("one.js", "1", 10);
        first.base = PathBuf::from("/first");
        let mut second = file_at("two.js", "2", 10);
        second.base = PathBuf::from("/second");
        collector.accumulate(first).unwrap();
        collector.accumulate(second).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.base, PathBuf::from("/first"));
    }

    #[test]
    fn files_without_mtime_do_not_replace_latest() {
        let mut collector = ConcatCollector::new("out.js", options("\n")).unwrap();
        let mut dated = file_at("dated.js", "d", 5);
        dated.base = PathBuf::from("/dated");
        let mut undated = file("undated.js", "u");
        undated.base = PathBuf::from("/undated");
        collector.accumulate(dated).unwrap();
        collector.accumulate(undated).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.base, PathBuf::from("/dated"));

        let mut collector = ConcatCollector::new("out.js", options("\n")).unwrap();
        let mut undated = file("undated.js", "u");
        undated.base = PathBuf::from("/undated");
        collector.accumulate(undated).unwrap();
        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/undated/out.js")));
        assert_eq!(out.mtime(), None);
    }

    #[test]
    fn template_target_copies_fields_and_drops_contents() {
        let mut template = VinylFile::from_buffer("/dist", "/dist/bundle.js", b"stale".to_vec());
        template.stat = Some(FileStat {
            mtime: None,
            size: 99,
        });
        let mut collector = ConcatCollector::new(template, options("\n")).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/dist/bundle.js")));
        assert_eq!(out.base, PathBuf::from("/dist"));
        assert_eq!(out.stat.as_ref().map(|s| s.size), Some(99));
        assert_eq!(contents(&out), "A");
    }

    #[test]
    fn construction_rejects_bad_targets() {
        let err = ConcatCollector::new("", ConcatOptions::default()).err().unwrap();
        assert!(matches!(err, Error::MissingTarget));
        assert!(err.is_configuration());

        let err = ConcatCollector::new(VinylFile::default(), ConcatOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingPath));
    }

    #[test]
    fn streaming_file_is_rejected_and_run_continues() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();
        let err = collector.accumulate(streaming("s.js")).unwrap_err();
        assert!(err.is_per_file());
        collector.accumulate(file("b.js", "B")).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB");
    }

    #[test]
    fn source_maps_are_parsed_onto_output() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        collector.accumulate(mapped("a.js", "a1\na2")).unwrap();
        collector.accumulate(file("b.js", "b1")).unwrap();
        assert!(collector.is_using_source_maps());

        let out = collector.finalize().unwrap().unwrap();
        let map = out.source_map.unwrap();
        assert_eq!(map.file.as_deref(), Some("all.js"));
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        assert_eq!(map.decode_mappings().unwrap().len(), 3);
    }

    #[test]
    fn late_source_map_does_not_upgrade_running_merge() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();
        collector.accumulate(mapped("b.js", "B")).unwrap();
        assert!(collector.is_using_source_maps());

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn rescan_mode_enables_maps_from_any_file() {
        let options = ConcatOptions {
            source_map_mode: SourceMapMode::Rescan,
            ..options("\n")
        };
        let mut collector = ConcatCollector::new("all.js", options).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();
        collector.accumulate(mapped("b.js", "B")).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB");
        let map = out.source_map.unwrap();
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
    }

    fn broken_map(name: &str, body: &str) -> VinylFile {
        let mut f = file(name, body);
        f.source_map = Some(SourceMap {
            mappings: "A*A".into(),
            ..SourceMap::initial(name, body)
        });
        f
    }

    #[test]
    fn malformed_source_map_is_rejected_and_run_continues() {
        let mut collector = ConcatCollector::new("all.js", options("\n")).unwrap();
        collector.accumulate(mapped("a.js", "A")).unwrap();
        let err = collector.accumulate(broken_map("bad.js", "BAD")).unwrap_err();
        assert!(err.is_per_file());
        assert!(matches!(err, Error::InvalidSourceMap { .. }));
        collector.accumulate(file("c.js", "C")).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nC");
        let map = out.source_map.unwrap();
        assert_eq!(map.sources, vec!["a.js", "c.js"]);
        let last = *map.decode_mappings().unwrap().last().unwrap();
        assert_eq!(last.generated_line, 1);
        assert_eq!(last.original.unwrap().source, 1);
    }

    #[test]
    fn malformed_map_as_first_file_does_not_start_merge() {
        let mut file_a = file_at("a.js", "A", 50);
        file_a.base = PathBuf::from("/rejected");
        file_a.source_map = broken_map("a.js", "A").source_map;
        let mut collector = ConcatCollector::new("out.js", options("\n")).unwrap();
        assert!(collector.accumulate(file_a).is_err());
        assert!(!collector.is_using_source_maps());
        collector.accumulate(file_at("b.js", "B", 10)).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/proj/src/out.js")));
        assert_eq!(contents(&out), "B");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn template_target_with_no_input_keeps_template_fields() {
        let mut template = VinylFile::from_buffer("/dist", "/dist/bundle.js", b"stale".to_vec());
        template.stat = Some(FileStat {
            mtime: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(7)),
            size: 5,
        });
        let options = ConcatOptions {
            create_if_none_target: true,
            prefix: Some("/* head */".into()),
            suffix: Some("/* tail */".into()),
            ..options("\n")
        };

        let out = ConcatCollector::new(template, options)
            .unwrap()
            .finalize()
            .unwrap()
            .unwrap();
        assert_eq!(out.path, Some(PathBuf::from("/dist/bundle.js")));
        assert_eq!(out.base, PathBuf::from("/dist"));
        assert_eq!(
            out.mtime(),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(7))
        );
        assert_eq!(contents(&out), "/* head *//* tail */");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn rescan_mode_without_maps_emits_no_map() {
        let options = ConcatOptions {
            source_map_mode: SourceMapMode::Rescan,
            ..options("\n")
        };
        let mut collector = ConcatCollector::new("all.js", options).unwrap();
        collector.accumulate(file("a.js", "A")).unwrap();
        collector.accumulate(file("b.js", "B")).unwrap();
        assert!(!collector.is_using_source_maps());

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB");
        assert!(out.source_map.is_none());
    }

    #[test]
    fn rescan_mode_skips_streaming_file() {
        let options = ConcatOptions {
            source_map_mode: SourceMapMode::Rescan,
            ..options("\n")
        };
        let mut collector = ConcatCollector::new("all.js", options).unwrap();
        collector.accumulate(mapped("a.js", "A")).unwrap();
        let err = collector.accumulate(streaming("s.js")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInputKind { .. }));
        collector.accumulate(file("b.js", "B")).unwrap();

        let out = collector.finalize().unwrap().unwrap();
        assert_eq!(contents(&out), "A\nB");
        let map = out.source_map.unwrap();
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        assert_eq!(map.decode_mappings().unwrap().len(), 2);
    }
}
