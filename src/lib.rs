pub mod collector;
pub mod concat;
pub mod config;
pub mod error;
pub mod file;
pub mod options;
pub mod progress;
mod scanner;
pub mod sourcemap;
pub mod stage;
pub mod target;
mod writer;

pub use collector::{Accumulated, ConcatCollector, Phase};
pub use config::Config;
pub use error::Error;
pub use file::{Contents, FileStat, VinylFile};
pub use options::{ConcatOptions, SourceMapMode};
pub use progress::{ProgressReporter, ProgressSink};
pub use sourcemap::SourceMap;
pub use target::Target;

use anyhow::Result;
use std::path::PathBuf;

/// Concatenates the configured inputs and writes the result. Returns the
/// written path, or `None` when there was nothing to emit.
pub fn run(config: Config) -> Result<Option<PathBuf>> {
    let files = prepare(&config)?;
    let mut progress = progress::ProgressReporter::new(!config.quiet, files.len());
    execute_pipeline(&config, files, &mut progress)
}

pub fn run_with_progress(
    config: Config,
    progress: &mut dyn ProgressSink,
) -> Result<Option<PathBuf>> {
    let files = prepare(&config)?;
    execute_pipeline(&config, files, progress)
}

fn prepare(config: &Config) -> Result<Vec<VinylFile>> {
    scanner::collect_input_files(config)?
        .iter()
        .map(|input| scanner::load_file(input, config.source_maps))
        .collect()
}

fn execute_pipeline(
    config: &Config,
    files: Vec<VinylFile>,
    progress: &mut dyn ProgressSink,
) -> Result<Option<PathBuf>> {
    let collector = ConcatCollector::new(config.output.as_str(), config.options.clone())?;
    let written = match stage::run_stage(collector, files, progress)? {
        Some(mut joined) => {
            if !config.source_maps {
                joined.source_map = None;
            }
            let writer = writer::OutputWriter::new(&config.dest)?;
            Some(writer.write(&joined)?)
        }
        None => None,
    };

    progress.finish(written.as_deref());
    Ok(written)
}
