use crate::collector::{Accumulated, ConcatCollector};
use crate::error::Result;
use crate::file::VinylFile;
use crate::progress::ProgressSink;
use std::path::PathBuf;

/// Per-file errors go to `progress` and the file is left out of the merge;
/// anything else aborts the run. `finish` is left to the caller.
pub fn run_stage<I>(
    mut collector: ConcatCollector,
    files: I,
    progress: &mut dyn ProgressSink,
) -> Result<Option<VinylFile>>
where
    I: IntoIterator<Item = VinylFile>,
{
    for file in files {
        let label = file
            .relative()
            .map(|relative| relative.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("<sem caminho>"));
        progress.start_file(&label);

        match collector.accumulate(file) {
            Ok(Accumulated::Appended) => progress.finish_file(&label),
            Ok(Accumulated::Skipped) => progress.skip_file(&label),
            Err(err) if err.is_per_file() => progress.file_error(&label, &err),
            Err(err) => return Err(err),
        }
    }

    collector.finalize()
}
