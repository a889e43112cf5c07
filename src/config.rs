use crate::options::ConcatOptions;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub output: String,
    pub inputs: Vec<PathBuf>,
    pub ext: String,
    pub recursive: bool,
    pub dest: PathBuf,
    pub options: ConcatOptions,
    pub source_maps: bool,
    pub quiet: bool,
}

impl Config {
    pub fn normalized_ext(&self) -> &str {
        self.ext.trim_start_matches('.')
    }

    pub fn output_path(&self) -> PathBuf {
        self.dest.join(&self.output)
    }
}
