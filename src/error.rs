use crate::sourcemap::SourceMapError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("wrapped-concat: opção de arquivo de destino ausente")]
    MissingTarget,
    #[error("wrapped-concat: caminho ausente no arquivo de destino")]
    MissingPath,
    #[error("wrapped-concat: conteúdo em stream não é suportado ({file:?})")]
    UnsupportedInputKind { file: Option<PathBuf> },
    #[error("wrapped-concat: source map inválido em {file:?}: {source}")]
    InvalidSourceMap {
        file: Option<PathBuf>,
        source: SourceMapError,
    },
    #[error(transparent)]
    SourceMap(#[from] SourceMapError),
}

impl Error {
    /// Raised while building a collector, before any file is accepted.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingTarget | Error::MissingPath)
    }

    /// Affects a single input file; the run keeps going.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedInputKind { .. } | Error::InvalidSourceMap { .. }
        )
    }
}
