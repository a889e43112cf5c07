use crate::error::Error;
use std::path::Path;

pub trait ProgressSink {
    fn start_file(&mut self, _path: &Path) {}
    fn skip_file(&mut self, _path: &Path) {}
    fn file_error(&mut self, _path: &Path, _error: &Error) {}
    fn finish_file(&mut self, _path: &Path) {}
    fn finish(&mut self, _output: Option<&Path>) {}
}

pub struct ProgressReporter {
    enabled: bool,
    total_files: usize,
    processed_files: usize,
    skipped_files: usize,
    failed_files: usize,
    current_file: Option<String>,
}

impl ProgressReporter {
    pub fn new(enabled: bool, total_files: usize) -> Self {
        Self {
            enabled,
            total_files,
            processed_files: 0,
            skipped_files: 0,
            failed_files: 0,
            current_file: None,
        }
    }

    fn current_filename(&self) -> &str {
        self.current_file
            .as_deref()
            .unwrap_or("Arquivo desconhecido")
    }

    fn position(&self) -> usize {
        self.processed_files + self.skipped_files + self.failed_files
    }
}

impl ProgressSink for ProgressReporter {
    fn start_file(&mut self, path: &Path) {
        if !self.enabled {
            return;
        }
        self.current_file = Some(path.display().to_string());
        eprintln!(
            "[{}/{}] Concatenando {}",
            self.position() + 1,
            self.total_files.max(1),
            self.current_filename()
        );
    }

    fn skip_file(&mut self, path: &Path) {
        self.skipped_files += 1;
        self.current_file = None;
        if !self.enabled {
            return;
        }
        eprintln!("Arquivo vazio ignorado: {}", path.display());
    }

    // Errors are reported even in quiet mode.
    fn file_error(&mut self, path: &Path, error: &Error) {
        self.failed_files += 1;
        self.current_file = None;
        eprintln!("Erro em {}: {}", path.display(), error);
    }

    fn finish_file(&mut self, _path: &Path) {
        self.processed_files += 1;
        self.current_file = None;
    }

    fn finish(&mut self, output: Option<&Path>) {
        if !self.enabled {
            return;
        }
        match output {
            Some(output) => eprintln!(
                "Concatenação finalizada. Arquivos concatenados: {}. Ignorados: {}. Com erro: {}. Resultado salvo em {}",
                self.processed_files,
                self.skipped_files,
                self.failed_files,
                output.display()
            ),
            None => eprintln!(
                "Nenhum arquivo concatenado; nada foi gerado. Ignorados: {}. Com erro: {}.",
                self.skipped_files, self.failed_files
            ),
        }
    }
}
