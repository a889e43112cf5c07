use crate::file::VinylFile;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

pub struct OutputWriter {
    dest: PathBuf,
}

impl OutputWriter {
    pub fn new(dest: &Path) -> Result<Self> {
        if !dest.exists() {
            fs::create_dir_all(dest).with_context(|| {
                format!("Não foi possível criar diretório de destino {:?}", dest)
            })?;
        }
        Ok(Self {
            dest: dest.to_path_buf(),
        })
    }

    pub fn write(&self, file: &VinylFile) -> Result<PathBuf> {
        let relative = file
            .relative()
            .ok_or_else(|| anyhow!("Arquivo de saída sem caminho"))?;
        let target = self.dest.join(relative);
        let mut contents = file.buffer().unwrap_or_default().to_vec();

        if let Some(map) = &file.source_map {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("Nome de arquivo inválido {:?}", target))?;
            let map_name = format!("{name}.map");
            let json = map
                .to_json()
                .context("Falha ao serializar source map")?;
            self.persist(&target.with_file_name(&map_name), json.as_bytes())?;
            contents.extend_from_slice(format!("\n//# sourceMappingURL={map_name}\n").as_bytes());
        }

        self.persist(&target, &contents)?;
        Ok(target)
    }

    fn persist(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let dir = target.parent().unwrap_or(&self.dest);
        fs::create_dir_all(dir)
            .with_context(|| format!("Não foi possível criar diretório {:?}", dir))?;

        let mut tmp = Builder::new()
            .prefix(".wrapped_concat")
            .tempfile_in(dir)
            .with_context(|| format!("Não foi possível criar arquivo temporário em {:?}", dir))?;
        tmp.write_all(bytes)
            .context("Erro ao escrever em arquivo temporário")?;
        tmp.flush()
            .context("Erro ao finalizar escrita de arquivo temporário")?;
        tmp.persist(target)
            .map_err(|err| err.error)
            .with_context(|| format!("Não foi possível criar arquivo de saída {:?}", target))?;
        Ok(())
    }
}
