use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wrapped_concat::{ConcatOptions, Config, SourceMapMode};

#[derive(Parser, Debug)]
#[command(
    name = "wrapped-concat",
    version,
    about = "Concatena arquivos em um único arquivo, com prefixo, sufixo e source maps opcionais.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "ARQUIVO",
        help = "Nome do arquivo concatenado, relativo ao diretório de destino"
    )]
    pub output: String,

    #[arg(
        value_name = "CAMINHO",
        help = "Arquivos ou diretórios de entrada, concatenados na ordem informada",
        required = true
    )]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short = 'e',
        long = "extension",
        alias = "ext",
        default_value = "js",
        value_name = "EXT",
        help = "Extensão usada para filtrar os arquivos de entrada"
    )]
    pub ext: String,

    #[arg(
        short,
        long,
        help = "Percorre diretórios recursivamente em busca de arquivos"
    )]
    pub recursive: bool,

    #[arg(
        short = 'd',
        long = "dest",
        default_value = ".",
        value_name = "DIR",
        help = "Diretório onde o arquivo concatenado é gravado"
    )]
    pub dest: PathBuf,

    #[arg(
        long = "options",
        value_name = "JSON",
        help = "Arquivo JSON com opções (newLine, prefix, suffix, createIfNoneTarget, sourceMapMode)"
    )]
    pub options_file: Option<PathBuf>,

    #[arg(
        long = "new-line",
        value_name = "TEXTO",
        help = "Separador entre arquivos; aceita \\n, \\r e \\t"
    )]
    pub new_line: Option<String>,

    #[arg(long, value_name = "TEXTO", help = "Texto inserido no início do resultado")]
    pub prefix: Option<String>,

    #[arg(long, value_name = "TEXTO", help = "Texto inserido no fim do resultado")]
    pub suffix: Option<String>,

    #[arg(
        long = "create-if-none",
        help = "Gera o arquivo de saída mesmo sem nenhuma entrada"
    )]
    pub create_if_none: bool,

    #[arg(
        short = 's',
        long = "source-maps",
        help = "Carrega <arquivo>.map das entradas e grava o source map combinado"
    )]
    pub source_maps: bool,

    #[arg(
        long = "rescan-source-maps",
        help = "Decide o uso de source maps considerando todas as entradas, não só a primeira"
    )]
    pub rescan_source_maps: bool,

    #[arg(
        long = "quiet",
        help = "Suprime mensagens de progresso",
        action = clap::ArgAction::SetTrue
    )]
    pub quiet: bool,
}

// `\\` yields a literal backslash; unknown escapes are kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

impl Cli {
    pub fn into_config(self) -> Result<Config> {
        let mut options = match &self.options_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Falha ao ler arquivo de opções {:?}", path))?;
                ConcatOptions::from_json(&raw)
                    .with_context(|| format!("Opções inválidas em {:?}", path))?
            }
            None => ConcatOptions::default(),
        };

        if let Some(new_line) = &self.new_line {
            options.new_line = unescape(new_line);
        }
        if let Some(prefix) = self.prefix {
            options.prefix = Some(unescape(&prefix));
        }
        if let Some(suffix) = self.suffix {
            options.suffix = Some(unescape(&suffix));
        }
        if self.create_if_none {
            options.create_if_none_target = true;
        }
        if self.rescan_source_maps {
            options.source_map_mode = SourceMapMode::Rescan;
        }

        Ok(Config {
            output: self.output,
            inputs: self.inputs,
            ext: self.ext,
            recursive: self.recursive,
            dest: self.dest,
            options,
            source_maps: self.source_maps,
            quiet: self.quiet,
        })
    }
}
