//! Compiling files and directories of classes.
use crate::compiler::Compiler;
use crate::error::Error;
use crate::xml;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    extension: String,
    tokens: bool,
    stdout: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            extension: "jack".to_string(),
            tokens: false,
            stdout: false,
        }
    }
}

impl Options {
    /// Source file extension, without the dot.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Also write a `NameT.xml` token dump next to each source.
    pub fn tokens(mut self, tokens: bool) -> Self {
        self.tokens = tokens;
        self
    }

    /// Print VM code to stdout instead of writing `.vm` files.
    pub fn stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }
}

/// A file that did not compile.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub path: PathBuf,
    /// The file contents, empty if it could not be read.
    pub src: String,
    pub error: Error,
}

impl Failure {
    fn new(path: &Path, src: String, error: Error) -> Self {
        Self {
            path: path.to_path_buf(),
            src,
            error,
        }
    }
}

/// The file at `path`, or every `*.extension` file directly inside it, sorted.
pub fn collect_sources(path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Error::Io(format!("{} does not exist", path.display())));
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(path)? {
        let source = entry?.path();
        if source.is_file() && source.extension().is_some_and(|ext| ext == extension) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        return Err(Error::Io(format!(
            "no .{extension} files in {}",
            path.display()
        )));
    }
    sources.sort();
    Ok(sources)
}

/// Compile one class file into `Name.vm` beside it.
///
/// On failure no output of this file is left behind, including outputs of
/// an earlier successful run.
pub fn compile_file(path: &Path, options: &Options) -> std::result::Result<(), Failure> {
    log::info!("compiling {}", path.display());
    let result = fs::read_to_string(path)
        .map_err(|error| Failure::new(path, String::new(), error.into()))
        .and_then(|src| match write_outputs(path, &src, options) {
            Ok(()) => Ok(()),
            Err(error) => Err(Failure::new(path, src, error)),
        });
    if result.is_err() {
        remove_outputs(path, options);
    }
    result
}

fn write_outputs(path: &Path, src: &str, options: &Options) -> Result<()> {
    if options.tokens {
        write_token_dump(path, src)?;
    }
    write_vm(path, src, options)
}

/// Compile every source under `path`, continuing past failures.
pub fn run(path: &Path, options: &Options) -> Result<Vec<Failure>> {
    let sources = collect_sources(path, &options.extension)?;
    log::info!("found {} source file(s)", sources.len());

    let failures = sources
        .iter()
        .filter_map(|source| compile_file(source, options).err())
        .collect::<Vec<_>>();
    if !failures.is_empty() {
        log::info!("{} of {} file(s) failed", failures.len(), sources.len());
    }
    Ok(failures)
}

/// `dir/Name.jack` becomes `dir/NameT.xml`.
fn token_dump_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{stem}T.xml"))
}

fn write_token_dump(path: &Path, src: &str) -> Result<()> {
    let dump = token_dump_path(path);
    log::debug!("writing tokens to {}", dump.display());
    xml::write_tokens(src, BufWriter::new(File::create(dump)?))?;
    Ok(())
}

fn write_vm(path: &Path, src: &str, options: &Options) -> Result<()> {
    if options.stdout {
        let _out = Compiler::new(src, io::stdout().lock()).compile()?;
        return Ok(());
    }
    let out = BufWriter::new(File::create(path.with_extension("vm"))?);
    Compiler::new(src, out).compile()?;
    Ok(())
}

/// Delete whatever `compile_file` may have written for `path`.
fn remove_outputs(path: &Path, options: &Options) {
    let mut outputs = Vec::new();
    if !options.stdout {
        outputs.push(path.with_extension("vm"));
    }
    if options.tokens {
        outputs.push(token_dump_path(path));
    }

    for output in outputs {
        match fs::remove_file(&output) {
            Ok(()) => log::debug!("removed stale output {}", output.display()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => log::warn!("could not remove {}: {error}", output.display()),
        }
    }
}
