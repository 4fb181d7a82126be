use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use crate::{
    backend::{emit, Artifact, GenerateOptions},
    compiler::compile_schema,
    error::CclError,
    types::Definition,
};

/// Reads schema source text, telling a missing file apart from a permission
/// problem and from any other I/O failure.
pub fn read_source(path: &Path) -> Result<String, CclError> {
    fs::read_to_string(path).map_err(|e| CclError::source_io(path.to_path_buf(), e))
}

/// Reads and compiles the schema at `path`.
pub fn load_definition(path: &Path) -> Result<Definition, CclError> {
    let text = read_source(path)?;
    debug!(path = %path.display(), bytes = text.len(), "read schema source");
    compile_schema(&text)
}

/// Writes `artifacts` into `output_dir` in order. If any write fails, the
/// files this call already wrote are removed before the error is returned.
pub fn write_artifacts(artifacts: &[Artifact], output_dir: &Path) -> Result<Vec<PathBuf>, CclError> {
    fs::create_dir_all(output_dir).map_err(|source| CclError::OutputIo {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = output_dir.join(&artifact.file_name);
        if let Err(source) = fs::write(&path, &artifact.contents) {
            for done in &written {
                if let Err(e) = fs::remove_file(done) {
                    warn!(path = %done.display(), error = %e, "failed to remove partial output");
                } else {
                    warn!(path = %done.display(), "removed partial output");
                }
            }
            return Err(CclError::OutputIo { path, source });
        }
        info!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// The whole pipeline: read, compile, plan and emit in memory, then write.
/// Returns the written paths in write order.
pub fn generate(source: &Path, options: &GenerateOptions) -> Result<Vec<PathBuf>, CclError> {
    let definition = load_definition(source)?;
    let artifacts = emit(&definition, options)?;
    debug!(backend = %options.backend, artifacts = artifacts.len(), "emission complete");
    write_artifacts(&artifacts, &options.output_dir)
}
