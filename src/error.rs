//! Host-facing I/O errors: the boundary the CLI hits before the evaluator ever runs.
//!
//! Distinct from [Value::Error](crate::value::Value::Error): a [HostError] means "the script
//! could not even be read", not "the script ran and produced an error value". The REPL/CLI use
//! `?` to bubble these up to `main`; nothing inside the evaluator ever constructs one.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("could not read {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("could not write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}
