use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinError {
    /// The named input could not be read as CSV.
    #[error("CSV error in {input}: {source}")]
    Csv {
        input: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A column the join cannot do without is absent from the header row.
    #[error("{input} has no \"{column}\" column")]
    MissingColumn { input: String, column: &'static str },
}

impl JoinError {
    pub(crate) fn csv(input: &str, source: csv::Error) -> Self {
        Self::Csv {
            input: input.to_string(),
            source,
        }
    }
}
