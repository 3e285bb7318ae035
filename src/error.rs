use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("sheet has {rows} rows, at least {required} are needed for the results layout")]
    MalformedInput { rows: usize, required: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// True when the file itself was readable but does not follow the layout.
    pub fn is_layout_problem(&self) -> bool {
        matches!(self, ImportError::MalformedInput { .. })
    }
}
