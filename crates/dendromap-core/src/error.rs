pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Newick parse error at byte {offset}: {message}")]
    NewickParse { offset: usize, message: String },

    #[error("Invalid dendro-heatmap input: {message}")]
    InvalidInput { message: String },

    #[error("Duplicate heatmap cell: x={x:?}, y={y:?}")]
    DuplicateCell { x: String, y: String },

    #[error("Input JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn newick(offset: usize, message: impl Into<String>) -> Self {
        Self::NewickParse {
            offset,
            message: message.into(),
        }
    }
}
