#[derive(Debug, thiserror::Error)]
pub enum Error {
    // `source_id` rather than `source`: thiserror reserves a field named
    // `source` for the error-source chain.
    #[error("graph contains an edge with a missing endpoint: {source_id} -> {target_id}")]
    MissingEndpoint { source_id: String, target_id: String },

    #[error("graph contains a duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("node {id} has a non-finite or negative size: {width}x{height}")]
    InvalidNodeSize {
        id: String,
        width: f64,
        height: f64,
    },

    #[error("aspect_ratio must be a positive finite number, got {value}")]
    InvalidAspectRatio { value: f64 },

    #[error("min_edge_length must be a non-negative finite number, got {value}")]
    InvalidMinEdgeLength { value: f64 },

    #[error("cell size must be positive and finite, got {width}x{height}")]
    InvalidCellSize { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
