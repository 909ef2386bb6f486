use thiserror::Error;

/// Errors from pyramid geometry calculations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Width or height is zero
    #[error("invalid resolution: {width}x{height} (dimensions must be positive)")]
    InvalidResolution { width: u32, height: u32 },

    /// Zoom factor math requires a power-of-two tile edge
    #[error("invalid tile size: {0} (must be a power of two)")]
    InvalidTileSize(u32),
}

/// Errors from dataset resolution and opening
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    /// No factory matched the suffix and no default factory is configured
    #[error("no dataset factory for suffix '{suffix}' and no default configured")]
    NoDefaultFactory { suffix: String },

    /// Dataset source could not be opened
    #[error("failed to open dataset at {path}: {message}")]
    Open { path: String, message: String },

    /// Dataset pixels could not be decoded
    #[error("failed to decode dataset: {0}")]
    Decode(String),
}

/// Errors from slide decoding collaborators
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Slide source does not exist
    #[error("slide not found: {path}")]
    NotFound { path: String },

    /// Requested pyramid level does not exist
    #[error("invalid level {level}: pyramid has {max_levels} levels")]
    InvalidLevel { level: u32, max_levels: u32 },

    /// Requested tile falls outside the level's grid
    #[error("tile ({col}, {row}) out of bounds at level {level}: grid is {cols}x{rows}")]
    TileOutOfBounds {
        level: u32,
        col: u32,
        row: u32,
        cols: u32,
        rows: u32,
    },

    /// Pixel data could not be decoded
    #[error("failed to decode slide: {0}")]
    Decode(String),
}

/// Errors from encoding pixel regions into output formats
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Encoder failed to produce output bytes
    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// Source pixel layout cannot be fed to this encoder
    #[error("pixel layout not supported by {format} encoder: {message}")]
    UnsupportedPixelLayout {
        format: &'static str,
        message: String,
    },
}

/// Errors from cache backends.
///
/// Never fatal to a request: a failed read counts as a miss and a failed
/// write still returns the freshly generated bytes.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Backend could not serve the operation
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Errors from the remote catalog API used by the deletion utility.
///
/// Refused deletions and missing records are ordinary outcomes, not errors;
/// only transport failures surface here.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request could not be sent or the response not read
    #[error("catalog request failed: {0}")]
    Request(String),

    /// Endpoint URL could not be built
    #[error("invalid catalog URL: {0}")]
    Url(String),
}

/// Errors surfaced by tile engine operations.
///
/// Absence is not an error: unresolvable images come back as `Ok(None)`,
/// so `DecodeError::NotFound` never escapes the engine through this type.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Request parameters rejected by pyramid geometry
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Dataset resolution failed
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Slide decoding failed
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Output encoding failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
