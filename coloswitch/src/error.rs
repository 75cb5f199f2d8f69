#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Text that is neither `#rrggbb` nor `rgb()`/`rgba()`
    #[error("invalid color code: {code}")]
    InvalidColorCode { code: String },
    #[error("tolerance must lie in [0, 100], got {0}")]
    InvalidTolerance(f64),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    StdIO(#[from] std::io::Error),
}
impl Error {
    pub(crate) fn invalid_color_code(code: impl Into<String>) -> Self {
        Self::InvalidColorCode { code: code.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
