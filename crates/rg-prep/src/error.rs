use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("H3 resolution {0} is outside 0..=15")]
    Resolution(u8),
}

pub type PrepResult<T> = Result<T, PrepError>;
