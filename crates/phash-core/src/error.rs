use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the phash library
#[derive(Error, Debug)]
pub enum Error {
    /// Heap exhaustion while creating a buffer or grid
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Caller broke an input contract (grid size, buffer length, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pixel or frame data in a layout the core cannot read
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error
    #[error("Image processing error: {0}")]
    Image(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::AllocationFailure(err.to_string())
    }
}

/// Allocate a zero-filled vector, reporting heap exhaustion as an error
/// instead of aborting the process.
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, T::default());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_zeroed() {
        let buf: Vec<u32> = try_zeroed(16).unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_try_zeroed_overflow() {
        let result: Result<Vec<u64>> = try_zeroed(usize::MAX);
        assert!(matches!(result, Err(Error::AllocationFailure(_))));
    }
}
