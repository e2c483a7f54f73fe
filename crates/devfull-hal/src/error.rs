use nix::errno::Errno;
use thiserror::Error;

pub type HalResult<T> = std::result::Result<T, HalError>;

/// Text the platform attaches to ENOSPC.
pub const OUT_OF_SPACE_MESSAGE: &str = "No space left on device";

#[derive(Error, Debug)]
pub enum HalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nix errno: {0}")]
    Nix(#[from] Errno),

    #[error("{0}")]
    Other(String),
}

impl HalError {
    /// Raw errno carried by this error, if any.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            HalError::Io(err) => err.raw_os_error().map(Errno::from_raw),
            HalError::Nix(errno) => Some(*errno),
            _ => None,
        }
    }

    /// True when the platform reported that the device has no space left,
    /// either as ENOSPC or as the canonical message text.
    pub fn is_out_of_space(&self) -> bool {
        if self.errno() == Some(Errno::ENOSPC) {
            return true;
        }
        self.to_string().contains(OUT_OF_SPACE_MESSAGE)
    }
}
