pub const NO_ERROR: u32 = 0;
pub const ERR_UNKNOWN_CMD: u32 = 1;
pub const ERR_INVALID_CMD: u32 = 2;
pub const ERR_NO_MEMORY: u32 = 3;
pub const ERR_VERIFICATION_FAILED: u32 = 4;
pub const ERR_LOADING_FAILED: u32 = 5;
pub const ERR_ALREADY_EXISTS: u32 = 6;
pub const ERR_INTERNAL: u32 = 7;
pub const ERR_INVALID_VERSION: u32 = 8;
pub const ERR_POLICY_VIOLATION: u32 = 9;
pub const ERR_NOT_ENCRYPTED: u32 = 10;

/// Rejections reported by the secure world, one variant per wire code.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unknown command")]
    UnknownCommand,
    #[error("invalid command")]
    InvalidCommand,
    #[error("out of memory")]
    OutOfMemory,
    #[error("package verification failed")]
    VerificationFailed,
    #[error("package loading failed")]
    LoadingFailed,
    #[error("package already exists")]
    AlreadyExists,
    #[error("internal service error")]
    InternalError,
    #[error("invalid package version")]
    InvalidVersion,
    #[error("policy violation")]
    PolicyViolation,
    #[error("package not encrypted")]
    NotEncrypted,
}

impl ServiceError {
    /// Classify a wire status. Total over the whole code space: codes
    /// outside the known table collapse to `InternalError`, so raw wire
    /// values never reach callers.
    pub fn check(code: u32) -> Result<(), ServiceError> {
        match code {
            NO_ERROR => Ok(()),
            ERR_UNKNOWN_CMD => Err(ServiceError::UnknownCommand),
            ERR_INVALID_CMD => Err(ServiceError::InvalidCommand),
            ERR_NO_MEMORY => Err(ServiceError::OutOfMemory),
            ERR_VERIFICATION_FAILED => Err(ServiceError::VerificationFailed),
            ERR_LOADING_FAILED => Err(ServiceError::LoadingFailed),
            ERR_ALREADY_EXISTS => Err(ServiceError::AlreadyExists),
            ERR_INTERNAL => Err(ServiceError::InternalError),
            ERR_INVALID_VERSION => Err(ServiceError::InvalidVersion),
            ERR_POLICY_VIOLATION => Err(ServiceError::PolicyViolation),
            ERR_NOT_ENCRYPTED => Err(ServiceError::NotEncrypted),
            _ => Err(ServiceError::InternalError),
        }
    }
}
