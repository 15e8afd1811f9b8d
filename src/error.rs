use thiserror::Error;

/// Errors that can occur building a [`crate::Fifo`].
///
/// Availability exhaustion (full/empty) is not an error: best-effort
/// operations return a short count and all-or-nothing operations return
/// `false`. Contract violations (wrong-thread access, SPSC discipline
/// breaks) are debug assertions, not part of this enum.
#[derive(Debug, Error)]
pub enum FifoError {
    /// The requested alignment was not a power of two.
    #[error("alignment {0} is not a power of two")]
    InvalidArgument(usize),

    /// The allocator returned no memory for the requested layout.
    #[error("allocation of {size} bytes (align {align}) failed")]
    OutOfMemory {
        /// Requested allocation size in bytes.
        size: usize,
        /// Requested allocation alignment.
        align: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message() {
        let err = FifoError::InvalidArgument(3);
        assert_eq!(err.to_string(), "alignment 3 is not a power of two");
    }

    #[test]
    fn out_of_memory_message() {
        let err = FifoError::OutOfMemory { size: 64, align: 16 };
        assert_eq!(err.to_string(), "allocation of 64 bytes (align 16) failed");
    }
}
