use core::fmt;

/// Error taxonomy for this crate; see §7 of the specification.
///
/// No variant carries heap-allocated context: this is a `no_std`, `no_alloc`
/// crate, so the error type stays a bare enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A byte string argument did not have the length the algorithm requires.
    InvalidLength,
    /// A parameter (k, eta, d) fell outside the range this crate supports.
    InvalidParameter,
    /// A should-be-impossible internal state was observed (e.g. a corrupted
    /// constant table). Unrecoverable.
    InternalConsistency,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidLength => "invalid length",
            Error::InvalidParameter => "invalid parameter",
            Error::InternalConsistency => "internal consistency failure",
        };
        f.write_str(msg)
    }
}

/// If the condition is not met, return the given error. Borrowed in spirit
/// from the `anyhow` crate's `ensure!`.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure;
