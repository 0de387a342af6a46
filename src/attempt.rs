//! Success/failure results with a contextual error trail.
//!
//! An [`Attempt<A>`] is a plain `Result<A, Error>`. Combinators never panic;
//! they push a context frame onto the [`Error`] as it bubbles up, so a
//! failure deep inside a composed codec renders as `outer/inner/message`.

use thiserror::Error as ThisError;

/// Result of an encode or decode operation.
pub type Attempt<A> = Result<A, Error>;

/// Taxonomy of ways a codec operation can fail.
///
/// This is categorization only; callers match on `error.kind()` rather than
/// on the `Error` type itself, since `Error` additionally carries a message
/// and a context trail that `ErrorKind` alone does not.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorKind {
    #[error("insufficient bits: needed {expected}, had {have}")]
    InsufficientBits { expected: u64, have: u64 },
    #[error("value out of range")]
    OutOfRange,
    #[error("constant mismatch")]
    ConstantMismatch,
    #[error("no matching discriminator")]
    DiscriminatorMismatch,
    #[error("value is not of the expected type")]
    TypeMismatch,
    #[error("charset failure")]
    CharsetFailure,
    #[error("backend failure")]
    BackendFailure,
    #[error("operation disabled in this direction")]
    HalfDuplex,
    #[error("remainder present")]
    RemainderPresent,
    #[error("{0}")]
    General(String),
}

/// A codec failure: a human-readable message plus a stack of context frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
}

impl Error {
    /// Build an error from a taxonomy kind, using its default rendering as the message.
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message, context: Vec::new() }
    }

    /// Build a free-text error (the `General` kind).
    pub fn msg(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { kind: ErrorKind::General(message.clone()), message, context: Vec::new() }
    }

    /// Build an `InsufficientBits` error, already carrying the given context frames.
    pub fn insufficient_bits(expected: u64, have: u64, context: Vec<String>) -> Self {
        let kind = ErrorKind::InsufficientBits { expected, have };
        let message = kind.to_string();
        Self { kind, message, context }
    }

    /// Prepend a named frame to the context trail.
    pub fn push_context(mut self, name: impl Into<String>) -> Self {
        self.context.insert(0, name.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for frame in &self.context {
            write!(f, "{frame}/")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Unwraps a successful [`Attempt`], panicking with the rendered error otherwise.
///
/// This is the one place the pure core is allowed to panic; it exists for
/// callers (and tests) that have already established the value is valid.
pub fn decode_valid_value<A>(attempt: Attempt<crate::codec::DecodeResult<A>>) -> A {
    match attempt {
        Ok(r) => r.value,
        Err(e) => panic!("decode_valid_value: {e}"),
    }
}

/// Unwraps a successful encode [`Attempt`], panicking with the rendered error otherwise.
pub fn encode_valid(attempt: Attempt<crate::bitvector::BitVector>) -> crate::bitvector::BitVector {
    match attempt {
        Ok(bits) => bits,
        Err(e) => panic!("encode_valid: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_renders_outer_first() {
        let e = Error::msg("badv").push_context("inner").push_context("outer");
        assert_eq!(e.to_string(), "outer/inner/badv");
    }

    #[test]
    fn insufficient_bits_message() {
        let e = Error::insufficient_bits(8, 0, vec![]);
        assert_eq!(e.to_string(), "insufficient bits: needed 8, had 0");
    }
}
