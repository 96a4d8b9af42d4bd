use crate::error::StreamError;
use zkir_core::Number;

/// The public-input or private-input (witness) value source for one
/// type, consumed in order by `public_in`/`private_in` directives.
pub trait InputStream {
    fn next(&mut self) -> Result<Number, StreamError>;

    /// True if the stream still has values queued once the top-level
    /// directive list has finished. A producer-backed streaming source
    /// that cannot look ahead may always answer `false`; `spec.md` §5
    /// only requires this check to be best-effort.
    fn has_remaining(&self) -> bool {
        false
    }
}

/// An `InputStream` backed by a pre-loaded in-memory sequence, useful
/// for tests and for any caller that has already materialized its
/// witness rather than streaming it.
#[derive(Debug, Clone, Default)]
pub struct VecInputStream {
    values: std::collections::VecDeque<Number>,
}

impl VecInputStream {
    pub fn new(values: impl IntoIterator<Item = Number>) -> Self {
        VecInputStream {
            values: values.into_iter().collect(),
        }
    }
}

impl InputStream for VecInputStream {
    fn next(&mut self) -> Result<Number, StreamError> {
        self.values.pop_front().ok_or(StreamError::Exhausted(zkir_core::TypeIdx(0)))
    }

    fn has_remaining(&self) -> bool {
        !self.values.is_empty()
    }
}
