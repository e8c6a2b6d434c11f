use std::fmt;
use std::sync::{Arc, Mutex};

use super::Value;
use crate::error::SourceError;

/// The pull side of a [`PayloadStream`].
pub type Producer = Box<dyn Iterator<Item = Result<Value, SourceError>> + Send>;

/// A lazily produced, single-pass sequence of values.
///
/// Cloning a stream shares the same producer. [`PayloadStream::take`] hands
/// the producer out exactly once, so a stream can never be rewound or read twice.
#[derive(Clone)]
pub struct PayloadStream {
    producer: Arc<Mutex<Option<Producer>>>,
}

impl PayloadStream {
    /// Stream over values that cannot fail.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self::fallible(items.into_iter().map(Ok))
    }

    /// Stream over values read from a source that can fail mid-way.
    pub fn fallible<I>(items: I) -> Self
    where
        I: Iterator<Item = Result<Value, SourceError>> + Send + 'static,
    {
        Self {
            producer: Arc::new(Mutex::new(Some(Box::new(items)))),
        }
    }

    /// Take the producer; `None` once it has been taken.
    pub fn take(&self) -> Option<Producer> {
        self.producer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    pub fn is_consumed(&self) -> bool {
        self.producer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }

    pub fn ptr_eq(&self, other: &PayloadStream) -> bool {
        Arc::ptr_eq(&self.producer, &other.producer)
    }
}

impl fmt::Debug for PayloadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadStream")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
