//! Cooperative cancellation for streaming operations.
//!
//! Streaming encrypt/decrypt check cancellation once per chunk boundary —
//! the only suspension points are the I/O read from the source and the I/O
//! write to the destination.

use std::sync::atomic::{AtomicBool, Ordering};

pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// A cancellation source that never fires.
pub struct NoCancel;

impl Cancellation for NoCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A shareable flag-backed cancellation source, e.g. for wiring up Ctrl-C.
#[derive(Default)]
pub struct AtomicCancel(AtomicBool);

impl AtomicCancel {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Cancellation for AtomicCancel {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
