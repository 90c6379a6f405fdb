//! Single-assignment fallback signal shared by one request's branches.
//!
//! The primary branch owns the [`FallbackWriter`] and resolves it exactly
//! once after its call settles. Dependent branches hold a [`FallbackReader`]
//! and wait on it before building their request, so the primary's outcome is
//! always observed. Dropping the writer unresolved releases readers with the
//! default value of zero.

use tokio::sync::watch;

/// Factory for a connected writer/reader pair.
pub struct FallbackSignal;

impl FallbackSignal {
    pub fn channel() -> (FallbackWriter, FallbackReader) {
        let (sender, receiver) = watch::channel(None);
        (FallbackWriter { sender }, FallbackReader { receiver })
    }
}

/// Write side; consumed on resolution so it can only be written once.
#[derive(Debug)]
pub struct FallbackWriter {
    sender: watch::Sender<Option<u32>>,
}

impl FallbackWriter {
    pub fn resolve(self, value: u32) {
        // No readers left is fine: nobody depends on the value any more.
        let _ = self.sender.send(Some(value));
    }
}

/// Read side; cheap to clone, one per dependent branch.
#[derive(Debug, Clone)]
pub struct FallbackReader {
    receiver: watch::Receiver<Option<u32>>,
}

impl FallbackReader {
    /// Waits until the writer resolves or is dropped.
    pub async fn observe(mut self) -> u32 {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(value) => (*value).unwrap_or(0),
            Err(_) => 0,
        }
    }
}
