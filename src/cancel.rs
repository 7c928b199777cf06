use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Marks an interaction (a form, a list view) as abandoned.
///
/// Requests started under a token still run to completion; the token is
/// checked when the response arrives and a cancelled result is discarded
/// instead of being applied to shared state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Hand the token's lifetime to a guard: dropping the guard cancels.
    pub fn drop_guard(self) -> CancelOnDrop {
        CancelOnDrop { token: Some(self) }
    }
}

/// Cancels its token when dropped, unless disarmed first.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: Option<CancelToken>,
}

impl CancelOnDrop {
    pub fn token(&self) -> CancelToken {
        self.token.clone().unwrap_or_default()
    }

    /// The interaction finished normally; keep the token alive.
    pub fn disarm(mut self) -> CancelToken {
        self.token.take().unwrap_or_default()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
