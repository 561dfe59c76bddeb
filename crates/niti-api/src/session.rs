//! Process-wide authentication state.

use parking_lot::{Mutex, RwLock};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

type InvalidateObserver = Arc<dyn Fn() + Send + Sync>;

struct SessionInner {
    token: RwLock<Option<String>>,
    /// Armed by `set_token`, disarmed by the first `invalidate`, so a burst
    /// of 401s from concurrent calls produces exactly one logout signal.
    armed: AtomicBool,
    observers: Mutex<Vec<InvalidateObserver>>,
}

/// Shared session state: the bearer token plus invalidation signaling.
///
/// All fields are behind one `Arc`, so cloning is cheap. The session never
/// performs navigation itself; the UI layer registers an observer and
/// decides what a forced logout looks like.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create an unauthenticated session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(None),
                armed: AtomicBool::new(false),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a session from a persisted token
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Current bearer token, if authenticated
    pub fn token(&self) -> Option<String> {
        self.inner.token.read().clone()
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.read().is_some()
    }

    /// Store a token and re-arm invalidation
    pub fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write() = Some(token.into());
        self.inner.armed.store(true, Ordering::Release);
    }

    /// Clear the token without signaling (normal logout)
    pub fn clear(&self) {
        *self.inner.token.write() = None;
        self.inner.armed.store(false, Ordering::Release);
    }

    /// Clear the token and notify observers.
    ///
    /// Fires at most once per authenticated period; repeat calls (or calls
    /// on an unauthenticated session) are no-ops.
    pub fn invalidate(&self) {
        if self
            .inner
            .armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        *self.inner.token.write() = None;
        tracing::warn!("session invalidated by 401 response");
        // Snapshot first: a callback may itself call `on_invalidated`, and
        // the lock is not reentrant.
        let observers: Vec<InvalidateObserver> = self.inner.observers.lock().clone();
        for observer in &observers {
            observer();
        }
    }

    /// Register a callback fired when the session is invalidated by a 401
    pub fn on_invalidated(&self, f: impl Fn() + Send + Sync + 'static) {
        self.inner.observers.lock().push(Arc::new(f));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
