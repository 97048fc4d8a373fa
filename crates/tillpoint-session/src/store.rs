use std::{
    fmt::Display,
    ops::ControlFlow,
    sync::{Arc, Mutex},
};

use resettable_timer::{spawn_repeating, spawn_single_shot, TimerHandle};
use tillpoint_shared::{
    branch::BranchId,
    const_config::{
        session::{SESSION_EXPIRY_CHECK_INTERVAL, SESSION_IDLE_TIMEOUT, SESSION_REFRESH_THRESHOLD},
        storage::{STORAGE_KEY_SESSION, STORAGE_KEY_TOKEN},
    },
    debug_panic,
    token::AuthToken,
    uac::RoleName,
};
use tillpoint_time::{Clock, Minutes, Seconds, Timestamp};
use tracing::{debug, info, warn};

use crate::storage::SessionStorage;

/// The persisted record of one authenticated login
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: AuthToken,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
    pub role: RoleName,
    pub branch_id: Option<BranchId>,
}

/// How a session was forced to end, handed to the expiry callback so the
/// login redirect can say why
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// No qualifying user interaction for the idle window
    Idle,
    /// The token's absolute expiration passed
    Expired,
}

impl ExpiryReason {
    /// Value for the reason query parameter on the login redirect
    pub fn as_query_param(&self) -> &'static str {
        match self {
            ExpiryReason::Idle => "idle",
            ExpiryReason::Expired => "expired",
        }
    }
}

impl Display for ExpiryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query_param())
    }
}

pub trait ExpiryCallback: Fn(ExpiryReason) + Send + Sync + 'static {}
impl<T> ExpiryCallback for T where T: Fn(ExpiryReason) + Send + Sync + 'static {}

/// Single source of truth for "is the caller currently authenticated"
///
/// Survives restarts through the injected storage. Owns the two watcher
/// tasks; both are stopped whenever the session is cleared so no timers leak
/// across login/logout cycles. Clones share state so a handle can be given
/// to background tasks.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    storage: Box<dyn SessionStorage>,
    idle_timer: Option<TimerHandle>,
    expiry_timer: Option<TimerHandle>,
    on_expired: Option<Arc<dyn Fn(ExpiryReason) + Send + Sync>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(clock: impl Clock, storage: impl SessionStorage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                clock: Arc::new(clock),
                storage: Box::new(storage),
                idle_timer: None,
                expiry_timer: None,
                on_expired: None,
            })),
        }
    }

    /// Records a fresh login and starts the idle and expiry watchers
    ///
    /// The token is opaque and `ttl_minutes` being positive is the caller's
    /// responsibility.
    // WARNING: Must skip token as it is the bearer credential
    #[tracing::instrument(skip(self, token))]
    pub fn set_session(
        &self,
        token: AuthToken,
        ttl_minutes: Minutes,
        role: RoleName,
        branch_id: Option<BranchId>,
    ) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let now = inner.clock.now();
        let record = SessionRecord {
            token,
            expires_at: now + Seconds::from(ttl_minutes),
            last_activity: now,
            role,
            branch_id,
        };
        Self::persist(&mut inner, &record);

        // Replacing the handles stops any watchers from a previous login
        let store = self.clone();
        inner.idle_timer = Some(spawn_single_shot(SESSION_IDLE_TIMEOUT.into(), move || {
            store.force_expire(ExpiryReason::Idle)
        }));
        let store = self.clone();
        inner.expiry_timer = Some(spawn_repeating(
            SESSION_EXPIRY_CHECK_INTERVAL.into(),
            move || {
                if store.is_session_valid() {
                    ControlFlow::Continue(())
                } else {
                    store.force_expire(ExpiryReason::Expired);
                    ControlFlow::Break(())
                }
            },
        ));
        info!("session started");
    }

    /// Returns the current record if one is persisted and not past absolute
    /// expiry
    ///
    /// A record past `expires_at` is cleared as a side effect of the read so
    /// a stale-valid record is never served after the wall clock has passed
    /// expiry.
    pub fn get_session(&self) -> Option<SessionRecord> {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let record = Self::load_record(&mut inner)?;
        if inner.clock.now() > record.expires_at {
            debug!("session past absolute expiry, clearing on read");
            Self::clear_inner(&mut inner);
            return None;
        }
        Some(record)
    }

    /// Token of a valid session, or None
    pub fn get_token(&self) -> Option<AuthToken> {
        self.get_session().map(|record| record.token)
    }

    /// Marks a qualifying user interaction: bumps last activity and resets
    /// the idle countdown
    ///
    /// No-op when there is no session. A session past absolute expiry is
    /// cleared instead of extended (interaction never extends `expires_at`).
    pub fn update_activity(&self) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let Some(mut record) = Self::load_record(&mut inner) else {
            return;
        };
        let now = inner.clock.now();
        if now > record.expires_at {
            Self::clear_inner(&mut inner);
            return;
        }
        record.last_activity = now;
        Self::persist(&mut inner, &record);
        if let Some(idle_timer) = &inner.idle_timer {
            idle_timer.reset();
        }
    }

    /// Moves the session to another branch, keeping everything else
    pub fn set_branch(&self, branch_id: Option<BranchId>) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let Some(mut record) = Self::load_record(&mut inner) else {
            return;
        };
        if inner.clock.now() > record.expires_at {
            Self::clear_inner(&mut inner);
            return;
        }
        record.branch_id = branch_id;
        Self::persist(&mut inner, &record);
    }

    /// True iff a session exists, is not past absolute expiry, and has seen
    /// activity within the idle window
    pub fn is_session_valid(&self) -> bool {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let Some(record) = Self::load_record(&mut inner) else {
            return false;
        };
        let now = inner.clock.now();
        if now > record.expires_at {
            return false;
        }
        match now.seconds_since(record.last_activity) {
            Some(idle) => idle <= SESSION_IDLE_TIMEOUT,
            // Last activity ahead of this clock read, treat as just active
            None => true,
        }
    }

    /// Hint that callers should renew the token: remaining time-to-live is
    /// strictly between zero and the refresh threshold
    ///
    /// The renewal itself is not this layer's job.
    pub fn needs_refresh(&self) -> bool {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let Some(record) = Self::load_record(&mut inner) else {
            return false;
        };
        let now = inner.clock.now();
        let Some(remaining) = record.expires_at.seconds_since(now) else {
            return false;
        };
        now < record.expires_at && remaining < SESSION_REFRESH_THRESHOLD
    }

    /// Seconds until absolute expiry of the current session, or None
    pub fn remaining_ttl(&self) -> Option<Seconds> {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        let record = Self::load_record(&mut inner)?;
        record.expires_at.seconds_since(inner.clock.now())
    }

    /// Removes all persisted session keys and stops both watchers; idempotent
    #[tracing::instrument(skip(self))]
    pub fn clear_session(&self) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        Self::clear_inner(&mut inner);
    }

    /// Registers the one callback invoked when a watcher force-ends the
    /// session (passive expiry on read does not fire it)
    ///
    /// Registering again replaces the previous callback.
    pub fn on_expired<F: ExpiryCallback>(&self, callback: F) {
        self.inner.lock().expect("mutex poisoned").on_expired = Some(Arc::new(callback));
    }

    /// Watcher path: clears the session and fires the registered callback
    ///
    /// Checks the record is still present first so the callback fires at most
    /// once per session no matter how the two watchers interleave.
    fn force_expire(&self, reason: ExpiryReason) {
        let callback = {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            if inner.storage.get(STORAGE_KEY_SESSION).is_none() {
                return;
            }
            Self::clear_inner(&mut inner);
            inner.on_expired.clone()
        };
        info!(%reason, "session force-ended");
        if let Some(callback) = callback {
            callback(reason);
        }
    }

    /// Loads and parses the persisted record
    ///
    /// Data that fails to parse is treated identically to "no session" and
    /// cleared; nothing propagates to callers.
    fn load_record(inner: &mut Inner) -> Option<SessionRecord> {
        let raw = inner.storage.get(STORAGE_KEY_SESSION)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(?err, "persisted session failed to parse, clearing");
                Self::clear_inner(inner);
                None
            }
        }
    }

    fn persist(inner: &mut Inner, record: &SessionRecord) {
        match serde_json::to_string(record) {
            Ok(json) => {
                inner.storage.set(STORAGE_KEY_SESSION, &json);
                // Legacy duplicate of the bare token for older reads
                inner.storage.set(STORAGE_KEY_TOKEN, record.token.as_ref());
            }
            Err(err) => {
                tracing::error!(?err, "failed to serialize session record");
                debug_panic!(err);
            }
        }
    }

    fn clear_inner(inner: &mut Inner) {
        inner.storage.remove(STORAGE_KEY_SESSION);
        inner.storage.remove(STORAGE_KEY_TOKEN);
        // Dropping the handles stops the tasks
        inner.idle_timer = None;
        inner.expiry_timer = None;
    }
}
