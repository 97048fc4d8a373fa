//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

use tillpoint_time::Seconds;

pub const PANIC_ON_RARE_ERR: bool = true;

pub mod session {
    use super::*;

    /// Forced logout after this much time without a qualifying user
    /// interaction, independent of token expiry
    pub const SESSION_IDLE_TIMEOUT: Seconds = Seconds::new(30 * 60);

    /// Remaining time-to-live below which callers should proactively renew
    /// the token (the session layer never does the renewal itself)
    pub const SESSION_REFRESH_THRESHOLD: Seconds = Seconds::new(5 * 60);

    /// How often the expiry watcher re-checks absolute expiration
    pub const SESSION_EXPIRY_CHECK_INTERVAL: Seconds = Seconds::new(60);
}

pub mod storage {
    /// Key the full session record is persisted under
    pub const STORAGE_KEY_SESSION: &str = "tillpoint.session";

    /// Legacy duplicate of the bare token kept for older reads
    pub const STORAGE_KEY_TOKEN: &str = "tillpoint.token";
}
