#[macro_export]
macro_rules! debug_panic {
    ($arg: expr) => {
        if cfg!(debug_assertions) && tillpoint_shared::const_config::PANIC_ON_RARE_ERR {
            panic!(
                "Rare error detected! Panicking to make it more obvious: {:?}",
                $arg
            )
        }
    };
}

/// Use this version if we know that under normal operation this can happen but
/// we wish to monitor it
#[macro_export]
macro_rules! log_err_as_warn {
    ($arg: expr) => {
        if let Err(mishap) = $arg {
            tracing::warn!(?mishap);
        }
    };
}
