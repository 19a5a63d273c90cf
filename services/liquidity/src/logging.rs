//! Standardized emoji logging for liquidity flows
//!
//! Keeps log lines for approvals, submissions and pool events visually consistent
//! across the orchestrator and the chain adapter.

/// Standard emoji set for liquidity logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Warning or caution

    // Flow steps
    pub const SEARCH: &'static str = "🔍"; // Pair resolution
    pub const APPROVE: &'static str = "🔓"; // Spend approval
    pub const EXECUTE: &'static str = "⚡"; // Router submission
    pub const BALANCE: &'static str = "💰"; // Balance reads
    pub const CLAMP: &'static str = "✂️"; // Withdrawal clamped

    // Pool events
    pub const MINT: &'static str = "➕"; // Liquidity added
    pub const BURN: &'static str = "➖"; // Liquidity removed
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_search {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::SEARCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_approval {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::APPROVE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_balance {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BALANCE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_clamp {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::CLAMP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_mint {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MINT, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_burn {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BURN, format!($($arg)*))
    };
}
