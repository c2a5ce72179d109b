//! Flush policy: when does pending data have to go out.

use std::fmt;
use std::time::Duration;

/// One MiB.
const MB: usize = 1024 * 1024;

/// Maximum documents per bulk write.
pub const DEFAULT_MAX_BATCH_COUNT: usize = 512;

/// Cumulative batch size that forces a flush. The target store caps a
/// single request at 16MB, so this leaves ample room.
pub const DEFAULT_MAX_BATCH_BYTES: usize = 2 * MB;

/// Longest time pending data waits for a flush.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// The three independent bounds a document syncer enforces.
///
/// Production syncers always run with `BatchLimits::default()`. The limits
/// are a value rather than bare constants so smaller bounds can be exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// Flush once this many documents are pending.
    pub max_count: usize,
    /// Flush once the pending documents reach this many bytes.
    pub max_bytes: usize,
    /// Flush whatever is pending this long after the previous flush.
    pub flush_interval: Duration,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_BATCH_COUNT,
            max_bytes: DEFAULT_MAX_BATCH_BYTES,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Why a flush was triggered.
///
/// When several bounds are hit in the same iteration the first one in
/// declaration order is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    Shutdown,
    Timeout,
    Count,
    Bytes,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Shutdown => "shutdown",
            Self::Timeout => "timeout",
            Self::Count => "count",
            Self::Bytes => "bytes",
        };
        f.write_str(reason)
    }
}

/// Pure decision function over loop state and the count/size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushTrigger {
    max_count: usize,
    max_bytes: usize,
}

impl FlushTrigger {
    pub fn new(limits: &BatchLimits) -> Self {
        Self {
            max_count: limits.max_count,
            max_bytes: limits.max_bytes,
        }
    }

    /// Returns the reason to flush now, or `None` to keep accumulating.
    pub fn evaluate(
        &self,
        shutting_down: bool,
        timed_out: bool,
        count: usize,
        bytes: usize,
    ) -> Option<FlushReason> {
        if shutting_down {
            Some(FlushReason::Shutdown)
        } else if timed_out {
            Some(FlushReason::Timeout)
        } else if count >= self.max_count {
            Some(FlushReason::Count)
        } else if bytes >= self.max_bytes {
            Some(FlushReason::Bytes)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(max_count: usize, max_bytes: usize) -> FlushTrigger {
        FlushTrigger::new(&BatchLimits {
            max_count,
            max_bytes,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        })
    }

    #[test]
    fn default_limits() {
        let limits = BatchLimits::default();
        assert_eq!(limits.max_count, 512);
        assert_eq!(limits.max_bytes, 2 * 1024 * 1024);
        assert_eq!(limits.flush_interval, Duration::from_secs(1));
    }

    #[test]
    fn below_every_bound_keeps_accumulating() {
        let t = trigger(10, 100);
        assert_eq!(t.evaluate(false, false, 0, 0), None);
        assert_eq!(t.evaluate(false, false, 9, 99), None);
    }

    #[test]
    fn each_bound_forces_a_flush_on_its_own() {
        let t = trigger(10, 100);
        assert_eq!(t.evaluate(true, false, 0, 0), Some(FlushReason::Shutdown));
        assert_eq!(t.evaluate(false, true, 0, 0), Some(FlushReason::Timeout));
        assert_eq!(t.evaluate(false, false, 10, 0), Some(FlushReason::Count));
        assert_eq!(t.evaluate(false, false, 1, 100), Some(FlushReason::Bytes));
        assert_eq!(t.evaluate(false, false, 1, 120), Some(FlushReason::Bytes));
    }

    #[test]
    fn shutdown_wins_when_several_bounds_hit() {
        let t = trigger(1, 1);
        assert_eq!(t.evaluate(true, true, 5, 5), Some(FlushReason::Shutdown));
        assert_eq!(t.evaluate(false, true, 5, 5), Some(FlushReason::Timeout));
        assert_eq!(t.evaluate(false, false, 5, 5), Some(FlushReason::Count));
    }

    #[test]
    fn reason_display() {
        assert_eq!(FlushReason::Bytes.to_string(), "bytes");
        assert_eq!(FlushReason::Shutdown.to_string(), "shutdown");
    }
}
