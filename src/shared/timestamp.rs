/// Wall-clock helpers for stamping orders and matches
///
/// Timestamps are nanoseconds since the Unix epoch. They are informational
/// only: priority inside a price level is decided by arrival order, never by
/// comparing timestamps.
///
/// `cached_timestamp()` amortises the clock syscall across a burst of calls
/// (a matching pass that emits many matches), refreshing the shared cache
/// every `REFRESH_INTERVAL` calls per thread.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TIMESTAMP_CACHE: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static CALLS_SINCE_REFRESH: std::cell::Cell<u32> = const { std::cell::Cell::new(u32::MAX) };
}

const REFRESH_INTERVAL: u32 = 64;

/// Current time in nanoseconds, straight from the system clock
#[inline]
pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Current time in nanoseconds, possibly up to `REFRESH_INTERVAL` calls stale
///
/// Never goes backwards relative to earlier values returned to any thread.
#[inline]
pub fn cached_timestamp() -> u64 {
    CALLS_SINCE_REFRESH.with(|calls| {
        let count = calls.get();
        if count >= REFRESH_INTERVAL {
            calls.set(0);
            refresh()
        } else {
            calls.set(count + 1);
            TIMESTAMP_CACHE.load(Ordering::Acquire)
        }
    })
}

/// Forces the cache to the current time and returns it
pub fn refresh() -> u64 {
    let now = now_nanos();
    // fetch_max keeps the cache monotonic when threads race on refresh
    let previous = TIMESTAMP_CACHE.fetch_max(now, Ordering::AcqRel);
    previous.max(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_now_nanos_advances() {
        let t1 = now_nanos();
        thread::sleep(Duration::from_millis(1));
        let t2 = now_nanos();
        assert!(t2 > t1);
    }

    #[test]
    fn test_first_cached_call_is_fresh() {
        thread::spawn(|| {
            let before = now_nanos();
            let cached = cached_timestamp();
            assert!(cached >= before);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_cached_timestamp_is_monotonic_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    let mut seen = Vec::with_capacity(500);
                    for _ in 0..500 {
                        seen.push(cached_timestamp());
                    }
                    seen
                })
            })
            .collect();

        for handle in handles {
            let seen = handle.join().unwrap();
            assert!(seen.windows(2).all(|w| w[1] >= w[0]));
        }
    }
}
