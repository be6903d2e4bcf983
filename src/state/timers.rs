//! Timer System - Virtual clock for component timeouts
//!
//! Toast lifespans and deferred tooltip teardown run on a virtual clock
//! instead of wall time. The embedding application drives it by calling
//! [`advance`] from its own loop (or a test does it by hand), which keeps
//! every timeout deterministic and on the UI thread.
//!
//! Timers can be paused and resumed; a paused timer keeps its remaining time
//! and does not fire while paused.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use cosmos_elements::state::timers;
//!
//! let id = timers::set_timeout(Duration::from_secs(5), || println!("expired"));
//! timers::pause(id);
//! timers::advance(Duration::from_secs(10)); // nothing happens
//! timers::resume(id);
//! timers::advance(Duration::from_secs(5));  // prints "expired"
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use tracing::trace;

/// Handle returned by [`set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

type TimerCallback = Box<dyn FnOnce()>;

enum Schedule {
    /// Fires when the clock reaches this instant.
    Running(Duration),
    /// Time left when paused.
    Paused(Duration),
}

struct Timer {
    schedule: Schedule,
    callback: TimerCallback,
}

struct Clock {
    now: Duration,
    timers: BTreeMap<TimerId, Timer>,
    next_id: u64,
}

impl Clock {
    fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Earliest running timer due at or before `limit`. Ties go to the
    /// timer scheduled first.
    fn next_due(&self, limit: Duration) -> Option<(TimerId, Duration)> {
        self.timers
            .iter()
            .filter_map(|(id, timer)| match timer.schedule {
                Schedule::Running(at) if at <= limit => Some((*id, at)),
                _ => None,
            })
            .min_by_key(|(id, at)| (*at, *id))
    }
}

thread_local! {
    static CLOCK: RefCell<Clock> = RefCell::new(Clock::new());
}

// =============================================================================
// Public API
// =============================================================================

/// Current virtual time.
pub fn now() -> Duration {
    CLOCK.with(|c| c.borrow().now)
}

/// Run `callback` once after `delay` of virtual time.
pub fn set_timeout(delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
    CLOCK.with(|c| {
        let mut clock = c.borrow_mut();
        let id = TimerId(clock.next_id);
        clock.next_id += 1;
        let at = clock.now + delay;
        clock.timers.insert(
            id,
            Timer {
                schedule: Schedule::Running(at),
                callback: Box::new(callback),
            },
        );
        id
    })
}

/// Cancel a pending timer. Returns false if it already fired or never
/// existed.
pub fn clear_timeout(id: TimerId) -> bool {
    CLOCK.with(|c| c.borrow_mut().timers.remove(&id).is_some())
}

pub fn is_pending(id: TimerId) -> bool {
    CLOCK.with(|c| c.borrow().timers.contains_key(&id))
}

pub fn is_paused(id: TimerId) -> bool {
    CLOCK.with(|c| {
        matches!(
            c.borrow().timers.get(&id).map(|t| &t.schedule),
            Some(Schedule::Paused(_))
        )
    })
}

/// Freeze a timer, keeping its remaining time.
pub fn pause(id: TimerId) {
    CLOCK.with(|c| {
        let mut clock = c.borrow_mut();
        let now = clock.now;
        if let Some(timer) = clock.timers.get_mut(&id) {
            if let Schedule::Running(at) = timer.schedule {
                timer.schedule = Schedule::Paused(at.saturating_sub(now));
            }
        }
    });
}

/// Continue a paused timer from where it stopped.
pub fn resume(id: TimerId) {
    CLOCK.with(|c| {
        let mut clock = c.borrow_mut();
        let now = clock.now;
        if let Some(timer) = clock.timers.get_mut(&id) {
            if let Schedule::Paused(left) = timer.schedule {
                timer.schedule = Schedule::Running(now + left);
            }
        }
    });
}

/// Time left before a timer fires.
pub fn remaining(id: TimerId) -> Option<Duration> {
    CLOCK.with(|c| {
        let clock = c.borrow();
        clock.timers.get(&id).map(|timer| match timer.schedule {
            Schedule::Running(at) => at.saturating_sub(clock.now),
            Schedule::Paused(left) => left,
        })
    })
}

/// Move the clock forward, firing every timer that comes due, in order.
///
/// Callbacks run with the clock set to their due time and may schedule
/// further timers; those fire too if they fall inside the window.
/// Returns how many callbacks ran.
pub fn advance(by: Duration) -> usize {
    let target = now() + by;
    let mut fired = 0;

    loop {
        let due = CLOCK.with(|c| {
            let mut clock = c.borrow_mut();
            let (id, at) = clock.next_due(target)?;
            let timer = clock.timers.remove(&id)?;
            clock.now = at;
            Some((id, timer.callback))
        });
        let Some((id, callback)) = due else {
            break;
        };
        trace!(?id, "timer fired");
        callback();
        fired += 1;
    }

    CLOCK.with(|c| c.borrow_mut().now = target);
    fired
}

/// Number of timers not yet fired or cleared.
pub fn pending_count() -> usize {
    CLOCK.with(|c| c.borrow().timers.len())
}

/// Drop every timer and rewind the clock (for testing).
pub fn reset_timers() {
    CLOCK.with(|c| *c.borrow_mut() = Clock::new());
}

// =============================================================================
// Tests
// =============================================================================
