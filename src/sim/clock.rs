/// Tick scheduler: one-shot timers polled by the frame loop.
///
/// The frame loop owns the only clock. Each fired tick schedules the next
/// one `speed_ms` later; pause and restart cancel whatever is outstanding
/// so two tick chains never run side by side.

use std::time::{Duration, Instant};

/// Identifies one scheduled tick. Handles are never reused.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TickHandle(u64);

#[derive(Debug, Default)]
pub struct TickClock {
    pending: Vec<(TickHandle, Instant)>,
    next_id: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` after `now`.
    pub fn schedule_once(&mut self, now: Instant, delay: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, now + delay));
        handle
    }

    /// Drop a scheduled tick. Cancelling a fired or unknown handle is a no-op.
    pub fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Pop the earliest tick that is due at `now`, if any.
    pub fn poll(&mut self, now: Instant) -> Option<TickHandle> {
        let idx = self.pending
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= now)
            .min_by_key(|(_, (_, due))| *due)
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx).0)
    }
}
