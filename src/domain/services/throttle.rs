#[cfg(test)]
#[path = "throttle_test.rs"]
mod tests;

use std::collections::VecDeque;

use crate::domain::models::GenerationTask;
use crate::domain::models::StudioError;
use crate::domain::models::Tier;

#[derive(Debug)]
pub enum Admission {
    /// The request owns the active slot and should be submitted now.
    Started(GenerationTask),
    /// The request joined the queue at the given position (1-based).
    Queued(usize),
}

/// Bounds how many portrait requests a session may have in flight, and
/// serializes them: one request runs at a time, the rest wait in FIFO
/// order. The tier limit caps active plus queued together; a request that
/// would push past it is rejected, never queued.
///
/// Higher tiers deliberately buy queue depth rather than parallel
/// generations, mirroring the platform's server-side capacity policy.
pub struct Throttle {
    tier: Tier,
    active: usize,
    queued: VecDeque<GenerationTask>,
}

impl Throttle {
    pub fn new(tier: Tier) -> Throttle {
        return Throttle {
            tier,
            active: 0,
            queued: VecDeque::new(),
        };
    }

    pub fn tier(&self) -> Tier {
        return self.tier;
    }

    pub fn in_flight(&self) -> usize {
        return self.active + self.queued.len();
    }

    pub fn admit(&mut self, task: GenerationTask) -> Result<Admission, StudioError> {
        if self.in_flight() >= self.tier.limit() {
            return Err(StudioError::QueueFull {
                tier: self.tier,
                limit: self.tier.limit(),
            });
        }

        if self.active == 0 {
            self.active = 1;
            return Ok(Admission::Started(task));
        }

        self.queued.push_back(task);
        return Ok(Admission::Queued(self.queued.len()));
    }

    /// Releases the active slot after a terminal outcome. When the queue is
    /// non-empty the head immediately re-occupies the slot, so admissions
    /// arriving during the drain delay observe it as taken.
    pub fn complete(&mut self) -> Option<GenerationTask> {
        self.active = 0;

        let next = self.queued.pop_front();
        if next.is_some() {
            self.active = 1;
        }

        return next;
    }
}
