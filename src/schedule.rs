//! Frame-deferred, coalesced scheduling of reflow passes.
//!
//! A change notification doesn't run the engine inline: the rendering
//! backend needs to commit the new layout before anything can be measured.
//! Instead a pass is armed to run after a number of frames (two by default,
//! so the frame that applies the mutation and the one that lays it out have
//! both passed). A newer request replaces a pending one.

/// At most one pending pass, counted down in frames.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    delay: u8,
    pending: Option<u8>,
    coalesced: u64,
}

impl FrameScheduler {
    /// A delay of 0 behaves like 1: a pass never runs inside the request.
    pub fn new(delay: u8) -> Self {
        Self {
            delay: delay.max(1),
            pending: None,
            coalesced: 0,
        }
    }

    /// Arm a pass `delay` frames from now. Returns true if this replaced a
    /// pass that hadn't run yet.
    pub fn request(&mut self) -> bool {
        let replaced = self.pending.replace(self.delay).is_some();
        if replaced {
            self.coalesced += 1;
        }
        replaced
    }

    /// Advance one frame. Returns true when the pending pass is due; it is
    /// consumed in the same call.
    pub fn tick(&mut self) -> bool {
        match self.pending {
            Some(left) if left <= 1 => {
                self.pending = None;
                true
            }
            Some(left) => {
                self.pending = Some(left - 1);
                false
            }
            None => false,
        }
    }

    /// Drop the pending pass, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many requests were folded into a later one.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
