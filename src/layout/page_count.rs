//! Page count publication.
//!
//! The page-background overlay draws one page rectangle per count and the
//! header/footer layer repeats per page; both subscribe here.

use std::fmt;

/// Handle returned by [`PageCountReporter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Holds the last published page count and notifies subscribers when it
/// changes.
pub struct PageCountReporter {
    count: usize,
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(usize)>)>,
}

impl fmt::Debug for PageCountReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCountReporter")
            .field("count", &self.count)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for PageCountReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCountReporter {
    pub fn new() -> Self {
        Self {
            count: 1,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// The last published count. Never below 1.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn subscribe(&mut self, listener: impl FnMut(usize) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` wasn't subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    /// Publish a new count. Listeners only hear about actual changes.
    pub fn publish(&mut self, count: usize) -> bool {
        let count = count.max(1);
        if count == self.count {
            return false;
        }
        self.count = count;
        for (_, listener) in &mut self.listeners {
            listener(count);
        }
        true
    }
}
