//! Specialized collection types
//!
//! [`DeferredCollection`] keeps an ordered list of handles whose structural
//! changes are buffered and only applied at flush boundaries. Code running
//! inside a traversal can therefore add or remove elements of the very
//! collection being walked without invalidating the walk.
//!
//! ## Flush boundaries
//!
//! A traversal ([`DeferredCollection::for_each`] or
//! [`DeferredCollection::try_for_each`]) does, in order:
//!
//! 1. append the pending-add queue to the live sequence
//! 2. drop every live element found in the pending-remove set
//! 3. visit the live sequence in order, skipping elements removed meanwhile
//! 4. drop the elements removed during step 3
//!
//! Elements added during step 3 are only visible from the next traversal.

use std::collections::HashSet;
use std::convert::Infallible;
use std::hash::Hash;

/// Ordered handle list with buffered add/remove
///
/// Elements are small `Copy` handles; identity is handle equality. Adding the
/// same handle twice stores it twice, while a single removal request drops
/// every copy at the next flush.
#[derive(Debug, Clone)]
pub struct DeferredCollection<T> {
    items: Vec<T>,
    add_queue: Vec<T>,
    remove_set: HashSet<T>,
    evicted: Vec<T>,
    traversing: bool,
}

impl<T> Default for DeferredCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            add_queue: Vec::new(),
            remove_set: HashSet::new(),
            evicted: Vec::new(),
            traversing: false,
        }
    }
}

impl<T: Copy + Eq + Hash> DeferredCollection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with room for `capacity` live elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Queue `item` for insertion at the next flush boundary
    pub fn add(&mut self, item: T) {
        self.add_queue.push(item);
    }

    /// Queue `item` for removal
    ///
    /// A live element is skipped by any traversal in progress and dropped at
    /// the next flush. A queued element never becomes live. Unknown elements
    /// are ignored.
    pub fn remove(&mut self, item: T) {
        self.remove_set.insert(item);
    }

    /// True when nothing is live and nothing is waiting to be added
    pub fn is_empty(&self) -> bool {
        self.add_queue.is_empty() && self.items.is_empty()
    }

    /// Number of live elements, including ones pending removal
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of queued additions
    pub fn pending_adds(&self) -> usize {
        self.add_queue.len()
    }

    /// Number of queued removals
    pub fn pending_removals(&self) -> usize {
        self.remove_set.len()
    }

    /// Whether `item` has a removal request outstanding
    pub fn is_pending_removal(&self, item: &T) -> bool {
        self.remove_set.contains(item)
    }

    /// Whether `item` is live and not marked for removal
    pub fn contains(&self, item: &T) -> bool {
        !self.remove_set.contains(item) && self.items.contains(item)
    }

    /// Iterate the live sequence as of the last flush
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Iterate queued additions in the order they were added
    pub fn queued(&self) -> impl Iterator<Item = &T> {
        self.add_queue.iter()
    }

    /// Apply only the removal set outside of a traversal
    ///
    /// Queued additions stay queued unless a removal cancels them.
    pub fn apply_removals(&mut self) {
        if self.traversing {
            log::warn!("DeferredCollection::apply_removals called during traversal; deferred to traversal end");
            return;
        }
        self.flush_removals();
    }

    /// Whether a traversal is currently running
    pub fn is_traversing(&self) -> bool {
        self.traversing
    }

    /// Apply both queues outside of a traversal
    ///
    /// Ignored while a traversal is running; the traversal flushes on exit.
    pub fn flush(&mut self) {
        if self.traversing {
            log::warn!("DeferredCollection::flush called during traversal; deferred to traversal end");
            return;
        }
        self.flush_adds();
        self.flush_removals();
    }

    /// Take the elements dropped by flushes since the last call
    ///
    /// Owners use this to release storage keyed by the evicted handles.
    pub fn drain_evicted(&mut self) -> std::vec::Drain<'_, T> {
        self.evicted.drain(..)
    }

    /// Flush, then call `f` on every live element not marked for removal
    ///
    /// `f` receives the collection itself so it may queue further additions
    /// and removals.
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(T, &mut Self),
    {
        let result = self.try_for_each(|item, collection| {
            f(item, collection);
            Ok::<(), Infallible>(())
        });
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Fallible [`DeferredCollection::for_each`]
    ///
    /// The first error stops the walk. Removals requested before the error
    /// are still flushed before it is returned.
    ///
    /// A traversal started from inside another one visits the live sequence
    /// without flushing; the outermost traversal owns the flush boundaries.
    pub fn try_for_each<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(T, &mut Self) -> Result<(), E>,
    {
        let nested = self.traversing;
        if !nested {
            self.flush_adds();
            self.flush_removals();
            self.traversing = true;
        }

        let mut result = Ok(());
        let mut index = 0;
        while index < self.items.len() {
            let item = self.items[index];
            index += 1;
            if self.remove_set.contains(&item) {
                continue;
            }
            if let Err(error) = f(item, self) {
                result = Err(error);
                break;
            }
        }

        if !nested {
            self.traversing = false;
            self.flush_removals();
        }
        result
    }

    fn flush_adds(&mut self) {
        if !self.add_queue.is_empty() {
            self.items.append(&mut self.add_queue);
        }
    }

    fn flush_removals(&mut self) {
        if self.remove_set.is_empty() {
            return;
        }
        let remove_set = &self.remove_set;
        let evicted = &mut self.evicted;
        let mut keep = |item: &T| {
            if remove_set.contains(item) {
                evicted.push(*item);
                false
            } else {
                true
            }
        };
        self.items.retain(&mut keep);
        // Additions queued during a traversal can be cancelled before they go live
        self.add_queue.retain(&mut keep);
        self.remove_set.clear();
    }
}
