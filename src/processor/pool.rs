//! Id-keyed reuse pool for per-step computation structures.

use std::collections::BTreeSet;

use tracing::trace;

/// Pool of reusable items identified by sequential ids.
///
/// Items are created on demand by a factory and never destroyed. Released ids
/// become available again; a reused item keeps whatever state it had, so
/// callers must overwrite the transient state they read.
///
/// # Example
///
/// ```
/// use neural_core::processor::StructurePool;
///
/// let mut pool = StructurePool::new(|id| vec![id; 3]);
/// let a = pool.get_item();
/// let b = pool.get_item();
/// assert_eq!((a, b), (0, 1));
///
/// pool.release_all();
/// assert_eq!(pool.usage(), 0);
/// assert_eq!(pool.get_item(), 0);
/// assert_eq!(pool.size(), 2);
/// ```
pub struct StructurePool<T> {
    items: Vec<T>,
    available: BTreeSet<usize>,
    factory: Box<dyn FnMut(usize) -> T>,
}

impl<T> StructurePool<T> {
    /// Creates an empty pool. `factory` receives the id of the item to build.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut(usize) -> T + 'static,
    {
        Self {
            items: Vec::new(),
            available: BTreeSet::new(),
            factory: Box::new(factory),
        }
    }

    /// Acquires an item and returns its id.
    ///
    /// Reuses the smallest released id if there is one, otherwise builds a
    /// new item with the next sequential id.
    pub fn get_item(&mut self) -> usize {
        if let Some(id) = self.available.pop_first() {
            return id;
        }
        let id = self.items.len();
        self.items.push((self.factory)(id));
        trace!(size = self.items.len(), "Structure pool grew");
        id
    }

    /// Returns an item to the pool.
    ///
    /// # Panics
    ///
    /// Panics if the id is unknown or already available.
    pub fn release_item(&mut self, id: usize) {
        assert!(id < self.items.len(), "Unknown pool item {}", id);
        assert!(
            self.available.insert(id),
            "Pool item {} was already released",
            id
        );
    }

    pub fn release_all(&mut self) {
        self.available.extend(0..self.items.len());
    }

    /// Number of items ever created.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Number of items currently acquired.
    pub fn usage(&self) -> usize {
        self.items.len() - self.available.len()
    }

    pub fn item(&self, id: usize) -> &T {
        &self.items[id]
    }

    pub fn item_mut(&mut self, id: usize) -> &mut T {
        &mut self.items[id]
    }

    /// Mutable access to one item together with shared access to up to two others.
    ///
    /// # Panics
    ///
    /// Panics if an id is out of range or a neighbour id equals `id`.
    pub fn with_neighbours(
        &mut self,
        id: usize,
        prev: Option<usize>,
        next: Option<usize>,
    ) -> (&mut T, Option<&T>, Option<&T>) {
        assert!(id < self.items.len(), "Unknown pool item {}", id);
        let (before, rest) = self.items.split_at_mut(id);
        let (current, after) = rest.split_at_mut(1);
        let (before, after): (&[T], &[T]) = (before, after);

        (
            &mut current[0],
            neighbour(before, after, id, prev),
            neighbour(before, after, id, next),
        )
    }
}

fn neighbour<'a, T>(before: &'a [T], after: &'a [T], id: usize, other: Option<usize>) -> Option<&'a T> {
    other.map(|other| {
        assert_ne!(other, id, "An item cannot be its own neighbour");
        if other < id {
            &before[other]
        } else {
            &after[other - id - 1]
        }
    })
}
