use std::cell::{Cell, RefCell};

use smallvec::SmallVec;

/// Values that release owned resources exactly once.
pub trait Dispose {
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Single deferred teardown action.
///
/// Disposal is explicit and idempotent. A `Disposer` does not run its action
/// on drop; teardown timing stays under the owner's control.
pub struct Disposer {
    action: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Disposer {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: RefCell::new(Some(Box::new(action))),
        }
    }

    /// A disposer with no action, already in the disposed state.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            action: RefCell::new(None),
        }
    }

    pub fn dispose(&self) {
        // Take the action out before running it so a re-entrant dispose
        // observes the disposed state and no-ops.
        let action = self.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.action.borrow().is_none()
    }
}

impl Dispose for Disposer {
    fn dispose(&mut self) {
        Disposer::dispose(self);
    }

    fn is_disposed(&self) -> bool {
        Disposer::is_disposed(self)
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Aggregates several disposers behind one handle.
#[derive(Debug)]
pub struct MultiDisposer {
    items: SmallVec<[Disposer; 4]>,
}

impl MultiDisposer {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = Disposer>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn dispose(&self) {
        for item in &self.items {
            item.dispose();
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.items.iter().all(Disposer::is_disposed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinState {
    Live,
    Disposing,
    Disposed,
}

/// Scoped collection of disposers run in reverse registration order.
///
/// Every registered disposer runs exactly once, even when `dispose_all` is
/// re-entered from within one of the running disposers.
pub struct DisposerBin {
    items: RefCell<Vec<Disposer>>,
    state: Cell<BinState>,
}

impl DisposerBin {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            state: Cell::new(BinState::Live),
        }
    }

    /// Registers a disposer. Adding to an already-disposed bin runs the
    /// disposer immediately.
    pub fn add(&self, disposer: Disposer) {
        if self.state.get() == BinState::Live {
            self.items.borrow_mut().push(disposer);
        } else {
            disposer.dispose();
        }
    }

    pub fn defer(&self, action: impl FnOnce() + 'static) {
        self.add(Disposer::new(action));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn dispose_all(&self) {
        if self.state.get() != BinState::Live {
            return;
        }
        self.state.set(BinState::Disposing);

        loop {
            let next = self.items.borrow_mut().pop();
            match next {
                Some(disposer) => disposer.dispose(),
                None => break,
            }
        }

        self.state.set(BinState::Disposed);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.get() == BinState::Disposed
    }
}

impl Default for DisposerBin {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DisposerBin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposerBin")
            .field("len", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
