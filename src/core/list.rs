use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::disposer::{Dispose, Disposer};
use crate::core::settings::Template;

/// Closed set of structural change kinds a list can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListEventKind {
    Push,
    InsertIndex,
    SetIndex,
    RemoveIndex,
    MoveIndex,
    Clear,
}

/// One structural change, emitted synchronously per mutation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent<T> {
    Push { index: usize, new_value: T },
    InsertIndex { index: usize, new_value: T },
    SetIndex { index: usize, old_value: T, new_value: T },
    RemoveIndex { index: usize, old_value: T },
    MoveIndex { old_index: usize, new_index: usize, value: T },
    Clear { old_values: Vec<T> },
}

impl<T> ListEvent<T> {
    #[must_use]
    pub fn kind(&self) -> ListEventKind {
        match self {
            ListEvent::Push { .. } => ListEventKind::Push,
            ListEvent::InsertIndex { .. } => ListEventKind::InsertIndex,
            ListEvent::SetIndex { .. } => ListEventKind::SetIndex,
            ListEvent::RemoveIndex { .. } => ListEventKind::RemoveIndex,
            ListEvent::MoveIndex { .. } => ListEventKind::MoveIndex,
            ListEvent::Clear { .. } => ListEventKind::Clear,
        }
    }
}

type ObserverCallback<T> = Rc<RefCell<dyn FnMut(&ListEvent<T>)>>;

struct ObserverEntry<T> {
    active: Rc<Cell<bool>>,
    callback: ObserverCallback<T>,
}

/// Ordered, observable collection. Insertion order is meaningful: it is both
/// z-order and layout order for scene children.
///
/// Out-of-range indexes are programming errors and panic, matching `Vec`.
/// Disposal of removed values is the caller's concern; see
/// [`ListAutoDispose`] for the owning flavor.
pub struct List<T: Clone> {
    values: Vec<T>,
    observers: RefCell<Vec<ObserverEntry<T>>>,
}

impl<T: Clone> List<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            observers: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn push(&mut self, value: T) {
        let index = self.values.len();
        self.values.push(value.clone());
        self.emit(&ListEvent::Push {
            index,
            new_value: value,
        });
    }

    pub fn insert_index(&mut self, index: usize, value: T) {
        self.values.insert(index, value.clone());
        self.emit(&ListEvent::InsertIndex {
            index,
            new_value: value,
        });
    }

    pub fn set_index(&mut self, index: usize, value: T) -> T {
        let old_value = std::mem::replace(&mut self.values[index], value.clone());
        self.emit(&ListEvent::SetIndex {
            index,
            old_value: old_value.clone(),
            new_value: value,
        });
        old_value
    }

    pub fn remove_index(&mut self, index: usize) -> T {
        let old_value = self.values.remove(index);
        self.emit(&ListEvent::RemoveIndex {
            index,
            old_value: old_value.clone(),
        });
        old_value
    }

    /// Clears all values, emitting a single `Clear` event (not N removes).
    pub fn clear(&mut self) {
        if self.values.is_empty() {
            return;
        }
        let old_values = std::mem::take(&mut self.values);
        self.emit(&ListEvent::Clear { old_values });
    }

    pub fn observe(&self, callback: impl FnMut(&ListEvent<T>) + 'static) -> Disposer {
        let active = Rc::new(Cell::new(true));
        self.observers.borrow_mut().push(ObserverEntry {
            active: Rc::clone(&active),
            callback: Rc::new(RefCell::new(callback)),
        });
        Disposer::new(move || active.set(false))
    }

    fn emit(&self, event: &ListEvent<T>) {
        self.observers
            .borrow_mut()
            .retain(|entry| entry.active.get());
        let callbacks: Vec<ObserverCallback<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in callbacks {
            (callback.borrow_mut())(event);
        }
    }
}

impl<T: Clone + PartialEq> List<T> {
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }

    /// Moves an existing value to `new_index`, emitting one `MoveIndex`
    /// event. No-ops when the value is absent or already in place.
    pub fn move_value(&mut self, value: &T, new_index: usize) {
        let Some(old_index) = self.index_of(value) else {
            return;
        };
        if old_index == new_index {
            return;
        }
        let moved = self.values.remove(old_index);
        self.values.insert(new_index, moved.clone());
        self.emit(&ListEvent::MoveIndex {
            old_index,
            new_index,
            value: moved,
        });
    }
}

impl<T: Clone> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for List<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

/// List flavor that owns its values: removed, replaced and cleared values
/// are disposed automatically, and so is the remainder on drop.
pub struct ListAutoDispose<T: Clone + Dispose> {
    list: List<T>,
}

impl<T: Clone + Dispose> ListAutoDispose<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { list: List::new() }
    }

    #[must_use]
    pub fn list(&self) -> &List<T> {
        &self.list
    }

    pub fn push(&mut self, value: T) {
        self.list.push(value);
    }

    pub fn insert_index(&mut self, index: usize, value: T) {
        self.list.insert_index(index, value);
    }

    pub fn set_index(&mut self, index: usize, value: T) {
        let mut old = self.list.set_index(index, value);
        old.dispose();
    }

    pub fn remove_index(&mut self, index: usize) {
        let mut old = self.list.remove_index(index);
        old.dispose();
    }

    pub fn clear(&mut self) {
        let mut removed: Vec<T> = self.list.as_slice().to_vec();
        self.list.clear();
        for value in &mut removed {
            value.dispose();
        }
    }

    pub fn observe(&self, callback: impl FnMut(&ListEvent<T>) + 'static) -> Disposer {
        self.list.observe(callback)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<T: Clone + Dispose> Default for ListAutoDispose<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Dispose> Drop for ListAutoDispose<T> {
    fn drop(&mut self) {
        for value in &mut self.list.values {
            if !value.is_disposed() {
                value.dispose();
            }
        }
    }
}

/// List paired with a shared settings [`Template`] and a factory.
///
/// `make` builds a new instance pre-wired to the template; the caller
/// decides placement. `C` is the construction context the factory needs
/// (the scene root for pooled visual elements, `()` in plain usage).
pub struct ListTemplate<T: Clone, C> {
    template: Template,
    factory: Rc<dyn Fn(&mut C, &Template) -> T>,
    list: List<T>,
}

impl<T: Clone, C> ListTemplate<T, C> {
    pub fn new(template: Template, factory: impl Fn(&mut C, &Template) -> T + 'static) -> Self {
        Self {
            template,
            factory: Rc::new(factory),
            list: List::new(),
        }
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Builds a new instance from the shared template. The instance is not
    /// inserted into the list; push it (or insert it) explicitly.
    pub fn make(&self, context: &mut C) -> T {
        (self.factory)(context, &self.template)
    }

    #[must_use]
    pub fn list(&self) -> &List<T> {
        &self.list
    }

    #[must_use]
    pub fn list_mut(&mut self) -> &mut List<T> {
        &mut self.list
    }

    pub fn push(&mut self, value: T) {
        self.list.push(value);
    }
}

impl<T: Clone, C> std::fmt::Debug for ListTemplate<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListTemplate")
            .field("len", &self.list.len())
            .field("template", &self.template)
            .finish()
    }
}
