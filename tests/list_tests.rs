use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chart_scene::core::{
    Dispose, Disposer, List, ListAutoDispose, ListEvent, ListEventKind, ListTemplate,
    SettingKey, Template,
};

fn record_events(list: &List<i32>) -> (Rc<RefCell<Vec<ListEventKind>>>, Disposer) {
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let tracked = Rc::clone(&kinds);
    let subscription = list.observe(move |event| tracked.borrow_mut().push(event.kind()));
    (kinds, subscription)
}

#[test]
fn every_mutation_emits_exactly_one_event() {
    let mut list = List::new();
    let (kinds, _subscription) = record_events(&list);

    list.push(1);
    list.insert_index(0, 2);
    list.set_index(1, 3);
    list.remove_index(0);
    list.move_value(&3, 0);
    list.clear();

    assert_eq!(
        *kinds.borrow(),
        vec![
            ListEventKind::Push,
            ListEventKind::InsertIndex,
            ListEventKind::SetIndex,
            ListEventKind::RemoveIndex,
            ListEventKind::Clear,
        ]
    );
}

#[test]
fn move_value_emits_move_with_both_indexes() {
    let mut list = List::new();
    list.push(10);
    list.push(20);
    list.push(30);

    let seen = Rc::new(RefCell::new(None));
    let tracked = Rc::clone(&seen);
    let _subscription = list.observe(move |event| {
        *tracked.borrow_mut() = Some(event.clone());
    });

    list.move_value(&30, 0);
    assert_eq!(list.as_slice(), &[30, 10, 20]);
    assert_eq!(
        *seen.borrow(),
        Some(ListEvent::MoveIndex {
            old_index: 2,
            new_index: 0,
            value: 30,
        })
    );
}

#[test]
fn move_value_in_place_is_a_noop() {
    let mut list = List::new();
    list.push(1);
    list.push(2);
    let (kinds, _subscription) = record_events(&list);

    list.move_value(&2, 1);
    list.move_value(&99, 0);

    assert!(kinds.borrow().is_empty());
}

#[test]
fn clear_emits_single_event_with_old_values() {
    let mut list = List::new();
    list.push(1);
    list.push(2);
    list.push(3);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let tracked = Rc::clone(&seen);
    let _subscription = list.observe(move |event| tracked.borrow_mut().push(event.clone()));

    list.clear();
    assert!(list.is_empty());
    assert_eq!(
        *seen.borrow(),
        vec![ListEvent::Clear {
            old_values: vec![1, 2, 3]
        }]
    );

    // Clearing an empty list emits nothing.
    list.clear();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn disposed_observer_stops_receiving_events() {
    let mut list = List::new();
    let (kinds, subscription) = record_events(&list);

    list.push(1);
    subscription.dispose();
    list.push(2);

    assert_eq!(*kinds.borrow(), vec![ListEventKind::Push]);
}

#[test]
#[should_panic]
fn out_of_range_remove_panics() {
    let mut list: List<i32> = List::new();
    list.remove_index(0);
}

#[derive(Clone)]
struct Tracked {
    disposed: Rc<Cell<bool>>,
}

impl Tracked {
    fn new() -> Self {
        Self {
            disposed: Rc::new(Cell::new(false)),
        }
    }
}

impl Dispose for Tracked {
    fn dispose(&mut self) {
        self.disposed.set(true);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

#[test]
fn auto_dispose_list_disposes_removed_and_replaced_values() {
    let mut list = ListAutoDispose::new();
    let first = Tracked::new();
    let second = Tracked::new();
    let replacement = Tracked::new();
    list.push(first.clone());
    list.push(second.clone());

    list.set_index(0, replacement.clone());
    assert!(first.is_disposed());
    assert!(!replacement.is_disposed());

    list.remove_index(1);
    assert!(second.is_disposed());
}

#[test]
fn auto_dispose_list_disposes_remainder_on_drop() {
    let survivor = Tracked::new();
    {
        let mut list = ListAutoDispose::new();
        list.push(survivor.clone());
    }
    assert!(survivor.is_disposed());
}

#[test]
fn auto_dispose_clear_disposes_everything() {
    let mut list = ListAutoDispose::new();
    let values: Vec<Tracked> = (0..4).map(|_| Tracked::new()).collect();
    for value in &values {
        list.push(value.clone());
    }

    list.clear();
    assert!(values.iter().all(Tracked::is_disposed));
    assert!(list.is_empty());
}

#[test]
fn list_template_instances_share_the_template() {
    let template = Template::new();
    template.set(SettingKey::FontSize, 11.0);

    let mut made: ListTemplate<u64, ()> =
        ListTemplate::new(template.clone(), |_, template| template.revision());

    let first = made.make(&mut ());
    template.set(SettingKey::FontSize, 13.0);
    let second = made.make(&mut ());

    // Both instances observed the same shared template, at different
    // revisions.
    assert!(second > first);
    made.push(first);
    made.push(second);
    assert_eq!(made.list().len(), 2);
}
