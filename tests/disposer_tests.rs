use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chart_scene::core::{Disposer, DisposerBin, MultiDisposer};

#[test]
fn disposer_runs_action_exactly_once() {
    let count = Rc::new(Cell::new(0));
    let tracked = Rc::clone(&count);
    let disposer = Disposer::new(move || tracked.set(tracked.get() + 1));

    assert!(!disposer.is_disposed());
    disposer.dispose();
    disposer.dispose();
    disposer.dispose();

    assert!(disposer.is_disposed());
    assert_eq!(count.get(), 1);
}

#[test]
fn empty_disposer_starts_disposed() {
    let disposer = Disposer::empty();
    assert!(disposer.is_disposed());
    disposer.dispose();
    assert!(disposer.is_disposed());
}

#[test]
fn multi_disposer_disposes_every_item() {
    let count = Rc::new(Cell::new(0));
    let items: Vec<Disposer> = (0..3)
        .map(|_| {
            let tracked = Rc::clone(&count);
            Disposer::new(move || tracked.set(tracked.get() + 1))
        })
        .collect();
    let multi = MultiDisposer::new(items);

    assert!(!multi.is_disposed());
    multi.dispose();
    assert!(multi.is_disposed());
    assert_eq!(count.get(), 3);

    multi.dispose();
    assert_eq!(count.get(), 3);
}

#[test]
fn bin_runs_disposers_in_reverse_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let bin = DisposerBin::new();
    for label in ["first", "second", "third"] {
        let tracked = Rc::clone(&order);
        bin.defer(move || tracked.borrow_mut().push(label));
    }

    bin.dispose_all();

    assert_eq!(*order.borrow(), vec!["third", "second", "first"]);
    assert!(bin.is_disposed());
}

#[test]
fn bin_add_after_dispose_runs_immediately() {
    let bin = DisposerBin::new();
    bin.dispose_all();

    let ran = Rc::new(Cell::new(false));
    let tracked = Rc::clone(&ran);
    bin.add(Disposer::new(move || tracked.set(true)));

    assert!(ran.get());
    assert!(bin.is_empty());
}

#[test]
fn bin_dispose_is_reentrancy_safe() {
    let count = Rc::new(Cell::new(0));
    let bin = Rc::new(DisposerBin::new());

    {
        let tracked = Rc::clone(&count);
        bin.defer(move || tracked.set(tracked.get() + 1));
    }
    {
        // Disposing the bin from inside one of its own disposers must not
        // rerun anything.
        let inner_bin = Rc::clone(&bin);
        let tracked = Rc::clone(&count);
        bin.defer(move || {
            tracked.set(tracked.get() + 1);
            inner_bin.dispose_all();
        });
    }

    bin.dispose_all();
    assert_eq!(count.get(), 2);
    assert!(bin.is_disposed());
}

#[test]
fn bin_disposer_registered_during_dispose_still_runs() {
    let count = Rc::new(Cell::new(0));
    let bin = Rc::new(DisposerBin::new());

    let inner_bin = Rc::clone(&bin);
    let tracked = Rc::clone(&count);
    bin.defer(move || {
        let late = Rc::clone(&tracked);
        inner_bin.add(Disposer::new(move || late.set(late.get() + 10)));
        tracked.set(tracked.get() + 1);
    });

    bin.dispose_all();
    assert_eq!(count.get(), 11);
}
