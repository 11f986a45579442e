//! Cross-cutting list engine scenarios: operation sequences observed through
//! full traversals, pool capacity shared across lists, and header recycling.

use peer_talk::arena::{Arena, Cursor, ListId};
use peer_talk::list::Matcher;

/// Walks the whole list with the cursor protocol (head, then successors)
/// and collects every item.
fn traverse(arena: &mut Arena<String>, list: ListId) -> Vec<String> {
    let mut items = Vec::new();
    if let Some(first) = arena.move_to_front(list) {
        items.push(first.clone());
        while let Some(next) = arena.move_next(list) {
            items.push(next.clone());
        }
    }
    items
}

#[test]
fn traversal_reflects_mixed_insertions() {
    let mut arena: Arena<String> = Arena::new(1, 16);
    let list = arena.create_list().expect("list");

    arena.push_back(list, "c".into()).unwrap();
    arena.push_front(list, "a".into()).unwrap();
    // Cursor is on "a"; insert directly after it.
    arena.insert_after(list, "b".into()).unwrap();
    // Cursor is on "b"; jump to the back and append past the tail.
    arena.move_to_back(list);
    arena.move_next(list);
    arena.insert_before(list, "d".into()).unwrap();

    assert_eq!(traverse(&mut arena, list), vec!["a", "b", "c", "d"]);
    assert_eq!(arena.len(list), 4);
}

#[test]
fn trim_on_a_single_element_list_resets_the_cursor() {
    let mut arena: Arena<String> = Arena::new(1, 1);
    let list = arena.create_list().expect("list");
    arena.push_back(list, "only".into()).unwrap();
    assert_eq!(arena.pop_back(list).as_deref(), Some("only"));
    assert!(arena.is_empty(list));
    assert_eq!(arena.cursor(list), Cursor::Before);
}

#[test]
fn concat_combines_sizes_and_preserves_order() {
    let mut arena: Arena<String> = Arena::new(2, 8);
    let a = arena.create_list().expect("a");
    let b = arena.create_list().expect("b");
    for word in ["one", "two", "three"] {
        arena.push_back(a, word.into()).unwrap();
    }
    for word in ["four", "five"] {
        arena.push_back(b, word.into()).unwrap();
    }

    arena.concat(a, b);
    assert_eq!(arena.len(a), 5);
    assert_eq!(
        traverse(&mut arena, a),
        vec!["one", "two", "three", "four", "five"]
    );
    // b's former header must be available for a subsequent create.
    arena.create_list().expect("header released by concat");
}

#[test]
fn node_pool_is_shared_across_lists() {
    const CAPACITY: usize = 6;
    let mut arena: Arena<String> = Arena::new(3, CAPACITY);
    let lists = [
        arena.create_list().expect("first"),
        arena.create_list().expect("second"),
        arena.create_list().expect("third"),
    ];

    // Drain the whole node pool across the three lists.
    for n in 0..CAPACITY {
        let list = lists[n % lists.len()];
        arena.push_back(list, format!("item {n}")).expect("capacity left");
    }

    // The next insertion fails no matter which list asks, and nothing about
    // the existing lists changes.
    for &list in &lists {
        let before_len = arena.len(list);
        let err = arena
            .push_front(list, "overflow".into())
            .expect_err("pool is dry");
        assert_eq!(err.into_inner(), "overflow");
        assert_eq!(arena.len(list), before_len);
    }
    assert_eq!(
        lists.iter().map(|&l| arena.len(l)).sum::<usize>(),
        CAPACITY
    );
    assert_eq!(
        traverse(&mut arena, lists[0]),
        vec!["item 0", "item 3"]
    );
}

#[test]
fn destroyed_lists_return_everything_to_the_pools() {
    let mut arena: Arena<String> = Arena::new(1, 4);
    let list = arena.create_list().expect("list");
    for n in 0..4 {
        arena.push_back(list, format!("{n}")).unwrap();
    }

    let mut disposed = 0usize;
    arena.destroy_list(list, &mut |_item| disposed += 1);
    assert_eq!(disposed, 4);

    // The same arena supports a full-capacity list again.
    let list = arena.create_list().expect("header recycled");
    for n in 0..4 {
        arena.push_back(list, format!("again {n}")).unwrap();
    }
    assert!(arena.push_back(list, "extra".into()).is_err());
}

#[test]
fn search_finds_then_exhausts() {
    struct Exactly(&'static str);
    impl Matcher<String> for Exactly {
        fn matches(&self, item: &String) -> bool {
            item == self.0
        }
    }

    let mut arena: Arena<String> = Arena::new(1, 4);
    let list = arena.create_list().expect("list");
    for word in ["alpha", "beta", "gamma"] {
        arena.push_back(list, word.into()).unwrap();
    }
    arena.move_to_front(list);
    arena.move_prev(list); // cursor Before

    let matcher = Exactly("gamma");
    assert_eq!(arena.find(list, &matcher).map(String::as_str), Some("gamma"));
    assert_eq!(arena.current(list).map(String::as_str), Some("gamma"));

    // Same predicate again without moving the cursor: the scan resumes past
    // the match, runs off the tail, and reports nothing.
    assert_eq!(arena.find(list, &matcher), None);
    assert_eq!(arena.cursor(list), Cursor::Beyond);
}
