use humine::search::tt::{Bound, Entry, Tt};

fn entry(key: u64, depth: u32, score: i32) -> Entry {
    Entry {
        key,
        depth,
        score,
        best: None,
        bound: Bound::Lower,
        gen: 0,
    }
}

// A table with a single bucket makes every key collide, which exposes
// the replacement policy directly.
fn one_bucket() -> Tt {
    let tt = Tt::with_capacity_entries(4);
    assert_eq!(tt.capacity_entries(), 4);
    tt
}

#[test]
fn full_bucket_evicts_the_shallowest() {
    let tt = one_bucket();
    for (k, d) in [(1u64, 5), (2, 6), (3, 7), (4, 8)] {
        tt.store(entry(k, d, 0));
    }
    tt.store(entry(5, 10, 0));
    assert!(tt.probe(1).is_none(), "depth-5 entry should be the victim");
    for k in [2u64, 3, 4, 5] {
        assert!(tt.probe(k).is_some());
    }
}

#[test]
fn same_key_keeps_the_deeper_entry_within_a_generation() {
    let tt = one_bucket();
    tt.store(entry(9, 8, 100));
    tt.store(entry(9, 3, -100));
    let hit = tt.probe(9).unwrap();
    assert_eq!(hit.depth, 8);
    assert_eq!(hit.score, 100);
}

#[test]
fn same_key_from_a_newer_search_always_replaces() {
    let tt = one_bucket();
    tt.store(entry(9, 8, 100));
    tt.bump_generation();
    tt.store(entry(9, 3, -100));
    let hit = tt.probe(9).unwrap();
    assert_eq!(hit.depth, 3);
    assert_eq!(hit.score, -100);
}

#[test]
fn eviction_prefers_older_generations_at_equal_depth() {
    let tt = one_bucket();
    tt.store(entry(1, 5, 0));
    tt.bump_generation();
    for k in [2u64, 3, 4] {
        tt.store(entry(k, 5, 0));
    }
    tt.store(entry(5, 5, 0));
    assert!(tt.probe(1).is_none(), "older generation should be evicted");
    assert!(tt.probe(2).is_some());
}
