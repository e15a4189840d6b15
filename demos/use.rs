use avlmap::{AvlTreeMap, AvlTreeSet};

fn main() {
    let mut map = AvlTreeMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "two");
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    map.remove(&1);
    assert!(map.get(&1).is_none());

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    // Keys ordered by length, then alphabetically
    let by_length = |a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b));
    let mut words = AvlTreeSet::with_comparator(by_length);
    for word in ["kiwi", "fig", "banana", "apple", "date"] {
        words.insert(word);
    }
    println!("{:?}", words);

    let mut set = AvlTreeSet::new();
    for x in 0..5 {
        set.insert(x);
    }
    assert!(set.contains(&1));
    set.remove(&1);
    assert!(!set.contains(&1));

    let other: AvlTreeSet<_> = (3..8).collect();
    println!("union: {:?}", set.union(&other));
    println!("intersection: {:?}", set.intersection(&other));
    println!("difference: {:?}", set.difference(&other));
}
