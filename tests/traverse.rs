//! Sequencing collections of alternatives and of effects.

use std::sync::{Arc, Mutex};

use millrace::effect::{from_fn, Effect};
use millrace::pipes::{consumer, producer};
use millrace::traverse::{sequence, sequence_effect, traverse, traverse_effect};
use proptest::prelude::*;

#[test]
fn test_empty_inner_collections_give_nothing() {
    let result: Vec<Vec<i32>> = sequence(vec![Vec::new(), Vec::new()]);
    assert!(result.is_empty());
}

#[test]
fn test_empty_outer_collection_gives_one_empty_combination() {
    let result: Vec<Vec<i32>> = sequence(Vec::<Vec<i32>>::new());
    assert_eq!(result, vec![Vec::<i32>::new()]);
}

#[test]
fn test_combinations_are_row_major() {
    let result = sequence(vec![vec![1, 2], vec![10, 20, 30]]);
    assert_eq!(
        result,
        vec![
            vec![1, 10],
            vec![1, 20],
            vec![1, 30],
            vec![2, 10],
            vec![2, 20],
            vec![2, 30],
        ]
    );
}

#[test]
fn test_traverse_maps_then_sequences() {
    let result = traverse(vec!["ab", "c"], |s: &str| s.chars().collect::<Vec<_>>());
    assert_eq!(result, vec![vec!['a', 'c'], vec!['b', 'c']]);
}

#[tokio::test]
async fn test_sequence_effect_runs_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let effects: Vec<_> = (1..=3)
        .map(|n| {
            let order = order.clone();
            from_fn(move |_: &()| {
                order.lock().unwrap().push(n);
                Ok::<_, String>(n * 10)
            })
        })
        .collect();

    assert_eq!(sequence_effect(effects).run(&()).await, Ok(vec![10, 20, 30]));
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_traverse_effect_stops_at_first_failure() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let result = traverse_effect(vec![1, 2, 3, 4], move |n: i32| {
        let recorder = recorder.clone();
        from_fn(move |_: &()| {
            recorder.lock().unwrap().push(n);
            if n == 2 {
                Err(format!("bad {}", n))
            } else {
                Ok(n)
            }
        })
    })
    .run(&())
    .await;

    assert_eq!(result, Err("bad 2".to_string()));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_sequence_of_pipelines() {
    let pipelines: Vec<_> = vec![vec![1, 2], vec![3, 4], vec![5, 6]]
        .into_iter()
        .map(|values| {
            producer::yield_all(values).map(|()| 0) | consumer::fold_n(2, 0, |acc, n: i32| acc + n)
        })
        .collect();

    assert_eq!(sequence_effect(pipelines).run(&()).await, Ok::<_, String>(vec![3, 7, 11]));
}

proptest! {
    #[test]
    fn prop_combination_count_is_product(lengths in prop::collection::vec(0usize..4, 0..5)) {
        let input: Vec<Vec<usize>> = lengths.iter().map(|&len| (0..len).collect()).collect();
        let expected: usize = lengths.iter().product();

        let result = sequence(input);
        prop_assert_eq!(result.len(), expected);
        prop_assert!(result.iter().all(|combination| combination.len() == lengths.len()));
    }
}
