//! Tests for the role facades and stock stages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::effect::{fail, from_fn, pure as step, EffectExt};
use crate::runtime::CancellationToken;

type Error = String;

fn counting_iter(
    values: Vec<i32>,
    pulls: Arc<AtomicUsize>,
) -> impl Iterator<Item = i32> + Send + 'static {
    values.into_iter().inspect(move |_| {
        pulls.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_yield_all_into_summing_consumer() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let source = producer::yield_all(counting_iter(vec![1, 2, 3], pulls.clone())).map(|()| -1);
    let sum = consumer::fold_n(3, 0, |acc, n: i32| acc + n);

    let result: Result<i32, Error> = (source | sum).run(&()).await;
    assert_eq!(result, Ok(6));
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_producer_result_wins_when_it_finishes_first() {
    let source = producer::yield_all(vec![1, 2]).map(|()| -1);
    let sum = consumer::fold_n(3, 0, |acc, n: i32| acc + n);

    assert_eq!((source | sum).run(&()).await, Ok::<_, Error>(-1));
}

#[tokio::test]
async fn test_collect_and_next() {
    let (values, ()) = producer::yield_all(vec![1, 2, 3])
        .collect(&())
        .await
        .map_err(|e: Error| e)
        .unwrap();
    assert_eq!(values, vec![1, 2, 3]);

    let first = Producer::<i32, (), Error>::yield_(7)
        .then(Producer::yield_(8))
        .next(&())
        .await
        .unwrap();
    let Next::Yielded(value, rest) = first else {
        panic!("expected a value");
    };
    assert_eq!(value, 7);
    let (rest, ()) = rest.collect(&()).await.unwrap();
    assert_eq!(rest, vec![8]);
}

#[tokio::test]
async fn test_next_on_finished_producer() {
    let done = Producer::<i32, &str, Error>::pure("finished").next(&()).await.unwrap();
    assert!(matches!(done, Next::Done("finished")));
}

#[tokio::test]
async fn test_fold_returns_accumulator_and_result() {
    let source = producer::yield_all(vec![2, 3, 4]).map(|()| "end");
    let (product, end) = source
        .fold(&(), 1, |acc, n| acc * n)
        .await
        .map_err(|e: Error| e)
        .unwrap();
    assert_eq!(product, 24);
    assert_eq!(end, "end");
}

#[tokio::test]
async fn test_stock_pipes() {
    let (values, ()) = (producer::yield_all(1..=10)
        | pipe::map(|n: i32| n * 3)
        | pipe::filter(|n: &i32| n % 2 == 0)
        | pipe::take(3))
    .collect(&())
    .await
    .map_err(|e: Error| e)
    .unwrap();
    assert_eq!(values, vec![6, 12, 18]);
}

#[tokio::test]
async fn test_cat_is_identity() {
    let (values, ()) = (producer::yield_all(vec!['a', 'b']) | pipe::cat())
        .collect(&())
        .await
        .map_err(|e: Error| e)
        .unwrap();
    assert_eq!(values, vec!['a', 'b']);
}

#[tokio::test]
async fn test_scan_yields_running_totals() {
    let running = producer::yield_all(vec![1, 2, 3, 4]) | pipe::scan(0, |acc, n: i32| acc + n);
    let (totals, ()) = running
        .collect(&())
        .await
        .map_err(|e: Error| e)
        .unwrap();
    assert_eq!(totals, vec![1, 3, 6, 10]);
}

#[tokio::test]
async fn test_map_m_runs_one_step_per_value() {
    let steps = Arc::new(AtomicUsize::new(0));
    let counter = steps.clone();
    let doubled = producer::yield_all(vec![1, 2, 3])
        | pipe::map_m(move |n: i32| {
            let counter = counter.clone();
            from_fn(move |_: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(n * 2)
            })
        });

    let (values, ()) = doubled.collect(&()).await.unwrap();
    assert_eq!(values, vec![2, 4, 6]);
    assert_eq!(steps.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_map_m_failure_stops_pipeline() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let failing = producer::yield_all(counting_iter(vec![1, 2, 3], pulls.clone()))
        | pipe::map_m(|n: i32| {
            if n == 2 {
                fail::<i32, _, ()>(format!("bad {}", n)).boxed()
            } else {
                step(n).boxed()
            }
        });

    let result = (failing | consumer::drain()).run(&()).await;
    assert_eq!(result, Err("bad 2".to_string()));
    assert_eq!(pulls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_pipe_into_consumer_is_a_consumer() {
    let halve_then_sum: Consumer<i32, i32, Error> =
        pipe::map(|n: i32| n / 2) | consumer::fold_n(2, 0, |acc, n| acc + n);

    let pipeline = producer::yield_all(vec![10, 20, 30]).map(|()| 0) | halve_then_sum;
    assert_eq!(pipeline.run(&()).await, Ok(15));
}

#[tokio::test]
async fn test_pipe_pipe_composition() {
    let both = pipe::map(|n: i32| n + 1) | pipe::map(|n: i32| n * 10);
    let (values, ()) = (producer::yield_all(vec![1, 2]) | both)
        .collect(&())
        .await
        .map_err(|e: Error| e)
        .unwrap();
    assert_eq!(values, vec![20, 30]);
}

#[tokio::test]
async fn test_bitand_sequences_same_role() {
    let first_two = Producer::<i32, (), Error>::yield_(1) & Producer::yield_(2);
    let (values, ()) = first_two.collect(&()).await.unwrap();
    assert_eq!(values, vec![1, 2]);

    let skip_one = Consumer::<i32, i32, Error>::await_() & Consumer::await_();
    let pipeline = producer::yield_all(vec![5, 6]).map(|()| 0) | skip_one;
    assert_eq!(pipeline.run(&()).await, Ok(6));

    let effect = Effect::<i32, Error>::pure(1) & Effect::pure(2);
    assert_eq!(effect.run(&()).await, Ok(2));
}

#[tokio::test]
async fn test_feed_answers_first_await() {
    let double = Consumer::<i32, i32, Error>::await_().map(|n| n * 2);
    assert_eq!(double.feed(21).run(&()).await, Ok(Some(42)));

    let needs_two = consumer::fold_n(2, 0, |acc, n: i32| acc + n);
    assert_eq!(needs_two.feed(1).run(&()).await, Ok::<_, Error>(None));
}

#[tokio::test]
async fn test_fed_by_runs_fresh_step_per_await() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let sum = consumer::fold_n(4, 0, |acc, n: usize| acc + n);

    let effect = sum.fed_by(move || {
        let counter = counter.clone();
        from_fn(move |_: &()| Ok::<_, Error>(counter.fetch_add(1, Ordering::SeqCst)))
    });
    assert_eq!(effect.run(&()).await, Ok(6));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_consumer_for_each_runs_step_per_value() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let effect = producer::yield_all(vec!["a", "b"])
        | consumer::for_each(move |s: &'static str| {
            let sink = sink.clone();
            from_fn(move |_: &()| {
                sink.lock().unwrap().push(s);
                Ok::<_, Error>(())
            })
        });

    assert_eq!(effect.run(&()).await, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_producer_for_each_loops_over_yields() {
    let total = Arc::new(AtomicUsize::new(0));
    let sink = total.clone();
    let effect = producer::yield_all(vec![1usize, 2, 3]).for_each(move |n| {
        let sink = sink.clone();
        Effect::lift(from_fn(move |_: &()| {
            sink.fetch_add(n, Ordering::SeqCst);
            Ok::<_, Error>(())
        }))
    });

    assert_eq!(effect.run(&()).await, Ok(()));
    assert_eq!(total.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_repeat_producer_pulls_lazily() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let ticks = producer::repeat(move || {
        let counter = counter.clone();
        from_fn(move |_: &()| Ok::<_, Error>(counter.fetch_add(1, Ordering::SeqCst)))
    });

    let effect = ticks | consumer::fold_n(2, 0, |acc, n: usize| acc + n);
    assert_eq!(effect.run(&()).await, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_into_pipe_views() {
    let as_pipe: Pipe<(), i32, (), Error> = producer::yield_all(vec![1, 2]).into_pipe();
    let (values, ()) = (producer::yield_all(Vec::<()>::new()) | as_pipe)
        .collect(&())
        .await
        .unwrap();
    assert_eq!(values, vec![1, 2]);

    let summing: Pipe<i32, (), i32, Error> =
        consumer::fold_n(2, 0, |acc, n: i32| acc + n).into_pipe();
    let pipeline = producer::yield_all(vec![4, 5]).map(|()| 0) | summing | consumer::drain();
    assert_eq!(pipeline.run(&()).await, Ok(9));
}

#[tokio::test]
async fn test_lifted_effect_failure_is_the_outcome() {
    let effect = Effect::<i32, Error>::lift(fail("broken".to_string())).map(|n| n + 1);
    assert_eq!(effect.run(&()).await, Err("broken".to_string()));
}

#[tokio::test]
async fn test_cancelled_token_stops_before_first_step() {
    let token = CancellationToken::new();
    token.cancel();

    let effect = Effect::<i32, Error, CancellationToken>::lift(from_fn(|_: &CancellationToken| {
        Ok::<_, Error>(1)
    }));
    assert_eq!(effect.run(&token).await, Err("operation cancelled".to_string()));
}

#[tokio::test]
async fn test_observe_keeps_result() {
    let effect = Effect::<i32, Error>::lift(step(1))
        .bind(|n| Effect::lift(step(n + 1)))
        .observe();
    assert_eq!(effect.run(&()).await, Ok(2));
}

#[tokio::test]
async fn test_facade_debug_shows_shape() {
    let producer = Producer::<i32, (), Error>::yield_(1);
    assert_eq!(format!("{:?}", producer), "Producer(Proxy(Respond))");
}
