//! Interpreting environment-free stages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::effect::{fail, from_fn, pure as step};
use crate::pipes::{self, consumer, producer};
use crate::runtime::Runtime;

type Error = String;

#[derive(Clone)]
struct AppEnv {
    offset: i32,
}

fn sum_two() -> Consumer<i32, i32, Error> {
    Consumer::await_().bind(|a| Consumer::await_().map(move |b: i32| a + b))
}

#[tokio::test]
async fn test_interpreted_consumer_matches_facade() {
    let facade = consumer::fold_n(2, 0, |acc, n: i32| acc + n);
    let direct = producer::yield_all(vec![3, 4]).map(|()| 0) | facade;

    let interpreted = producer::yield_all(vec![3, 4]).map(|()| 0) | sum_two().interpret();

    assert_eq!(direct.run(&()).await, Ok::<_, Error>(7));
    assert_eq!(interpreted.run(&()).await, Ok(7));
}

#[tokio::test]
async fn test_interpret_into_any_environment() {
    let runtime = Runtime::new(AppEnv { offset: 100 });

    let from_env = pipes::Consumer::<i32, i32, Error, Runtime<AppEnv>>::lift(from_fn(
        |rt: &Runtime<AppEnv>| Ok(rt.offset),
    ));
    let pipeline = producer::yield_all(vec![1, 2]).map(|()| 0)
        | pipes::Consumer::from(sum_two())
            .bind(move |sum| from_env.map(move |offset| sum + offset));

    assert_eq!(runtime.run(pipeline).await, Ok(103));
}

#[tokio::test]
async fn test_pure_lift_is_lazy_until_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let counted = Consumer::<i32, usize, Error>::lift(from_fn(move |_: &()| {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }));

    let effect = producer::yield_all(Vec::<i32>::new()).map(|()| 0)
        | counted.interpret::<Runtime<AppEnv>>();
    assert_eq!(effect.into_proxy().shape(), crate::proxy::Shape::Lift);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let again = calls.clone();
    let rerun = Consumer::<i32, usize, Error>::lift(from_fn(move |_: &()| {
        Ok(again.fetch_add(1, Ordering::SeqCst) + 1)
    }));
    let runtime = Runtime::new(AppEnv { offset: 0 });
    let effect = producer::yield_all(Vec::<i32>::new()).map(|()| 0) | rerun.interpret();
    assert_eq!(runtime.run(effect).await, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pure_lift_failure_propagates() {
    let broken = Consumer::<i32, i32, Error>::lift(fail("no".to_string()));
    let effect = producer::yield_all(vec![1]).map(|()| 0) | broken.interpret();
    assert_eq!(effect.run(&()).await, Err("no".to_string()));
}

#[tokio::test]
async fn test_pure_producer_interprets_to_facade() {
    let numbers = Producer::<i32, (), Error>::yield_(1)
        & Producer::lift(step(2)).bind(Producer::yield_)
        & Producer::yield_(3);

    let (values, ()) = numbers.interpret::<()>().collect(&()).await.unwrap();
    assert_eq!(values, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_pure_pipe_interprets_to_facade() {
    let incremented: Pipe<i32, i32, (), Error> = Pipe::await_().bind(|n: i32| Pipe::yield_(n + 1))
        & Pipe::await_().bind(|n: i32| Pipe::yield_(n + 10));

    let stage: pipes::Pipe<i32, i32, (), Error> = incremented.into();
    let (values, ()) = (producer::yield_all(vec![1, 2, 3]) | stage)
        .collect(&())
        .await
        .unwrap();
    assert_eq!(values, vec![2, 12]);
}

#[tokio::test]
async fn test_into_pipe_embeddings() {
    let from_producer: Pipe<(), i32, (), Error> = Producer::yield_(5).into_pipe();
    let (values, ()) = (producer::yield_all(Vec::<()>::new()) | from_producer.interpret())
        .collect(&())
        .await
        .unwrap();
    assert_eq!(values, vec![5]);

    let from_consumer: Pipe<i32, (), i32, Error> = sum_two().into_pipe();
    let effect = producer::yield_all(vec![20, 22]).map(|()| 0)
        | from_consumer.interpret()
        | consumer::drain();
    assert_eq!(effect.run(&()).await, Ok(42));
}

#[tokio::test]
async fn test_pure_consumer_built_in_a_loop() {
    let mut total = Consumer::<u64, u64, Error>::pure(0);
    for _ in 0..100_000 {
        total = total.bind(|acc| Consumer::await_().map(move |n: u64| acc + n));
    }

    let effect = producer::yield_all(1u64..).map(|()| 0) | total.interpret();
    assert_eq!(effect.run(&()).await, Ok((1..=100_000u64).sum()));
}

#[tokio::test]
async fn test_pure_producer_built_in_a_loop() {
    let mut numbers = Producer::<u64, (), Error>::pure(());
    for n in 0..100_000u64 {
        numbers = numbers & Producer::yield_(n);
    }

    let (sum, ()) = numbers.interpret::<()>().fold(&(), 0u64, |acc, n| acc + n).await.unwrap();
    assert_eq!(sum, (0..100_000u64).sum());
}

#[tokio::test]
async fn test_pure_pipe_built_in_a_loop() {
    let mut doubled = Pipe::<u64, u64, (), Error>::pure(());
    for _ in 0..100_000 {
        doubled = doubled & Pipe::await_().bind(|n: u64| Pipe::yield_(n * 2));
    }

    let (values, ()) = (producer::yield_all(0..100_000u64) | doubled.interpret())
        .collect(&())
        .await
        .unwrap();
    assert_eq!(values.len(), 100_000);
    assert_eq!(values.last(), Some(&199_998));
}

#[test]
fn test_debug_output() {
    assert_eq!(format!("{:?}", Consumer::<i32, i32, Error>::pure(3)), "Pure(3)");
    assert_eq!(format!("{:?}", Consumer::<i32, i32, Error>::await_()), "Await");
    assert_eq!(format!("{:?}", Producer::<i32, (), Error>::yield_(4)), "Yield(4)");
    assert_eq!(format!("{:?}", sum_two()), "Bind(Bound { links: 1, .. })");
}
