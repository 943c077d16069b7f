//! Tests for the core algebra.
//!
//! Open proxies are observed with `trace`, which answers every request and
//! response from a script and records what the proxy did.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::effect::{fail, from_fn, pure as step};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Requested(i32),
    Responded(i32),
    Lifted,
}

type Open<A> = Proxy<i32, i32, i32, i32, A, String>;

/// Drive an open proxy, answering requests from `replies_up` and responses
/// from `replies_down`.
async fn trace<A: Payload>(
    proxy: Open<A>,
    replies_up: Vec<i32>,
    replies_down: Vec<i32>,
) -> (Vec<Event>, Result<Option<A>, String>) {
    let mut up = replies_up.into_iter();
    let mut down = replies_down.into_iter();
    let mut events = Vec::new();
    let mut node = proxy;
    loop {
        node = match node {
            Proxy::Request(value, next) => {
                events.push(Event::Requested(value));
                match up.next() {
                    Some(reply) => next(reply),
                    None => return (events, Ok(None)),
                }
            }
            Proxy::Respond(value, next) => {
                events.push(Event::Responded(value));
                match down.next() {
                    Some(reply) => next(reply),
                    None => return (events, Ok(None)),
                }
            }
            Proxy::Lift(effect) => {
                events.push(Event::Lifted);
                match effect.run(&()).await {
                    Ok(next) => next,
                    Err(error) => return (events, Err(error)),
                }
            }
            Proxy::Bind(bound) => bound.resume(),
            Proxy::Pure(result) => return (events, Ok(Some(result))),
        };
    }
}

/// Events other than the zero-work suspends composition inserts.
fn visible(events: Vec<Event>) -> Vec<Event> {
    events.into_iter().filter(|e| *e != Event::Lifted).collect()
}

fn ask_twice() -> Open<i32> {
    Proxy::request(1).bind(|a: i32| Proxy::request(a + 1).map(move |b: i32| a * 10 + b))
}

#[tokio::test]
async fn test_pure_finishes_immediately() {
    let (events, result) = trace(Open::pure(5), vec![], vec![]).await;
    assert!(events.is_empty());
    assert_eq!(result, Ok(Some(5)));
}

#[tokio::test]
async fn test_request_and_respond_record_values() {
    let (events, result) = trace(ask_twice(), vec![3, 4], vec![]).await;
    assert_eq!(events, vec![Event::Requested(1), Event::Requested(4)]);
    assert_eq!(result, Ok(Some(34)));

    let echo: Open<i32> = Proxy::respond(9);
    let (events, result) = trace(echo, vec![], vec![2]).await;
    assert_eq!(events, vec![Event::Responded(9)]);
    assert_eq!(result, Ok(Some(2)));
}

#[tokio::test]
async fn test_shapes() {
    assert_eq!(Open::<i32>::pure(1).shape(), Shape::Pure);
    assert_eq!(Open::<i32>::request(1).shape(), Shape::Request);
    assert_eq!(Open::<i32>::respond(1).shape(), Shape::Respond);
    assert_eq!(Open::<i32>::lift(step(1)).shape(), Shape::Lift);
    assert_eq!(Open::<i32>::suspend(|| Proxy::pure(1)).shape(), Shape::Lift);
    assert_eq!(Open::<i32>::request(1).map(|n| n).shape(), Shape::Bind);
    assert_eq!(Open::<i32>::request(1).map(|n| n).resume().shape(), Shape::Request);
    assert_eq!(format!("{:?}", Open::<i32>::pure(1)), "Proxy(Pure)");
}

#[tokio::test]
async fn test_left_identity() {
    let f = |a: i32| Open::<i32>::request(a).map(|b: i32| b * 2);

    let left = trace(Open::pure(7).bind(f), vec![5], vec![]).await;
    let right = trace(f(7), vec![5], vec![]).await;
    assert_eq!(left, right);
}

#[tokio::test]
async fn test_right_identity() {
    let left = trace(ask_twice().bind(Proxy::pure), vec![3, 4], vec![]).await;
    let right = trace(ask_twice(), vec![3, 4], vec![]).await;
    assert_eq!(left, right);
}

#[tokio::test]
async fn test_bind_associativity() {
    let f = |a: i32| Open::<i32>::respond(a).map(move |b: i32| a + b);
    let g = |c: i32| Open::<i32>::lift(step(c * 3));

    let left = trace(ask_twice().bind(f).bind(g), vec![1, 2], vec![100]).await;
    let right = trace(ask_twice().bind(move |a| f(a).bind(g)), vec![1, 2], vec![100]).await;
    assert_eq!(left, right);
    assert_eq!(left.1, Ok(Some((12 + 100) * 3)));
}

#[tokio::test]
async fn test_left_nested_bind() {
    let mut proxy = Open::<i32>::pure(0);
    for _ in 0..100_000 {
        proxy = proxy.bind(|n| Proxy::request(n).map(move |reply: i32| n + reply));
    }

    let (events, result) = trace(proxy, vec![1; 100_000], vec![]).await;
    assert_eq!(events.len(), 100_000);
    assert_eq!(events.last(), Some(&Event::Requested(99_999)));
    assert_eq!(result, Ok(Some(100_000)));
}

#[tokio::test]
async fn test_left_nested_lift() {
    let mut proxy = Open::<i32>::lift(step(0));
    for _ in 0..100_000 {
        proxy = proxy.bind(|n| Proxy::lift(step(n + 1)));
    }

    let (events, result) = trace(proxy, vec![], vec![]).await;
    assert_eq!(events.len(), 100_001);
    assert_eq!(result, Ok(Some(100_000)));
}

#[tokio::test]
async fn test_reflect_swaps_channels() {
    let (events, result) = trace(ask_twice().reflect(), vec![], vec![3, 4]).await;
    assert_eq!(events, vec![Event::Responded(1), Event::Responded(4)]);
    assert_eq!(result, Ok(Some(34)));
}

#[tokio::test]
async fn test_reflect_is_an_involution() {
    let mixed = || {
        Open::<i32>::request(1)
            .bind(|a: i32| Proxy::lift(step(a + 1)))
            .bind(|b: i32| Proxy::respond(b))
            .bind(|c: i32| Proxy::request(c).map(move |d: i32| c + d))
    };

    let twice = trace(mixed().reflect().reflect(), vec![10, 20], vec![30]).await;
    let once = trace(mixed(), vec![10, 20], vec![30]).await;
    assert_eq!(twice, once);
    assert_eq!(
        once.0,
        vec![
            Event::Requested(1),
            Event::Lifted,
            Event::Responded(11),
            Event::Requested(30),
        ]
    );
}

#[tokio::test]
async fn test_lift_failure_propagates_through_bind() {
    let failing = Open::<i32>::lift(fail("boom".to_string())).bind(|n: i32| Proxy::respond(n));
    let (events, result) = trace(failing, vec![], vec![]).await;
    assert_eq!(events, vec![Event::Lifted]);
    assert_eq!(result, Err("boom".to_string()));
}

#[tokio::test]
async fn test_pair_each_request_with_respond_answers_requests() {
    // upstream doubles whatever it is asked, forever
    fn doubler(asked: i32) -> Proxy<i32, i32, i32, i32, i32, String> {
        Proxy::respond(asked * 2).bind(doubler)
    }

    let composed = ask_twice().pair_each_request_with_respond(doubler);
    let (events, result) = trace(composed, vec![], vec![]).await;
    // ask 1 -> 2, ask 3 -> 6
    assert_eq!(visible(events), vec![]);
    assert_eq!(result, Ok(Some(26)));
}

#[tokio::test]
async fn test_pair_each_respond_with_request_answers_responses() {
    // downstream records every value and asks for the next
    fn collector(seen: i32) -> Proxy<i32, i32, i32, i32, i32, String> {
        Proxy::request(seen + 100).bind(collector)
    }

    let source: Open<i32> = Proxy::respond(1)
        .bind(|reply: i32| Proxy::respond(reply))
        .map(|last: i32| last);
    let composed = source.pair_each_respond_with_request(collector);
    let (_, result) = trace(composed, vec![], vec![]).await;
    // 1 -> reply 101 -> responds 101 -> reply 201
    assert_eq!(result, Ok(Some(201)));
}

#[tokio::test]
async fn test_replace_respond_runs_body_per_value() {
    let counted = Arc::new(AtomicUsize::new(0));
    let seen = counted.clone();

    let source: Open<()> = Proxy::respond(1)
        .then(Proxy::respond(2))
        .then(Proxy::respond(3))
        .map(|_: i32| ());
    let replaced = source.replace_respond(move |value: i32| {
        let seen = seen.clone();
        Proxy::lift(from_fn(move |_: &()| {
            seen.fetch_add(value as usize, Ordering::SeqCst);
            Ok::<_, String>(0)
        }))
    });

    let (events, result) = trace(replaced, vec![], vec![]).await;
    assert!(visible(events).is_empty());
    assert_eq!(result, Ok(Some(())));
    assert_eq!(counted.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_replace_request_substitutes_replies() {
    let replaced = ask_twice().replace_request(|asked: i32| Open::<i32>::pure(asked * 5));
    let (events, result) = trace(replaced, vec![], vec![]).await;
    // 1 -> 5, then 6 -> 30
    assert!(visible(events).is_empty());
    assert_eq!(result, Ok(Some(80)));
}

#[tokio::test]
async fn test_compose_connects_respond_to_request() {
    let upstream: Proxy<i32, i32, (), i32, i32, String> =
        Proxy::respond(4).then(Proxy::respond(5)).then(Proxy::pure(-1));
    let downstream: Proxy<(), i32, i32, i32, i32, String> = Proxy::request(())
        .bind(|a: i32| Proxy::request(()).map(move |b: i32| a * b));

    let (_, result) = trace(compose(upstream, downstream), vec![], vec![]).await;
    assert_eq!(result, Ok(Some(20)));
}

#[tokio::test]
async fn test_observe_fuses_lifts() {
    let chained = Open::<i32>::lift(step(1))
        .bind(|a: i32| Proxy::lift(step(a + 1)))
        .bind(|b: i32| Proxy::lift(step(b + 1)))
        .bind(|c: i32| Proxy::respond(c));

    let (plain_events, plain) = trace(
        Open::<i32>::lift(step(1))
            .bind(|a: i32| Proxy::lift(step(a + 1)))
            .bind(|b: i32| Proxy::lift(step(b + 1)))
            .bind(|c: i32| Proxy::respond(c)),
        vec![],
        vec![0],
    )
    .await;
    let (observed_events, observed) = trace(chained.observe(), vec![], vec![0]).await;

    assert_eq!(plain, observed);
    assert_eq!(plain_events.iter().filter(|e| **e == Event::Lifted).count(), 3);
    assert_eq!(observed_events, vec![Event::Lifted, Event::Responded(3)]);
}

#[tokio::test]
async fn test_observe_preserves_failure() {
    let failing = Open::<i32>::lift(step(1))
        .bind(|_: i32| Proxy::lift(fail::<i32, _, _>("late".to_string())))
        .observe();
    let (_, result) = trace(failing, vec![], vec![]).await;
    assert_eq!(result, Err("late".to_string()));
}
