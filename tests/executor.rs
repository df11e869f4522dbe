use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use tombola::{verify, Lottery, LotteryInput, Packet, Participant, SeededRandom};

// Minimal executor with no tokio runtime behind it.
fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
            return out;
        }
    }
}

fn input() -> LotteryInput {
    LotteryInput {
        title: "T".to_string(),
        timestamp: None,
        packets: vec![Packet {
            title: "P1".to_string(),
            participants: vec![Participant::new("a", 1), Participant::new("b", 1)],
        }],
    }
}

#[test]
fn seed_becomes_ready_without_tokio() {
    let mut rng = SeededRandom::new("s1").unwrap();
    block_on(rng.ready()).unwrap();
    assert_eq!(rng.try_next().unwrap(), 0.8142251656138371);
}

#[test]
fn draw_and_verify_run_without_tokio() {
    let mut lottery = Lottery::with_seed(input(), "s1");
    block_on(lottery.initialize()).unwrap();
    let result = lottery.draw().unwrap();
    assert_eq!(result.drawings[0].winner, "b");

    let check = block_on(verify(&result)).unwrap();
    assert!(check.is_valid());

    let mut fresh = Lottery::new(input());
    block_on(fresh.initialize()).unwrap();
    assert_eq!(fresh.seed().map(str::len), Some(64));
}
