use std::{
    sync::{Arc, Barrier},
    thread,
    time::{Duration, Instant},
};

use traffic_light::{cycle_duration::CycleBounds, CyclerConfig, MessageQueue, Phase, PhaseCycler, RecvError};

fn light(min_cycle_seconds: f64, max_cycle_seconds: f64) -> PhaseCycler {
    PhaseCycler::with_config(CyclerConfig {
        min_cycle_seconds,
        max_cycle_seconds,
        poll_interval_ms: 1,
        seed: None,
    })
    .unwrap()
}

#[test]
fn vehicle_waits_for_green_then_sees_green() {
    let light = light(0.1, 0.2);
    let longest = CycleBounds::new(0.1, 0.2).unwrap().max_duration();
    assert_eq!(light.current_phase(), Phase::Red);
    light.simulate().unwrap();

    let start = Instant::now();
    light
        .wait_for_phase_timeout(Phase::Green, Duration::from_secs(2))
        .unwrap();
    assert_eq!(light.current_phase(), Phase::Green);
    assert!(start.elapsed() < longest + Duration::from_millis(500));
}

#[test]
fn several_vehicles_each_get_their_own_green() {
    let light = Arc::new(light(0.01, 0.03));
    light.simulate().unwrap();

    let vehicles: Vec<_> = (0..4)
        .map(|_| {
            let light = light.clone();
            thread::spawn(move || light.wait_for_phase_timeout(Phase::Green, Duration::from_secs(10)))
        })
        .collect();

    for vehicle in vehicles {
        assert_eq!(vehicle.join().unwrap(), Ok(()));
    }
}

#[test]
fn dropping_the_light_releases_waiters() {
    let light = Arc::new(light(60.0, 60.0));
    light.simulate().unwrap();
    let queue = light.queue().clone();

    let waiter = thread::spawn(move || queue.recv());
    thread::sleep(Duration::from_millis(20));
    drop(light);

    assert_eq!(waiter.join().unwrap(), Err(RecvError::Closed));
}

#[test]
fn many_producers_many_consumers_lose_nothing() {
    let queue = MessageQueue::<u64>::new();
    let start = Arc::new(Barrier::new(8));

    let producers: Vec<_> = (0..4u64)
        .map(|p| {
            let queue = queue.clone();
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                for n in 0..250 {
                    queue.send(p * 1000 + n);
                }
            })
        })
        .collect();
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                (0..250)
                    .map(|_| queue.recv_timeout(Duration::from_secs(5)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    let mut received: Vec<u64> = consumers
        .into_iter()
        .flat_map(|consumer| consumer.join().unwrap())
        .collect();
    received.sort_unstable();

    let mut expected: Vec<u64> = (0..4u64)
        .flat_map(|p| (0..250).map(move |n| p * 1000 + n))
        .collect();
    expected.sort_unstable();
    assert_eq!(received, expected);
}
