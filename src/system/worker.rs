use std::{
    io,
    thread::{self, JoinHandle},
};

use tracing::{debug, error};

use super::stop_signal::StopSignal;

/// A named background thread that is stopped and joined when dropped
#[derive(Debug)]
pub struct Worker {
    name: String,
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns `work` on a new thread. `work` receives the worker's stop signal and is expected to
    /// return soon after it fires.
    pub fn spawn<F>(name: impl Into<String>, work: F) -> io::Result<Self>
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let name = name.into();
        let stop = StopSignal::new();
        let worker_stop = stop.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || work(worker_stop))?;
        debug!(worker = %name, "spawned worker thread");

        Ok(Self {
            name,
            stop,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks the worker to exit without waiting for it
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the worker and blocks until its thread has exited
    pub fn join(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.stop();
            match handle.join() {
                Ok(()) => debug!(worker = %self.name, "joined worker thread"),
                Err(e) => error!(worker = %self.name, "worker thread panicked: {:?}", e),
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use super::*;

    #[test]
    fn drop_stops_and_joins() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let worker = {
            let ticks = ticks.clone();
            Worker::spawn("ticker", move |stop| {
                while !stop.wait_timeout(Duration::from_millis(1)) {
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            })
            .unwrap()
        };
        assert_eq!(worker.name(), "ticker");
        thread::sleep(Duration::from_millis(20));
        drop(worker);

        let after_drop = ticks.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::Relaxed), after_drop);
    }

    #[test]
    fn thread_carries_the_worker_name() {
        let (tx, rx) = std::sync::mpsc::channel();
        let worker = Worker::spawn("named", move |_| {
            tx.send(thread::current().name().map(str::to_owned)).unwrap();
        })
        .unwrap();
        assert_eq!(rx.recv().unwrap().as_deref(), Some("named"));
        worker.join();
    }

    #[test]
    fn stop_lets_the_loop_finish() {
        let worker = Worker::spawn("stoppable", |stop| {
            while !stop.wait_timeout(Duration::from_secs(10)) {}
        })
        .unwrap();
        worker.stop();
        for _ in 0..100 {
            if worker.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(worker.is_finished());
    }

    #[test]
    fn panicking_worker_does_not_panic_on_drop() {
        let worker = Worker::spawn("doomed", |_| panic!("boom")).unwrap();
        drop(worker);
    }
}
