use std::{
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError, at, bounded, select, unbounded};

/// Fires step indices at fixed offsets from when it was started. Owned by a
/// screen session; dropping it cancels every step that has not fired yet.
#[derive(Debug)]
pub struct TimerChain {
    events: Receiver<usize>,
    cancel_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
    remaining: usize,
}

impl TimerChain {
    /// `offsets` are measured from now and are expected in ascending order.
    pub fn start(offsets: Vec<Duration>) -> Self {
        let (event_tx, events) = unbounded();
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let remaining = offsets.len();

        let handle = thread::spawn(move || {
            let started = Instant::now();
            for (step, offset) in offsets.into_iter().enumerate() {
                select! {
                    recv(cancel_rx) -> _ => {
                        log::debug!("timer chain cancelled before step {step}");
                        return;
                    }
                    recv(at(started + offset)) -> _ => {
                        if event_tx.send(step).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Self {
            events,
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
            remaining,
        }
    }

    /// Next fired step, without blocking.
    pub fn try_next(&mut self) -> Option<usize> {
        match self.events.try_recv() {
            Ok(step) => {
                self.remaining = self.remaining.saturating_sub(1);
                Some(step)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimerChain {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_until(chain: &mut TimerChain, count: usize, timeout: Duration) -> Vec<usize> {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        while seen.len() < count && Instant::now() < deadline {
            if let Some(step) = chain.try_next() {
                seen.push(step);
            } else {
                thread::sleep(Duration::from_millis(2));
            }
        }
        seen
    }

    #[test]
    fn fires_steps_in_order() {
        let mut chain = TimerChain::start(vec![
            Duration::ZERO,
            Duration::from_millis(10),
            Duration::from_millis(20),
        ]);
        let seen = drain_until(&mut chain, 3, Duration::from_secs(5));
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(chain.is_finished());
    }

    #[test]
    fn cancel_stops_pending_steps_promptly() {
        let chain = TimerChain::start(vec![Duration::from_secs(30)]);
        let started = Instant::now();
        chain.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn empty_chain_is_finished() {
        let chain = TimerChain::start(Vec::new());
        assert!(chain.is_finished());
    }
}
