//! Cancellable countdown ticks.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::session::{Countdown, Event};

/// Sends [`Event::Tick`] once per period until stopped or dropped.
#[derive(Debug, Default)]
pub struct Ticker {
    running: Option<(Countdown, JoinHandle<()>)>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any running countdown.
    pub fn start(&mut self, countdown: Countdown, period: Duration, tx: UnboundedSender<Event>) {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick fires immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Event::Tick(countdown)).is_err() {
                    break;
                }
            }
        });
        self.running = Some((countdown, handle));
    }

    pub fn stop(&mut self) {
        if let Some((countdown, handle)) = self.running.take() {
            log::debug!("Stopping {:?} countdown", countdown);
            handle.abort();
        }
    }

    /// The countdown currently ticking, if any.
    pub fn running(&self) -> Option<Countdown> {
        self.running.as_ref().map(|(countdown, _)| *countdown)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const PERIOD: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new();
        ticker.start(Countdown::Reveal, PERIOD, tx);
        assert_eq!(ticker.running(), Some(Countdown::Reveal));

        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap();
            assert_eq!(event, Some(Event::Tick(Countdown::Reveal)));
        }

        ticker.stop();
        assert_eq!(ticker.running(), None);
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(PERIOD * 5).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_start_replaces_running_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new();
        ticker.start(Countdown::Reveal, PERIOD, tx.clone());
        ticker.start(Countdown::Answer, PERIOD, tx);
        assert_eq!(ticker.running(), Some(Countdown::Answer));

        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap();
            assert_eq!(event, Some(Event::Tick(Countdown::Answer)));
        }
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut ticker = Ticker::new();
            ticker.start(Countdown::Answer, PERIOD, tx);
        }
        tokio::time::sleep(PERIOD * 5).await;
        assert!(rx.try_recv().is_err());
    }
}
