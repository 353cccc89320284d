// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! One-shot timers, repeating tickers and sleeping.
//!
//! Every [`Timer`] and [`Ticker`] owns a producer thread. The thread waits on
//! a condition variable until the next deadline, then pushes
//! [`Instant::now`] into a channel with room for a single value. A reader
//! that falls behind misses ticks instead of receiving a burst. The producer
//! keeps running until the handle is dropped, so a ticker delivers for as
//! long as it is alive and not stopped. Callback timers from [`after_func`]
//! are the exception: dropping their handle leaves a pending call in place.

use crate::duration::Duration;
use crate::error::Error;
use crate::instant::Instant;
use log::{debug, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::mpsc::{
    self, Receiver, RecvError, RecvTimeoutError, SyncSender, TryRecvError, TrySendError,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration as StdDuration, Instant as Deadline};

// ═══════════════════════════════════════════════════════════════════════════
// Producer
// ═══════════════════════════════════════════════════════════════════════════

struct State {
    /// `None` while stopped or after a one-shot timer has fired.
    next: Option<Deadline>,
    /// Set for tickers.
    period: Option<StdDuration>,
    closed: bool,
    /// The handle is gone but the producer finishes its pending firing.
    detached: bool,
}

struct Schedule {
    state: Mutex<State>,
    wake: Condvar,
}

impl Schedule {
    fn new(next: Option<Deadline>, period: Option<StdDuration>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                next,
                period,
                closed: false,
                detached: false,
            }),
            wake: Condvar::new(),
        })
    }

    /// Replaces the deadline and period, returning whether a firing was
    /// pending.
    fn arm(&self, next: Option<Deadline>, period: Option<StdDuration>) -> bool {
        let mut state = self.state.lock();
        let pending = state.next.is_some();
        state.next = next;
        state.period = period;
        self.wake.notify_one();
        pending
    }

    fn close(&self) {
        self.state.lock().closed = true;
        self.wake.notify_one();
    }

    fn detach(&self) {
        self.state.lock().detached = true;
        self.wake.notify_one();
    }
}

enum Delivery {
    Channel(SyncSender<Instant>),
    Callback(Box<dyn FnMut() + Send>),
}

/// The deadline following `deadline`, skipping any already missed by `now`.
fn following(deadline: Deadline, period: StdDuration, now: Deadline) -> Deadline {
    let next = deadline + period;
    if next > now {
        return next;
    }
    let missed = now.duration_since(deadline).as_nanos() / period.as_nanos();
    let skip = (missed + 1) * period.as_nanos();
    deadline + StdDuration::from_nanos(u64::try_from(skip).unwrap_or(u64::MAX))
}

fn run(schedule: Arc<Schedule>, mut delivery: Delivery) {
    let mut state = schedule.state.lock();
    loop {
        if state.closed || (state.detached && state.next.is_none()) {
            break;
        }
        let Some(deadline) = state.next else {
            schedule.wake.wait(&mut state);
            continue;
        };
        let now = Deadline::now();
        if now < deadline {
            schedule.wake.wait_until(&mut state, deadline);
            continue;
        }

        state.next = state.period.map(|period| following(deadline, period, now));
        match &mut delivery {
            Delivery::Channel(tx) => match tx.try_send(Instant::now()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => trace!("receiver is lagging, dropping tick"),
                Err(TrySendError::Disconnected(_)) => {
                    debug!("receiver dropped, stopping producer");
                    break;
                }
            },
            Delivery::Callback(f) => MutexGuard::unlocked(&mut state, f),
        }
    }
    debug!("timer producer exiting");
}

/// Owns a producer thread and tears it down on drop.
///
/// Callback producers are detached instead: a pending firing still runs,
/// then the thread exits.
struct Producer {
    schedule: Arc<Schedule>,
    handle: Option<JoinHandle<()>>,
    detach: bool,
}

impl Producer {
    fn spawn(next: Option<Deadline>, period: Option<StdDuration>, delivery: Delivery) -> Self {
        let schedule = Schedule::new(next, period);
        let shared = Arc::clone(&schedule);
        let handle = thread::spawn(move || run(shared, delivery));
        debug!("spawned timer producer (period {period:?})");
        Self {
            schedule,
            handle: Some(handle),
            detach: false,
        }
    }

    fn spawn_callback(next: Deadline, f: Box<dyn FnMut() + Send>) -> Self {
        let mut producer = Self::spawn(Some(next), None, Delivery::Callback(f));
        producer.detach = true;
        producer
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        if self.detach {
            // Dropping the JoinHandle leaves the thread running on its own.
            self.schedule.detach();
            return;
        }
        self.schedule.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn deadline_after(d: Duration) -> Deadline {
    Deadline::now() + d.to_std().unwrap_or_default()
}

fn positive(d: Duration) -> Result<StdDuration, Error> {
    d.to_std()
        .filter(|period| !period.is_zero())
        .ok_or(Error::NonPositiveInterval)
}

// ═══════════════════════════════════════════════════════════════════════════
// Ticker
// ═══════════════════════════════════════════════════════════════════════════

/// Delivers the current time every interval until stopped or dropped.
#[must_use = "dropping a Ticker stops it"]
pub struct Ticker {
    producer: Producer,
    rx: Receiver<Instant>,
}

impl Ticker {
    /// Starts a ticker whose first tick comes one interval from now.
    ///
    /// Fails with [`Error::NonPositiveInterval`] when `d <= 0`.
    pub fn new(d: Duration) -> Result<Self, Error> {
        let period = positive(d)?;
        let (tx, rx) = mpsc::sync_channel(1);
        let producer = Producer::spawn(
            Some(Deadline::now() + period),
            Some(period),
            Delivery::Channel(tx),
        );
        Ok(Self { producer, rx })
    }

    /// Stops further ticks. A tick already in the channel stays there.
    pub fn stop(&self) {
        self.producer.schedule.arm(None, None);
    }

    /// Restarts the ticker with a new interval, the next tick one interval
    /// from now.
    pub fn reset(&self, d: Duration) -> Result<(), Error> {
        let period = positive(d)?;
        self.producer
            .schedule
            .arm(Some(Deadline::now() + period), Some(period));
        Ok(())
    }

    #[inline]
    pub fn receiver(&self) -> &Receiver<Instant> {
        &self.rx
    }

    /// Blocks for the next tick. Never returns while the ticker is stopped.
    pub fn recv(&self) -> Result<Instant, RecvError> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<Instant, TryRecvError> {
        self.rx.try_recv()
    }

    /// Waits up to `timeout` for the next tick; a negative timeout does not
    /// wait.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Instant, RecvTimeoutError> {
        self.rx.recv_timeout(timeout.to_std().unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Timer
// ═══════════════════════════════════════════════════════════════════════════

/// Delivers the current time once, after a delay.
pub struct Timer {
    producer: Producer,
    rx: Receiver<Instant>,
}

impl Timer {
    /// Starts a timer that fires after `d`; `d <= 0` fires at once.
    pub fn new(d: Duration) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let producer = Producer::spawn(Some(deadline_after(d)), None, Delivery::Channel(tx));
        Self { producer, rx }
    }

    fn with_callback(d: Duration, f: Box<dyn FnMut() + Send>) -> Self {
        // Callback timers deliver nothing; their receiver is disconnected.
        let (_, rx) = mpsc::sync_channel(1);
        let producer = Producer::spawn_callback(deadline_after(d), f);
        Self { producer, rx }
    }

    /// Prevents the timer from firing. Returns `false` if it had already
    /// fired or been stopped.
    pub fn stop(&self) -> bool {
        self.producer.schedule.arm(None, None)
    }

    /// Re-arms the timer to fire after `d`. Returns `true` if it was still
    /// pending.
    pub fn reset(&self, d: Duration) -> bool {
        self.producer.schedule.arm(Some(deadline_after(d)), None)
    }

    #[inline]
    pub fn receiver(&self) -> &Receiver<Instant> {
        &self.rx
    }

    /// Blocks until the timer fires. Fails at once for timers made with
    /// [`after_func`].
    pub fn recv(&self) -> Result<Instant, RecvError> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<Instant, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Instant, RecvTimeoutError> {
        self.rx.recv_timeout(timeout.to_std().unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Free functions
// ═══════════════════════════════════════════════════════════════════════════

pub fn new_timer(d: Duration) -> Timer {
    Timer::new(d)
}

pub fn new_ticker(d: Duration) -> Result<Ticker, Error> {
    Ticker::new(d)
}

/// Calls `f` on the timer's thread once `d` has elapsed, and again after
/// each [`Timer::reset`].
///
/// The returned handle is only needed to stop or reset the timer: dropping
/// it does not cancel a pending call.
pub fn after_func<F>(d: Duration, f: F) -> Timer
where
    F: FnMut() + Send + 'static,
{
    Timer::with_callback(d, Box::new(f))
}

/// A receiver that yields the current time once, after `d`.
pub fn after(d: Duration) -> Receiver<Instant> {
    let (tx, rx) = mpsc::sync_channel(1);
    thread::spawn(move || {
        sleep(d);
        let _ = tx.send(Instant::now());
    });
    rx
}

/// A receiver of ticks every `d`, or `None` if `d <= 0`.
///
/// The producer has no handle: it stops once the receiver is dropped.
pub fn tick(d: Duration) -> Option<Receiver<Instant>> {
    let period = positive(d).ok()?;
    let (tx, rx) = mpsc::sync_channel(1);
    let schedule = Schedule::new(Some(Deadline::now() + period), Some(period));
    thread::spawn(move || run(schedule, Delivery::Channel(tx)));
    Some(rx)
}

/// Blocks the current thread for `d`; returns at once if `d <= 0`.
pub fn sleep(d: Duration) {
    if let Some(d) = d.to_std() {
        thread::sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::{MILLISECOND, SECOND};

    const PATIENCE: Duration = Duration::from_secs(2);

    #[test]
    fn ticker_keeps_ticking() {
        let ticker = Ticker::new(MILLISECOND * 10).unwrap();
        let mut last = None;
        for _ in 0..5 {
            let t = ticker.recv_timeout(PATIENCE).expect("tick");
            if let Some(prev) = last {
                assert!(!t.before(&prev));
            }
            last = Some(t);
        }
    }

    #[test]
    fn ticker_rejects_non_positive_interval() {
        assert!(matches!(
            Ticker::new(Duration::ZERO),
            Err(Error::NonPositiveInterval)
        ));
        assert!(new_ticker(-SECOND).is_err());
        let ticker = Ticker::new(SECOND).unwrap();
        assert!(ticker.reset(Duration::ZERO).is_err());
    }

    #[test]
    fn ticker_stop_and_reset() {
        let ticker = Ticker::new(MILLISECOND * 5).unwrap();
        ticker.recv_timeout(PATIENCE).expect("first tick");
        ticker.stop();
        while ticker.try_recv().is_ok() {}
        assert_eq!(
            ticker.recv_timeout(MILLISECOND * 50),
            Err(RecvTimeoutError::Timeout)
        );

        ticker.reset(MILLISECOND * 5).unwrap();
        assert!(ticker.recv_timeout(PATIENCE).is_ok());
        assert!(ticker.recv_timeout(PATIENCE).is_ok());
    }

    #[test]
    fn timer_fires_once() {
        let timer = Timer::new(MILLISECOND * 10);
        assert!(timer.recv_timeout(PATIENCE).is_ok());
        assert_eq!(
            timer.recv_timeout(MILLISECOND * 50),
            Err(RecvTimeoutError::Timeout)
        );
        assert!(!timer.stop());
    }

    #[test]
    fn timer_stop_prevents_firing() {
        let timer = new_timer(SECOND);
        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn timer_reset_rearms() {
        let timer = Timer::new(MILLISECOND);
        timer.recv_timeout(PATIENCE).expect("fired");
        assert!(!timer.reset(MILLISECOND));
        assert!(timer.recv_timeout(PATIENCE).is_ok());

        let pending = Timer::new(SECOND * 60);
        assert!(pending.reset(MILLISECOND));
        assert!(pending.recv_timeout(PATIENCE).is_ok());
    }

    #[test]
    fn after_func_runs_the_callback() {
        let (tx, rx) = mpsc::channel();
        let timer = after_func(MILLISECOND * 5, move || {
            let _ = tx.send(());
        });
        assert!(rx.recv_timeout(PATIENCE.to_std().unwrap()).is_ok());
        assert_eq!(timer.recv(), Err(RecvError));

        timer.reset(MILLISECOND);
        assert!(rx.recv_timeout(PATIENCE.to_std().unwrap()).is_ok());
    }

    #[test]
    fn after_func_fires_without_its_handle() {
        let (tx, rx) = mpsc::channel();
        drop(after_func(MILLISECOND * 5, move || {
            let _ = tx.send(());
        }));
        assert!(rx.recv_timeout(PATIENCE.to_std().unwrap()).is_ok());
        // The detached producer exits after firing, dropping the callback.
        assert_eq!(
            rx.recv_timeout(PATIENCE.to_std().unwrap()),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn stopped_after_func_stays_silent_when_dropped() {
        let (tx, rx) = mpsc::channel();
        let timer = after_func(MILLISECOND * 20, move || {
            let _ = tx.send(());
        });
        assert!(timer.stop());
        drop(timer);
        assert_eq!(
            rx.recv_timeout(PATIENCE.to_std().unwrap()),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn after_delivers_once() {
        let start = Deadline::now();
        let rx = after(MILLISECOND * 20);
        assert!(rx.recv().is_ok());
        assert!(start.elapsed() >= StdDuration::from_millis(20));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn tick_forwards_until_dropped() {
        assert!(tick(Duration::ZERO).is_none());
        let rx = tick(MILLISECOND * 5).unwrap();
        for _ in 0..3 {
            assert!(rx.recv_timeout(PATIENCE.to_std().unwrap()).is_ok());
        }
    }

    #[test]
    fn sleep_waits_and_ignores_negative() {
        let start = Deadline::now();
        sleep(MILLISECOND * 15);
        assert!(start.elapsed() >= StdDuration::from_millis(15));
        sleep(-SECOND);
    }

    #[test]
    fn following_skips_missed_deadlines() {
        let base = Deadline::now();
        let period = StdDuration::from_millis(10);
        assert_eq!(following(base, period, base), base + period);
        let late = base + StdDuration::from_millis(35);
        assert_eq!(following(base, period, late), base + StdDuration::from_millis(40));
    }
}
