//! Attempt countdown.
//!
//! [`AttemptTimer`] is a periodic tokio task that sends one message per
//! period. It belongs to exactly one attempt and is aborted when that
//! attempt ends or when the timer is dropped. [`LiveAttempt`] owns both the
//! attempt and its timer and is the one place ticks are applied, so there is
//! never a second writer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::attempt::{Attempt, AttemptStatus, SubmitOutcome, TickOutcome};
use crate::error::Result;
use crate::question::QuestionId;
use crate::quiz::PublishedQuiz;
use crate::view::AttemptView;

/// A cancelable periodic tick source.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct AttemptTimer {
    ticks: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl AttemptTimer {
    /// Start ticking every `period`, first tick one period from now.
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // a stalled consumer catches up rather than losing attempt time
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { ticks, handle }
    }

    /// Wait for the next tick. Returns `None` once the timer is cancelled.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Stop the task. Ticks already queued are discarded.
    pub fn cancel(&mut self) {
        self.handle.abort();
        self.ticks.close();
        while self.ticks.try_recv().is_ok() {}
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AttemptTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An attempt paired with its countdown task.
#[derive(Debug)]
pub struct LiveAttempt {
    attempt: Attempt,
    timer: Option<AttemptTimer>,
    tick_interval: Duration,
}

impl LiveAttempt {
    /// `tick_interval` is the real time per second of attempt time.
    pub fn new(quiz: PublishedQuiz, tick_interval: Duration) -> Self {
        Self::from_attempt(Attempt::new(quiz), tick_interval)
    }

    pub fn from_attempt(attempt: Attempt, tick_interval: Duration) -> Self {
        Self {
            attempt,
            timer: None,
            tick_interval,
        }
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn into_attempt(self) -> Attempt {
        self.attempt
    }

    pub fn view(&self) -> AttemptView {
        self.attempt.view()
    }

    /// Whether a countdown task is currently scheduled.
    pub fn timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start the attempt and schedule its timer.
    pub fn start(&mut self) -> Result<()> {
        self.attempt.start()?;
        self.timer = Some(AttemptTimer::start(self.tick_interval));
        Ok(())
    }

    pub fn answer(
        &mut self,
        question_id: QuestionId,
        selected: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        self.attempt.answer(question_id, selected)
    }

    pub fn answer_current(&mut self, selected: impl IntoIterator<Item = usize>) -> Result<()> {
        self.attempt.answer_current(selected)
    }

    pub fn next(&mut self) -> bool {
        self.attempt.next()
    }

    pub fn previous(&mut self) -> bool {
        self.attempt.previous()
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        self.attempt.go_to(index)
    }

    /// Submit manually. The timer is cancelled whatever the outcome.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let outcome = self.attempt.submit();
        self.stop_if_closed();
        outcome
    }

    pub fn abandon(&mut self) -> Result<()> {
        let outcome = self.attempt.abandon();
        self.stop_if_closed();
        outcome
    }

    /// Wait for the next timer tick and apply it.
    ///
    /// Returns `None` when no timer is running: before `start`, or after
    /// the attempt has closed. Safe to use as a `tokio::select!` branch.
    pub async fn next_tick(&mut self) -> Option<TickOutcome> {
        let timer = self.timer.as_mut()?;
        if timer.tick().await.is_none() {
            self.timer = None;
            return None;
        }

        let outcome = self.attempt.tick();
        self.stop_if_closed();
        Some(outcome)
    }

    fn stop_if_closed(&mut self) {
        let closed = matches!(
            self.attempt.status(),
            AttemptStatus::Submitted | AttemptStatus::Graded | AttemptStatus::Abandoned
        );
        if closed {
            if let Some(mut timer) = self.timer.take() {
                timer.cancel();
                tracing::debug!(attempt = %self.attempt.id(), "timer cancelled");
            }
        }
    }
}
