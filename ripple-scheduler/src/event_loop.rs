// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A single OS thread driving a current-thread tokio runtime.
//!
//! Immediate jobs arrive over an unbounded channel and run in submission
//! order. Timed jobs become tasks sleeping on `tokio::time` on the same
//! runtime, so every job of one loop runs on one thread, one at a time.

use crate::logging::{error, trace};
use parking_lot::Mutex;
use ripple_core::callback::catch_callback;
use ripple_core::{CancellationToken, Job};
use ripple_error::{Result, RippleError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep_until, Instant};

enum Command {
    Run(Job),
    RunAt(Instant, Job),
}

pub(crate) struct EventLoop {
    name: String,
    commands: Mutex<Option<UnboundedSender<Command>>>,
    stop: CancellationToken,
}

impl EventLoop {
    /// Start a thread named `name`. If the runtime or the thread cannot be
    /// created the loop is returned stopped and rejects every job.
    pub(crate) fn spawn(name: String) -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let event_loop = Arc::new(Self {
            name: name.clone(),
            commands: Mutex::new(Some(sender)),
            stop: CancellationToken::new(),
        });

        let runtime = match Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("failed to build runtime for scheduler thread {}: {}", name, e);
                event_loop.stop.cancel();
                return event_loop;
            }
        };

        let stop = event_loop.stop.clone();
        let thread_name = name.clone();
        if let Err(e) = thread::Builder::new().name(name).spawn(move || {
            trace!("scheduler thread {} started", thread_name);
            runtime.block_on(run(&thread_name, receiver, stop));
            trace!("scheduler thread {} exited", thread_name);
        }) {
            error!("failed to spawn scheduler thread {}: {}", event_loop.name, e);
            event_loop.stop.cancel();
        }

        event_loop
    }

    pub(crate) fn submit(&self, job: Job) -> Result<()> {
        self.send(Command::Run(job))
    }

    pub(crate) fn submit_after(&self, delay: Duration, job: Job) -> Result<()> {
        if delay.is_zero() {
            return self.submit(job);
        }
        self.send(Command::RunAt(Instant::now() + delay, job))
    }

    /// Discard pending jobs and stop the thread after the running job.
    pub(crate) fn shutdown(&self) {
        self.stop.cancel();
        // Queued jobs may own worker handles: drop the sender outside the lock.
        let sender = self.commands.lock().take();
        drop(sender);
    }

    /// Let the thread exit once it has nothing left to run.
    pub(crate) fn close(&self) {
        let sender = self.commands.lock().take();
        drop(sender);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, command: Command) -> Result<()> {
        if self.stop.is_cancelled() {
            return Err(self.rejected());
        }
        let Some(sender) = self.commands.lock().clone() else {
            return Err(self.rejected());
        };
        sender.send(command).map_err(|_| self.rejected())
    }

    fn rejected(&self) -> RippleError {
        RippleError::scheduler_rejected(format!("{} is shut down", self.name))
    }
}

async fn run(name: &str, mut commands: UnboundedReceiver<Command>, stop: CancellationToken) {
    // Every pending timer holds a clone; `recv` yields `None` once all fired.
    let (timers, mut timers_done) = mpsc::channel::<()>(1);

    loop {
        let command = tokio::select! {
            biased;
            () = stop.cancelled() => return,
            command = commands.recv() => command,
        };

        match command {
            Some(Command::Run(job)) => run_job(name, job),
            Some(Command::RunAt(deadline, job)) => {
                let (timer, stop, name) = (timers.clone(), stop.clone(), name.to_string());
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        () = stop.cancelled() => {}
                        () = sleep_until(deadline) => run_job(&name, job),
                    }
                    drop(timer);
                });
            }
            None => break,
        }
    }

    drop(timers);
    tokio::select! {
        () = stop.cancelled() => {}
        _ = timers_done.recv() => {}
    }
}

fn run_job(name: &str, job: Job) {
    if let Err(e) = catch_callback(job) {
        error!("job on {} panicked: {}", name, e);
    }
}
