//! Daily scan scheduling
//!
//! `DailyScheduler` is a plain state machine driven by `tick(now)`, so tests
//! inject their own clock. `ScanScheduler` polls it from a tokio task.

use crate::core::runtime::ScanContext;
use crate::report::ReportSink;
use chrono::{DateTime, Local, TimeZone};
use cron::Schedule;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Local time of day the daily scan fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTime {
    hour: u32,
    minute: u32,
}

impl ScanTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, String> {
        if hour > 23 {
            return Err(format!("hour {} is outside 0-23", hour));
        }
        if minute > 59 {
            return Err(format!("minute {} is outside 0-59", minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Cron format: second minute hour day month weekday
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }

    pub fn schedule(&self) -> Result<Schedule, cron::error::Error> {
        Schedule::from_str(&self.cron_expression())
    }
}

impl Default for ScanTime {
    fn default() -> Self {
        Self { hour: 8, minute: 30 }
    }
}

impl FromStr for ScanTime {
    type Err = String;

    /// Parses 24-hour `HH:MM` (a single-digit hour is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;

        let field = |raw: &str, name: &str| -> Result<u32, String> {
            if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("{} '{}' is not a number", name, raw));
            }
            raw.parse::<u32>().map_err(|e| e.to_string())
        };

        Self::new(field(hour, "hour")?, field(minute, "minute")?)
    }
}

impl fmt::Display for ScanTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Fires once per calendar day at a fixed time of day in `Tz`.
pub struct DailyScheduler<Tz: TimeZone> {
    time: ScanTime,
    schedule: Schedule,
    next_fire: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> DailyScheduler<Tz> {
    /// Arm for the first occurrence of `time` strictly after `now`.
    pub fn new(time: ScanTime, now: &DateTime<Tz>) -> Result<Self, cron::error::Error> {
        let schedule = time.schedule()?;
        let next_fire = schedule.after(now).next();
        Ok(Self {
            time,
            schedule,
            next_fire,
        })
    }

    pub fn time(&self) -> ScanTime {
        self.time
    }

    pub fn next_fire(&self) -> Option<&DateTime<Tz>> {
        self.next_fire.as_ref()
    }

    /// True when the armed instant has been reached. Re-arms for the next
    /// occurrence after `now`, so missed days collapse into a single fire.
    pub fn tick(&mut self, now: &DateTime<Tz>) -> bool {
        let due = matches!(&self.next_fire, Some(next) if now >= next);
        if due {
            self.next_fire = self.schedule.after(now).next();
        }
        due
    }
}

/// Runs the full scan every day at the configured local time and hands the
/// rendered report to a sink.
pub struct ScanScheduler {
    context: Arc<ScanContext>,
    sink: Arc<dyn ReportSink>,
    time: ScanTime,
    poll_interval: Duration,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    pub fn new(context: Arc<ScanContext>, sink: Arc<dyn ReportSink>, time: ScanTime) -> Self {
        Self {
            context,
            sink,
            time,
            poll_interval: DEFAULT_POLL_INTERVAL,
            handle: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start the polling task. Calling it on a running scheduler is a no-op.
    pub async fn start(&self) -> Result<(), cron::error::Error> {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            warn!("ScanScheduler: already running");
            return Ok(());
        }

        let mut daily = DailyScheduler::new(self.time, &Local::now())?;
        info!(
            time = %daily.time(),
            cron = %daily.time().cron_expression(),
            next = ?daily.next_fire(),
            "ScanScheduler: daily scan at {} local time",
            daily.time()
        );

        let context = self.context.clone();
        let sink = self.sink.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            loop {
                interval.tick().await;
                if !daily.tick(&Local::now()) {
                    continue;
                }

                info!("ScanScheduler: starting scheduled scan");
                let scan = context.run_full_scan().await;
                info!(
                    equities = scan.equities.len(),
                    crypto = scan.crypto.len(),
                    next = ?daily.next_fire(),
                    "ScanScheduler: scheduled scan finished"
                );

                if let Err(e) = sink.deliver(&scan.render()).await {
                    error!(error = %e, "ScanScheduler: failed to deliver report");
                }
            }
        });

        *guard = Some(handle);
        Ok(())
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("ScanScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
