use chrono::{Duration, NaiveDateTime};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
    thread,
    time::{Duration as StdDuration, Instant},
};

use super::tracker_error::TrackerError;
use super::TICK_FREQUENCY_MILLIS;

/// Simulated seconds added per tick by default. Matches the tick cadence,
/// so out of the box the clock tracks wall time.
pub const DEFAULT_TICK_ADVANCE_SECS: i64 = (TICK_FREQUENCY_MILLIS / 1000) as i64;

/// Upper bound for `set_tick_advance`, one simulated day per tick.
const MAX_TICK_ADVANCE_SECS: i64 = 86_400;

/// Drives the simulation clock.
///
/// The clock starts from the instant given at construction and advances a
/// configurable number of seconds on every tick; the tick callback receives
/// the fresh clock value. Raising the advance fast-forwards a demo without
/// touching the tick cadence.
pub struct Timer {
    pub current_time: Mutex<NaiveDateTime>,
    pub tick_advance: RwLock<Duration>,
    pub running: AtomicBool,
    pub paused: AtomicBool,
}

impl Timer {
    /// Creates a new timer advancing `tick_advance_secs` per tick.
    pub fn new(start_time: NaiveDateTime, tick_advance_secs: i64) -> Arc<Self> {
        Arc::new(Self {
            current_time: Mutex::new(start_time),
            tick_advance: RwLock::new(Duration::seconds(tick_advance_secs)),
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
        })
    }

    /// The clock's current value.
    pub fn now(&self) -> Result<NaiveDateTime, TrackerError> {
        let time_lock = self
            .current_time
            .lock()
            .map_err(|_| TrackerError::TimerLock("Failed to read current_time.".to_string()))?;
        Ok(*time_lock)
    }

    /// Changes how much simulated time passes per tick.
    pub fn set_tick_advance(&self, new_tick_advance_secs: i64) -> Result<(), TrackerError> {
        if new_tick_advance_secs <= 0 || new_tick_advance_secs > MAX_TICK_ADVANCE_SECS {
            return Err(TrackerError::InvalidDuration(
                new_tick_advance_secs.to_string(),
            ));
        }

        let mut tick_advance_lock = self.tick_advance.write().map_err(|_| {
            TrackerError::TimerLock("Failed to acquire write lock for tick_advance.".to_string())
        })?;
        *tick_advance_lock = Duration::seconds(new_tick_advance_secs);
        Ok(())
    }

    /// Stops the timer thread for good.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Pauses the clock until `resume` is called.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes a paused clock.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    // Advances the clock by one tick and returns the new value.
    fn advance(&self) -> Result<NaiveDateTime, TrackerError> {
        let tick_advance = *self.tick_advance.read().map_err(|_| {
            TrackerError::TimerLock("Failed to acquire read lock on tick_advance.".to_string())
        })?;

        let mut time_lock = self
            .current_time
            .lock()
            .map_err(|_| TrackerError::TimerLock("Failed to lock current_time.".to_string()))?;
        *time_lock += tick_advance;
        Ok(*time_lock)
    }

    /// Starts the timer thread, running `tick_callback` on every tick with
    /// the fresh clock value and the tick count.
    pub fn start(
        self: Arc<Self>,
        tick_callback: impl Fn(NaiveDateTime, usize) + Send + 'static,
    ) -> Result<(), TrackerError> {
        thread::Builder::new()
            .name("timer-thread".to_string())
            .spawn(move || {
                let mut tick_count = 0;
                while self.running.load(Ordering::SeqCst) {
                    // A paused clock neither advances nor fires callbacks,
                    // but it still honors stop().
                    while self.paused.load(Ordering::SeqCst) && self.running.load(Ordering::SeqCst)
                    {
                        thread::sleep(StdDuration::from_millis(100));
                    }
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }

                    let tick_started = Instant::now();

                    let current_time = match self.advance() {
                        Ok(time) => time,
                        Err(e) => {
                            eprintln!("{} Skipping tick.", e);
                            thread::sleep(StdDuration::from_millis(TICK_FREQUENCY_MILLIS));
                            continue;
                        }
                    };

                    tick_count += 1;
                    tick_callback(current_time, tick_count);

                    let elapsed = tick_started.elapsed();
                    let sleep_duration =
                        StdDuration::from_millis(TICK_FREQUENCY_MILLIS).saturating_sub(elapsed);
                    thread::sleep(sleep_duration);
                }
            })
            .map_err(|_| {
                TrackerError::TimerStart("Failed to start the timer thread.".to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn tick_advance_bounds_are_enforced() {
        let timer = Timer::new(at(9, 0), DEFAULT_TICK_ADVANCE_SECS);

        assert!(timer.set_tick_advance(0).is_err());
        assert!(timer.set_tick_advance(-60).is_err());
        assert!(timer.set_tick_advance(MAX_TICK_ADVANCE_SECS + 1).is_err());
        assert!(timer.set_tick_advance(60).is_ok());
    }

    #[test]
    fn advance_moves_the_clock() {
        let timer = Timer::new(at(9, 0), 90);

        assert_eq!(timer.now().unwrap(), at(9, 0));
        assert_eq!(timer.advance().unwrap(), at(9, 1) + Duration::seconds(30));
        assert_eq!(timer.now().unwrap(), at(9, 1) + Duration::seconds(30));
    }

    #[test]
    fn pause_and_stop_flip_the_flags() {
        let timer = Timer::new(at(9, 0), DEFAULT_TICK_ADVANCE_SECS);

        timer.pause();
        assert!(timer.paused.load(Ordering::SeqCst));
        timer.resume();
        assert!(!timer.paused.load(Ordering::SeqCst));
        timer.stop();
        assert!(!timer.running.load(Ordering::SeqCst));
    }
}
