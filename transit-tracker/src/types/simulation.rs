use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use logger::{Color, Logger};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::board::RouteBoard;
use super::card::{TransitCard, DEMO_USER_ID};
use super::catalog;
use super::timer::Timer;
use super::tracker_error::TrackerError;

/// Milliseconds between console repaints in the live board view.
const DISPLAY_REFRESH_MILLIS: u64 = 1_000;

/// Manages the overall state of the tracker.
///
/// The `Simulation` owns the open route boards, the demo transit card, the
/// clock timer and the random source feeding the delay model. Every timer
/// tick re-derives the statuses of all open boards; a manual refresh runs
/// the same computation outside the tick cadence.
pub struct Simulation {
    pub boards: Arc<RwLock<HashMap<String, Arc<RwLock<RouteBoard>>>>>,
    pub card: TransitCard,
    pub timer: Arc<Timer>,
    rng: Arc<Mutex<StdRng>>,
    logger: Logger,
}

impl Simulation {
    /// Creates a new simulation with the demo card and an entropy-seeded
    /// delay source.
    pub fn new(timer: Arc<Timer>, logger: Logger) -> Self {
        Simulation {
            boards: Arc::new(RwLock::new(HashMap::new())),
            card: TransitCard::demo(DEMO_USER_ID),
            timer,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            logger,
        }
    }

    /// Starts the timer thread; every tick refreshes all open boards.
    pub fn start(&self) -> Result<(), TrackerError> {
        let boards = Arc::clone(&self.boards);
        let rng = Arc::clone(&self.rng);
        let logger = self.logger.clone();
        let timer = Arc::clone(&self.timer);

        timer.start(move |current_time, _tick_count| {
            let boards_lock = match boards.try_read() {
                Ok(lock) => lock,
                Err(_) => {
                    let _ = logger.warn("Failed to read boards. Skipping this cycle.", false);
                    return;
                }
            };
            let mut rng_lock = match rng.lock() {
                Ok(lock) => lock,
                Err(_) => {
                    let _ = logger.warn("Delay source unavailable. Skipping this cycle.", false);
                    return;
                }
            };

            for board_arc in boards_lock.values() {
                match board_arc.try_write() {
                    Ok(mut board_lock) => board_lock.refresh(current_time, &mut *rng_lock),
                    Err(_) => {
                        let _ = logger.warn("Failed to lock board for refresh. Skipping.", false);
                    }
                }
            }
        })
    }

    /// Opens a live board for `route_id`. The line fare is checked against
    /// the card balance first; an insufficient balance only warns, it does
    /// not block the board. Reopening a route replaces its previous board.
    pub fn open_route(&self, route_id: &str) -> Result<(), TrackerError> {
        let now = self.timer.now()?;

        let line = match catalog::find_line(route_id, now) {
            Some(line) => line,
            None => {
                let _ = self.logger.warn(
                    &format!("Unknown route {}. Using the generic line.", route_id),
                    false,
                );
                catalog::fallback_line(route_id)
            }
        };

        if !self.card.covers(line.price) {
            let _ = self.logger.warn(
                &format!(
                    "Low balance: your current balance ({} MAD) is insufficient for this trip ({} MAD). Please add credit to your card.",
                    self.card.balance, line.price
                ),
                true,
            );
        }

        let stops = catalog::stops_for(route_id, now);
        let board = {
            let mut rng_lock = self
                .rng
                .lock()
                .map_err(|_| TrackerError::Other("Failed to lock delay source".to_string()))?;
            RouteBoard::open(line, stops, now, &mut *rng_lock)
        };

        let _ = self.logger.info(
            &format!(
                "Opened route {} ({}) with {} stops.",
                route_id,
                board.line.name,
                board.stops.len()
            ),
            Color::Green,
            false,
        );

        let mut boards_lock = self
            .boards
            .write()
            .map_err(|_| TrackerError::BoardLock("Failed to lock boards".to_string()))?;
        boards_lock.insert(route_id.to_string(), Arc::new(RwLock::new(board)));

        Ok(())
    }

    /// Drops the board of `route_id`.
    pub fn close_route(&self, route_id: &str) -> Result<(), TrackerError> {
        let mut boards_lock = self
            .boards
            .write()
            .map_err(|_| TrackerError::BoardLock("Failed to lock boards".to_string()))?;

        match boards_lock.remove(route_id) {
            Some(_) => {
                let _ = self
                    .logger
                    .info(&format!("Closed route {}.", route_id), Color::Green, false);
                Ok(())
            }
            None => Err(TrackerError::BoardNotOpen(route_id.to_string())),
        }
    }

    /// Manually refreshes the board of `route_id`, outside the tick
    /// cadence. Same computation as the periodic refresh.
    pub fn refresh_route(&self, route_id: &str) -> Result<(), TrackerError> {
        let board_arc = self.board(route_id)?;
        let now = self.timer.now()?;

        let mut rng_lock = self
            .rng
            .lock()
            .map_err(|_| TrackerError::Other("Failed to lock delay source".to_string()))?;
        let mut board_lock = board_arc
            .write()
            .map_err(|_| TrackerError::BoardLock(route_id.to_string()))?;
        board_lock.refresh(now, &mut *rng_lock);

        Ok(())
    }

    /// Displays the live board of `route_id`, repainting until the user
    /// presses enter. With `delayed_only`, shows only stops reporting a
    /// delay.
    pub fn display_board(&self, route_id: &str, delayed_only: bool) -> Result<(), TrackerError> {
        let board_arc = self.board(route_id)?;

        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut buffer = String::new();
            loop {
                buffer.clear();
                if io::stdin().read_line(&mut buffer).is_ok() && !buffer.trim().is_empty() {
                    tx.send(()).ok();
                    break;
                }
                thread::sleep(Duration::from_millis(100));
            }
        });

        loop {
            io::stdout().flush().ok();

            if let Ok(board_lock) = board_arc.try_read() {
                print!("\x1B[2J\x1B[1;1H");
                if let Ok(time) = self.timer.now() {
                    println!("Current time: {}", time.format("%d-%m-%Y %H:%M:%S"));
                }

                let line = &board_lock.line;
                println!(
                    "{} ({})  {} -> {}  fare: {} MAD",
                    line.name,
                    line.kind.as_str(),
                    line.from,
                    line.to,
                    line.price
                );
                if let Some(last_trip) = &line.last_trip {
                    println!("Last trip: {} {}", last_trip.date, last_trip.time);
                }
                println!(
                    "Last updated: {}\n",
                    board_lock.last_updated.format("%H:%M:%S")
                );

                let rows: Vec<_> = if delayed_only {
                    board_lock.delayed_stops()
                } else {
                    board_lock.stops.iter().collect()
                };

                if rows.is_empty() {
                    println!("No delayed stops reported.");
                } else {
                    println!(
                        "{:<4} {:<28} {:<16} {:<10} {:<8}",
                        "#", "Stop", "Scheduled", "Status", "Delay"
                    );
                    for stop in rows {
                        let delay = match stop.delay_minutes {
                            Some(minutes) => format!("+{} min", minutes),
                            None => String::new(),
                        };
                        println!(
                            "{:<4} {:<28} {:<16} {:<10} {:<8}",
                            stop.id,
                            stop.name,
                            stop.scheduled,
                            stop.progress.as_str(),
                            delay
                        );
                    }
                }

                println!("\nPress 'q' and Enter to exit board mode");
            }

            if rx.try_recv().is_ok() {
                break;
            }

            thread::sleep(Duration::from_millis(DISPLAY_REFRESH_MILLIS));
        }

        Ok(())
    }

    /// Lists the line catalog.
    pub fn list_lines(&self) -> Result<(), TrackerError> {
        let now = self.timer.now()?;

        println!(
            "\n{:<6} {:<14} {:<6} {:<26} {:<26} {:<6}",
            "Id", "Name", "Kind", "From", "To", "Fare"
        );
        for line in catalog::lines(now) {
            println!(
                "{:<6} {:<14} {:<6} {:<26} {:<26} {:<6}",
                line.id,
                line.name,
                line.kind.as_str(),
                line.from,
                line.to,
                line.price
            );
        }

        Ok(())
    }

    /// Changes the simulated seconds elapsed per tick.
    pub fn set_time_rate(&self, seconds: i64) -> Result<(), TrackerError> {
        self.timer.set_tick_advance(seconds)
    }

    pub fn pause(&self) {
        self.timer.pause();
    }

    pub fn resume(&self) {
        self.timer.resume();
    }

    /// Stops the timer thread. Called unconditionally on shutdown.
    pub fn stop(&self) {
        self.timer.stop();
    }

    fn board(&self, route_id: &str) -> Result<Arc<RwLock<RouteBoard>>, TrackerError> {
        let boards_lock = self
            .boards
            .read()
            .map_err(|_| TrackerError::BoardLock("Failed to read boards".to_string()))?;
        boards_lock
            .get(route_id)
            .cloned()
            .ok_or_else(|| TrackerError::BoardNotOpen(route_id.to_string()))
    }
}
