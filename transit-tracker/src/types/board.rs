use chrono::NaiveDateTime;
use rand::Rng;

use super::line::Line;
use super::status::classify_stops;
use super::stop::BusStop;

/// Live status board for one route.
///
/// The stop sequence is fixed when the board is opened; refreshes only
/// recompute the derived statuses. A board lives as long as the route view
/// that opened it and is dropped with it.
#[derive(Debug, Clone)]
pub struct RouteBoard {
    pub line: Line,
    pub stops: Vec<BusStop>,
    pub opened_at: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}

impl RouteBoard {
    /// Opens a board and runs the initial classification.
    pub fn open<R: Rng>(line: Line, stops: Vec<BusStop>, now: NaiveDateTime, rng: &mut R) -> Self {
        let mut board = RouteBoard {
            line,
            stops,
            opened_at: now,
            last_updated: now,
        };
        board.refresh(now, rng);
        board
    }

    /// Recomputes every stop status against `now`. The periodic tick and a
    /// manual refresh both come through here.
    pub fn refresh<R: Rng>(&mut self, now: NaiveDateTime, rng: &mut R) {
        self.stops = classify_stops(&self.stops, now, rng);
        self.last_updated = now;
    }

    /// Stops currently reporting a delay.
    pub fn delayed_stops(&self) -> Vec<&BusStop> {
        self.stops.iter().filter(|stop| stop.is_delayed()).collect()
    }

    /// The stop the vehicle is judged to be at, if any.
    pub fn current_stop(&self) -> Option<&BusStop> {
        self.stops.iter().find(|stop| stop.is_current())
    }
}
