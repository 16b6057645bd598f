use chrono::{NaiveDateTime, Timelike};
use rand::Rng;

use super::stop::{schedule_minutes, BusStop, StopProgress};

/// A stop at most this many minutes behind the clock still counts as the
/// current stop.
const CURRENT_WINDOW_MINUTES: i64 = 5;

// Delay model for the simulated disruption feed. The stop the vehicle is at
// reports delays most often, the immediate next stop less, everything
// farther down the line least.
const CURRENT_DELAY_CHANCE: f64 = 0.4;
const NEXT_STOP_DELAY_CHANCE: f64 = 0.3;
const REMOTE_STOP_DELAY_CHANCE: f64 = 0.15;

const CURRENT_DELAY_MINUTES: std::ops::Range<u32> = 5..15;
const UPCOMING_DELAY_MINUTES: std::ops::Range<u32> = 3..11;

/// Reclassifies every stop of a route against the reference instant.
///
/// Derived state is reset first, so repeated calls never accumulate flags.
/// Pass/current classification is fully determined by `stops` and `now`;
/// delay assignment draws from `rng`, which stands in for live disruption
/// telemetry. The output has the same length and order as the input, and a
/// stop whose schedule string cannot be parsed keeps its neutral status
/// wherever it sits.
///
/// When every parseable stop is further than the current window in the
/// past, no stop is current and none is marked passed; all of them roll for
/// a delay as upcoming stops, with the earliest taking the next-stop
/// probability.
pub fn classify_stops<R: Rng>(stops: &[BusStop], now: NaiveDateTime, rng: &mut R) -> Vec<BusStop> {
    let mut updated: Vec<BusStop> = stops
        .iter()
        .map(|stop| BusStop {
            progress: StopProgress::Upcoming,
            delay_minutes: None,
            ..stop.clone()
        })
        .collect();

    let now_minutes = (now.hour() * 60 + now.minute()) as i64;

    // Parseable stops viewed in schedule order. The sort is stable, so
    // equal times keep their input order. Output order stays the input's.
    let mut timed: Vec<(usize, i64)> = updated
        .iter()
        .enumerate()
        .filter_map(|(index, stop)| schedule_minutes(&stop.scheduled).map(|m| (index, m as i64)))
        .collect();
    timed.sort_by_key(|&(_, minutes)| minutes);

    let current_pos = timed
        .iter()
        .position(|&(_, minutes)| minutes - now_minutes >= -CURRENT_WINDOW_MINUTES);

    let next_pos = match current_pos {
        Some(pos) => pos + 1,
        None => 0,
    };

    for (pos, &(index, _)) in timed.iter().enumerate() {
        let stop = &mut updated[index];
        match current_pos {
            Some(current) if pos < current => stop.progress = StopProgress::Passed,
            Some(current) if pos == current => {
                stop.progress = StopProgress::Current;
                if rng.gen_bool(CURRENT_DELAY_CHANCE) {
                    stop.delay_minutes = Some(rng.gen_range(CURRENT_DELAY_MINUTES));
                }
            }
            _ => {
                let chance = if pos == next_pos {
                    NEXT_STOP_DELAY_CHANCE
                } else {
                    REMOTE_STOP_DELAY_CHANCE
                };
                if rng.gen_bool(chance) {
                    stop.delay_minutes = Some(rng.gen_range(UPCOMING_DELAY_MINUTES));
                }
            }
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stop(id: &str, clock: &str) -> BusStop {
        BusStop::new(id, &format!("Stop {}", id), format!("Today / {}", clock))
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn seeded(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn progress_of(stops: &[BusStop]) -> Vec<StopProgress> {
        stops.iter().map(|s| s.progress).collect()
    }

    #[test]
    fn classifies_around_the_current_window() {
        let stops = vec![
            stop("1", "8:00"),
            stop("2", "8:10"),
            stop("3", "8:20"),
            stop("4", "8:30"),
        ];

        // Deltas at 8:22 are -22, -12, -2, +8; the first delta >= -5 is the
        // 8:20 stop.
        let updated = classify_stops(&stops, at(8, 22), &mut seeded(1));

        assert_eq!(
            progress_of(&updated),
            vec![
                StopProgress::Passed,
                StopProgress::Passed,
                StopProgress::Current,
                StopProgress::Upcoming,
            ]
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        // Exactly 5 minutes in the past still counts as current.
        let stops = vec![stop("1", "8:00")];
        let updated = classify_stops(&stops, at(8, 5), &mut seeded(1));
        assert!(updated[0].is_current());

        // Six minutes in the past no longer does.
        let updated = classify_stops(&stops, at(8, 6), &mut seeded(1));
        assert!(!updated[0].is_current());
    }

    #[test]
    fn all_past_marks_nothing() {
        // With every stop more than 5 minutes behind the clock there is no
        // current stop, and no stop is marked passed either.
        let stops = vec![stop("1", "7:00"), stop("2", "7:10"), stop("3", "7:20")];

        for seed in 0..20 {
            let updated = classify_stops(&stops, at(9, 0), &mut seeded(seed));
            assert!(updated.iter().all(|s| !s.is_current() && !s.is_passed()));
        }
    }

    #[test]
    fn at_most_one_current_stop() {
        let stops = vec![
            stop("1", "8:00"),
            stop("2", "8:00"),
            stop("3", "8:10"),
            stop("4", "8:20"),
            stop("5", "8:20"),
        ];

        for hour in 6..11 {
            for minute in (0..60).step_by(7) {
                let updated = classify_stops(&stops, at(hour, minute), &mut seeded(3));
                let currents = updated.iter().filter(|s| s.is_current()).count();
                assert!(currents <= 1, "{} current stops at {}:{:02}", currents, hour, minute);
            }
        }
    }

    #[test]
    fn output_preserves_input_order_and_length() {
        // Input deliberately out of schedule order; classification uses the
        // time-sorted view but the output keeps the input sequence.
        let stops = vec![
            stop("a", "8:30"),
            stop("b", "8:00"),
            stop("c", "8:20"),
            stop("d", "8:10"),
        ];

        let updated = classify_stops(&stops, at(8, 22), &mut seeded(7));

        let ids: Vec<&str> = updated.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(updated[0].progress == StopProgress::Upcoming); // 8:30
        assert!(updated[1].is_passed()); // 8:00
        assert!(updated[2].is_current()); // 8:20
        assert!(updated[3].is_passed()); // 8:10
    }

    #[test]
    fn classification_ignores_the_random_source() {
        let stops = vec![
            stop("1", "8:00"),
            stop("2", "8:10"),
            stop("3", "8:20"),
            stop("4", "8:30"),
        ];

        let first = classify_stops(&stops, at(8, 22), &mut seeded(11));
        let second = classify_stops(&stops, at(8, 22), &mut seeded(99));

        // Delay flags may differ between the two draws, pass/current must
        // not.
        assert_eq!(progress_of(&first), progress_of(&second));
    }

    #[test]
    fn repeated_classification_does_not_accumulate() {
        let stops = vec![stop("1", "8:00"), stop("2", "8:10"), stop("3", "8:40")];

        // First pass leaves the 8:00 stop passed and the 8:10 current.
        let once = classify_stops(&stops, at(8, 12), &mut seeded(5));
        assert!(once[0].is_passed());
        assert!(once[1].is_current());

        // Rewinding the clock on the derived output drops the stale flags.
        let again = classify_stops(&once, at(7, 58), &mut seeded(5));
        assert!(again[0].is_current());
        assert!(!again[0].is_passed());
        assert!(!again[1].is_passed());
        assert!(!again[1].is_current());
    }

    #[test]
    fn invalid_schedule_is_left_neutral() {
        let stops = vec![
            stop("1", "8:00"),
            BusStop::new("2", "Broken", "garbage".to_string()),
            stop("3", "8:20"),
        ];

        for seed in 0..20 {
            let updated = classify_stops(&stops, at(8, 22), &mut seeded(seed));
            assert_eq!(updated[1].id, "2");
            assert_eq!(updated[1].progress, StopProgress::Upcoming);
            assert!(!updated[1].is_delayed());
        }

        // The valid neighbours still classify around it.
        let updated = classify_stops(&stops, at(8, 22), &mut seeded(0));
        assert!(updated[0].is_passed());
        assert!(updated[2].is_current());
    }

    #[test]
    fn passed_stops_never_report_delays() {
        let stops = vec![
            stop("1", "8:00"),
            stop("2", "8:10"),
            stop("3", "8:20"),
            stop("4", "8:30"),
        ];

        for seed in 0..50 {
            let updated = classify_stops(&stops, at(8, 22), &mut seeded(seed));
            for s in updated.iter().filter(|s| s.is_passed()) {
                assert!(!s.is_delayed());
            }
        }
    }

    #[test]
    fn delay_minutes_stay_in_the_model_ranges() {
        let stops = vec![
            stop("1", "8:00"),
            stop("2", "8:10"),
            stop("3", "8:20"),
            stop("4", "8:30"),
            stop("5", "8:40"),
        ];

        let mut saw_current_delay = false;
        let mut saw_upcoming_delay = false;

        for seed in 0..200 {
            let updated = classify_stops(&stops, at(8, 22), &mut seeded(seed));
            for s in &updated {
                let Some(minutes) = s.delay_minutes else {
                    continue;
                };
                if s.is_current() {
                    saw_current_delay = true;
                    assert!((5..15).contains(&minutes), "current delay {}", minutes);
                } else {
                    saw_upcoming_delay = true;
                    assert!((3..11).contains(&minutes), "upcoming delay {}", minutes);
                }
            }
        }

        assert!(saw_current_delay);
        assert!(saw_upcoming_delay);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let updated = classify_stops(&[], at(8, 0), &mut seeded(0));
        assert!(updated.is_empty());
    }
}
