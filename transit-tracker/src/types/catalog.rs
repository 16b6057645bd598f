use chrono::{Duration, NaiveDateTime, Timelike};

use super::line::{LastTrip, Line, LineKind};
use super::stop::BusStop;

/// Minutes between consecutive scheduled stops on a generated board.
const STOP_HEADWAY_MINUTES: u32 = 10;

/// Route ids served by the demo catalog.
pub const ROUTE_IDS: [&str; 7] = ["L3", "L8", "L16", "L19", "T1", "T2", "T3"];

/// Every line in the demo catalog. `now` feeds the lines whose last-trip
/// stamp is relative to the clock.
pub fn lines(now: NaiveDateTime) -> Vec<Line> {
    ROUTE_IDS.iter().map(|id| line_details(id, now)).collect()
}

/// Catalog lookup returning `None` for ids outside the demo network.
pub fn find_line(id: &str, now: NaiveDateTime) -> Option<Line> {
    match id {
        "L3" => Some(Line::new(
            "L3",
            "Line 3",
            LineKind::Bus,
            "Guéliz",
            "Jamaa El-Fna",
            5,
            Some(LastTrip::new("18/05/2023", "19:52")),
        )),
        "L8" => Some(Line::new(
            "L8",
            "Line 8",
            LineKind::Bus,
            "Majorelle Garden",
            "Menara Mall",
            6,
            Some(LastTrip::new("20/05/2023", "14:30")),
        )),
        "T1" => Some(Line::new(
            "T1",
            "Tram 1",
            LineKind::Tram,
            "Airport",
            "Medina",
            10,
            Some(LastTrip::new("20/05/2023", "14:00")),
        )),
        "T2" => {
            // This line's last trip trails the clock by an hour.
            let previous = now - Duration::hours(1);
            Some(Line::new(
                "T2",
                "Tram 2",
                LineKind::Tram,
                "Aéroport",
                "Médina",
                10,
                Some(LastTrip::new(
                    &now.format("%d/%m/%Y").to_string(),
                    &format!("{}:{:02}", previous.hour(), previous.minute()),
                )),
            ))
        }
        "T3" => Some(Line::new(
            "T3",
            "Tram 3",
            LineKind::Tram,
            "Airport",
            "Medina",
            10,
            Some(LastTrip::new("20/05/2023", "15:00")),
        )),
        "L16" | "L19" => Some(fallback_line(id)),
        _ => None,
    }
}

/// Catalog lookup that synthesizes a generic line for unknown ids.
pub fn line_details(id: &str, now: NaiveDateTime) -> Line {
    find_line(id, now).unwrap_or_else(|| fallback_line(id))
}

/// Generic line used for ids without dedicated details. Night-metro ids
/// ("NM 1") get a friendlier name; `M`/`NM` prefixes are trams.
pub fn fallback_line(id: &str) -> Line {
    let name = match id.split_once(' ') {
        Some(("NM", number)) => format!("Night Metro {}", number),
        _ => id.to_string(),
    };
    let kind = if id.starts_with('M') || id.starts_with("NM") {
        LineKind::Tram
    } else {
        LineKind::Bus
    };

    Line::new(
        id,
        &name,
        kind,
        "Marrakech Menara Airport",
        "Jamaa El-Fna Square",
        15,
        Some(LastTrip::new("20/05/2023", "22:15")),
    )
}

/// The stop sequence of a route, with schedule times generated at the
/// standard headway starting from `from`. Unknown ids get the generic
/// sequence.
pub fn stops_for(id: &str, from: NaiveDateTime) -> Vec<BusStop> {
    let names: &[&str] = match id {
        "T1" => &[
            "Tramway Central",
            "Tramway Medina",
            "Tramway Agdal",
            "Tramway Palmeraie",
        ],
        "T2" => &[
            "Aéroport",
            "Marrakesh Station",
            "Guéliz",
            "Jamaa El-Fna",
            "Médina",
        ],
        "T3" => &[
            "Gare Centrale",
            "Majorelle",
            "Avenue Hassan II",
            "Palais Royal",
            "Médina Nord",
        ],
        "L3" => &[
            "Guéliz",
            "Marrakesh Station",
            "Hivernage",
            "Menara Mall",
            "Jamaa El-Fna",
        ],
        "L8" => &[
            "Marrakech Train Station",
            "Avenue Mohammed VI",
            "Menara Mall",
            "Royal Theater",
            "Koutoubia Mosque",
            "Jamaa El-Fna Square",
        ],
        "L16" => &[
            "Airport",
            "Marrakesh Station",
            "Guéliz",
            "Jamaa El-Fna",
            "Medina",
        ],
        "L19" => &[
            "Majorelle Garden",
            "Menara Mall",
            "Koutoubia Mosque",
            "Jamaa El-Fna",
            "Medina",
        ],
        _ => &[
            "Guéliz",
            "Marrakesh Station",
            "Hivernage",
            "Menara Mall",
            "Jamaa El-Fna",
        ],
    };

    let times = arrival_times(from, names.len(), STOP_HEADWAY_MINUTES);
    names
        .iter()
        .zip(times)
        .enumerate()
        .map(|(index, (name, time))| {
            BusStop::new(&(index + 1).to_string(), name, format!("Today / {}", time))
        })
        .collect()
}

/// Generates `count` display times starting from `from`, one every
/// `interval` minutes. Matching the schedule producer this mirrors, the
/// hour is carried on minute overflow but never wrapped at 24, so a board
/// opened late in the evening keeps its stops ordered past midnight.
pub fn arrival_times(from: NaiveDateTime, count: usize, interval: u32) -> Vec<String> {
    let mut hour = from.hour();
    let mut minute = from.minute();

    let mut times = Vec::with_capacity(count);
    for _ in 0..count {
        minute += interval;
        while minute >= 60 {
            hour += 1;
            minute -= 60;
        }
        times.push(format!("{}:{:02}", hour, minute));
    }
    times
}
