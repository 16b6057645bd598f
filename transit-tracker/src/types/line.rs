/// Kind of vehicle serving a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Bus,
    Tram,
}

impl LineKind {
    /// Converts the `LineKind` variant to its display label.
    pub fn as_str(&self) -> &str {
        match self {
            LineKind::Bus => "bus",
            LineKind::Tram => "tram",
        }
    }
}

/// Date and time of the last recorded trip on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LastTrip {
    pub date: String,
    pub time: String,
}

impl LastTrip {
    pub fn new(date: &str, time: &str) -> Self {
        LastTrip {
            date: date.to_string(),
            time: time.to_string(),
        }
    }
}

/// A transit line with its endpoints and single-trip fare in MAD.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: String,
    pub name: String,
    pub kind: LineKind,
    pub from: String,
    pub to: String,
    pub price: u32,
    pub last_trip: Option<LastTrip>,
}

impl Line {
    pub fn new(
        id: &str,
        name: &str,
        kind: LineKind,
        from: &str,
        to: &str,
        price: u32,
        last_trip: Option<LastTrip>,
    ) -> Self {
        Line {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            from: from.to_string(),
            to: to.to_string(),
            price,
            last_trip,
        }
    }
}
