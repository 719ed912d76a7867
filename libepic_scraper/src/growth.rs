use std::fmt::{Display, Formatter};

use fxhash::FxHashMap;
use time::PrimitiveDateTime;

use super::table::{Cell, LogSeries, SeriesTable};
use super::timestamp::format_timestamp;

/// Marker phrase EPIC writes when an object changes position.
const MOVE_MARKER: &str = " moved from ";
const MOVE_SEPARATOR: &str = " to ";
/// The reflector passes through the same positions as the sample holders
/// but never corresponds to a growth.
const EXCLUDED_FIXTURE: &str = "Mirror";

/// One parsed movement row from the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub timestamp: PrimitiveDateTime,
    pub object: String,
    pub from_location: String,
    pub to_location: String,
}

/// A growth interval bounded by two movement rows. Pairing is positional
/// (row order): the boundary rows of one growth are expected to be adjacent
/// in the log, and a growth that rolls over midnight into the next day's
/// file cannot be told apart from a same-day growth.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthEvent {
    pub object: String,
    pub start: Transition,
    pub end: Transition,
}

/// Outcome of growth detection for one series. Malformed growth logs are a
/// data-quality condition the operator reviews in the exported sheet, never
/// a process failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GrowthStatus {
    NoMessageColumn,
    NoGrowth,
    Single,
    Multiple(Vec<String>),
    DuplicateNames,
    UnmatchedCounts,
}

impl Display for GrowthStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthStatus::NoMessageColumn => write!(
                f,
                "Error: No Message log detected, can not determine the number of growth events and the start and end of the growth!"
            ),
            GrowthStatus::NoGrowth => write!(f, "No growth detected."),
            GrowthStatus::Single => write!(f, "Single growth detected."),
            GrowthStatus::Multiple(names) => write!(
                f,
                "{} growths detected with the names {}.",
                names.len(),
                names.join(",")
            ),
            GrowthStatus::DuplicateNames => write!(
                f,
                "Error: The same name is used for different growth events! Please use unique names for each growth event."
            ),
            GrowthStatus::UnmatchedCounts => write!(
                f,
                "The number of growth events is not equal to the number of start and end of the growth events!"
            ),
        }
    }
}

/// Detection result: the status, the paired intervals, and the boundary
/// report lines the caller may log or print.
#[derive(Debug, Clone)]
pub struct GrowthReport {
    pub status: GrowthStatus,
    pub events: Vec<GrowthEvent>,
    pub lines: Vec<String>,
}

impl GrowthReport {
    fn terminal(status: GrowthStatus) -> Self {
        Self {
            status,
            events: Vec::new(),
            lines: Vec::new(),
        }
    }
}

fn parse_transition(timestamp: PrimitiveDateTime, message: &str) -> Option<Transition> {
    let (object, rest) = message.split_once(MOVE_MARKER)?;
    let (from_location, to_location) = rest.split_once(MOVE_SEPARATOR)?;
    Some(Transition {
        timestamp,
        object: object.to_string(),
        from_location: from_location.to_string(),
        to_location: to_location.to_string(),
    })
}

fn transitions_table(transitions: &[Transition]) -> SeriesTable {
    let mut table = SeriesTable::new(vec![
        String::from("object"),
        String::from("from"),
        String::from("to"),
    ]);
    for transition in transitions {
        table.push_row(
            transition.timestamp,
            vec![
                Cell::Text(transition.object.clone()),
                Cell::Text(transition.from_location.clone()),
                Cell::Text(transition.to_location.clone()),
            ],
        );
    }
    table
}

/// Detect growth intervals in a series.
///
/// Runs on every series after resampling since growth metadata is attached
/// per series: a series without a message column gets the corresponding
/// status and is otherwise untouched. For event logs, identifier and color
/// columns are dropped, movement rows are parsed into transitions (the
/// reflector excluded), and consecutive rows are paired per object with the
/// pairing validated for well-formedness.
pub fn extract_growth(series: &LogSeries) -> (LogSeries, GrowthReport) {
    let message_index = match series.table.find_column("Message") {
        Some(index) => index,
        None => {
            let report = GrowthReport::terminal(GrowthStatus::NoMessageColumn);
            let updated = series
                .with_table(series.table.clone())
                .with_status(report.status.to_string());
            return (updated, report);
        }
    };

    let messages = series.table.keep_columns(&[message_index]);
    let transitions: Vec<Transition> = messages
        .rows
        .iter()
        .filter_map(|row| {
            let text = row.cells[0].as_text()?;
            if !text.contains(MOVE_MARKER) || text.contains(EXCLUDED_FIXTURE) {
                return None;
            }
            parse_transition(row.timestamp, text)
        })
        .collect();

    if transitions.is_empty() {
        let report = GrowthReport::terminal(GrowthStatus::NoGrowth);
        let updated = series
            .with_table(messages)
            .with_status(report.status.to_string());
        return (updated, report);
    }

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut names: Vec<String> = Vec::new();
    for transition in &transitions {
        let count = counts.entry(transition.object.as_str()).or_insert(0);
        if *count == 0 {
            names.push(transition.object.clone());
        }
        *count += 1;
    }

    let report = if counts.values().any(|count| *count > 2) {
        GrowthReport::terminal(GrowthStatus::DuplicateNames)
    } else if counts.values().any(|count| *count != 2) {
        GrowthReport::terminal(GrowthStatus::UnmatchedCounts)
    } else {
        let events: Vec<GrowthEvent> = transitions
            .chunks(2)
            .map(|pair| GrowthEvent {
                object: pair[0].object.clone(),
                start: pair[0].clone(),
                end: pair[1].clone(),
            })
            .collect();
        let single = transitions.len() == 2;
        let mut lines = Vec::with_capacity(events.len() * 2);
        for event in &events {
            if single {
                lines.push(format!(
                    "Start of the Growth: {}",
                    format_timestamp(&event.start.timestamp)
                ));
                lines.push(format!(
                    "End of the Growth: {}",
                    format_timestamp(&event.end.timestamp)
                ));
            } else {
                lines.push(format!(
                    "Start of the Growth {}: {}",
                    event.start.object,
                    format_timestamp(&event.start.timestamp)
                ));
                lines.push(format!(
                    "End of the Growth {}: {}",
                    event.end.object,
                    format_timestamp(&event.end.timestamp)
                ));
            }
        }
        let status = if single {
            GrowthStatus::Single
        } else {
            GrowthStatus::Multiple(names)
        };
        GrowthReport {
            status,
            events,
            lines,
        }
    };

    let updated = series
        .with_table(transitions_table(&transitions))
        .with_status(report.status.to_string());
    (updated, report)
}
