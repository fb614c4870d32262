//! Time-window parsing and per-client consolidation.
//!
//! Overlapping windows of the same client are intersected, not unioned:
//! two overlapping constraints leave only the span satisfying both. A run
//! whose intersection is empty (start after end) is dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::records::{client_location_id, WindowRecord};

/// Minutes in a planning day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// A closed interval of minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub const FULL_DAY: TimeWindow = TimeWindow {
        start: 0,
        end: MINUTES_PER_DAY,
    };

    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// `00:00 - 00:00`, the warehouse's way of saying "never open".
    pub fn is_closed(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn contains(&self, minute: i64) -> bool {
        self.start <= minute && minute <= self.end
    }
}

/// Convert `HH:MM[:SS]` to minutes since midnight.
///
/// Blank or unparsable values yield 0 (midnight). Seconds are ignored and
/// values past `24:00` are clamped to the end of the day.
pub fn parse_minutes(raw: &str) -> i64 {
    let mut parts = raw.trim().split(':');
    let hours = parts.next().and_then(|h| h.trim().parse::<u32>().ok());
    let minutes = parts.next().and_then(|m| m.trim().parse::<u32>().ok());

    match (hours, minutes) {
        (Some(h), Some(m)) => (i64::from(h) * 60 + i64::from(m)).min(MINUTES_PER_DAY),
        _ => 0,
    }
}

/// A consolidated window together with the process tag that opened it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientWindow {
    pub window: TimeWindow,
    pub process: String,
}

/// Result of consolidating one client's windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consolidation {
    /// Valid, sorted, non-overlapping windows.
    pub windows: Vec<ClientWindow>,
    /// Intersections that came out empty.
    pub dropped: Vec<TimeWindow>,
}

/// Sweep one client's windows, intersecting overlapping runs.
pub fn consolidate_tagged(windows: &[ClientWindow]) -> Consolidation {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| (w.window.start, w.window.end));

    let mut result = Consolidation::default();
    let mut iter = sorted.into_iter();
    let Some(mut running) = iter.next() else {
        return result;
    };

    for next in iter {
        if next.window.start <= running.window.end {
            running.window = TimeWindow::new(
                running.window.start.max(next.window.start),
                running.window.end.min(next.window.end),
            );
        } else {
            flush(&mut result, running);
            running = next;
        }
    }
    flush(&mut result, running);

    result
}

fn flush(result: &mut Consolidation, window: ClientWindow) {
    if window.window.is_valid() {
        result.windows.push(window);
    } else {
        result.dropped.push(window.window);
    }
}

/// Untagged form of [`consolidate_tagged`].
pub fn consolidate(windows: &[TimeWindow]) -> Vec<TimeWindow> {
    let tagged: Vec<ClientWindow> = windows
        .iter()
        .map(|&window| ClientWindow {
            window,
            process: String::new(),
        })
        .collect();

    consolidate_tagged(&tagged)
        .windows
        .into_iter()
        .map(|w| w.window)
        .collect()
}

/// Options controlling how raw window records are read.
#[derive(Debug, Clone, Default)]
pub struct WindowFilter<'a> {
    /// Keep only records with this process tag.
    pub process: Option<&'a str>,
    /// Read a raw `00:00 - 00:00` record as the full day instead of closed.
    pub open_unset: bool,
}

/// Group raw records by client location id and consolidate each group.
pub fn consolidate_records(
    records: &[WindowRecord],
    filter: &WindowFilter<'_>,
) -> BTreeMap<String, Vec<ClientWindow>> {
    let mut grouped: BTreeMap<String, Vec<ClientWindow>> = BTreeMap::new();

    for record in records {
        if let Some(process) = filter.process {
            if record.process != process {
                continue;
            }
        }

        let mut window = TimeWindow::new(parse_minutes(&record.start), parse_minutes(&record.end));
        if filter.open_unset && window.is_closed() {
            window = TimeWindow::FULL_DAY;
        }

        grouped
            .entry(client_location_id(&record.client_id))
            .or_default()
            .push(ClientWindow {
                window,
                process: record.process.clone(),
            });
    }

    grouped
        .into_iter()
        .map(|(client, windows)| {
            let consolidation = consolidate_tagged(&windows);
            for dropped in &consolidation.dropped {
                warn!(
                    client = %client,
                    start = dropped.start,
                    end = dropped.end,
                    "dropping empty time window"
                );
            }
            (client, consolidation.windows)
        })
        .collect()
}
