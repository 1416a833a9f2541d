//! # Due-date windows
//!
//! A ticket carries a quick-select due mode instead of a raw date; the
//! composer resolves it against the creation date into a concrete
//! [DueWindow] and prints a banner with the explicit range, so the printed
//! ticket stays meaningful on a fridge door weeks later.

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;

/// The due-date quick-select of a ticket
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
pub enum DueMode {
    /// An explicit date
    Date(NaiveDate),
    /// The Monday-Sunday week containing the creation date
    ThisWeek,
    /// The following Monday-Sunday week
    NextWeek,
    /// The calendar month containing the creation date
    ThisMonth,
    /// No due date
    #[default]
    None,
}

/// A resolved due range, `start <= end`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DueWindow {
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
}

impl DueMode {
    /// Resolve the mode against the creation date
    pub fn resolve(self, created: NaiveDate) -> Option<DueWindow> {
        match self {
            DueMode::Date(d) => Some(DueWindow { start: d, end: d }),
            DueMode::ThisWeek => {
                let start = monday_of(created)?;
                let end = start.checked_add_days(Days::new(6))?;
                Some(DueWindow { start, end })
            }
            DueMode::NextWeek => {
                let start = monday_of(created)?.checked_add_days(Days::new(7))?;
                let end = start.checked_add_days(Days::new(6))?;
                Some(DueWindow { start, end })
            }
            DueMode::ThisMonth => {
                let start = created.with_day(1)?;
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
                };
                let end = next.checked_sub_days(Days::new(1))?;
                Some(DueWindow { start, end })
            }
            DueMode::None => None,
        }
    }

    /// The banner lines printed below the title
    pub fn banner_lines(self, created: NaiveDate) -> Vec<String> {
        let window = self.resolve(created);
        match (self, window) {
            (DueMode::ThisWeek, Some(w)) => vec![
                "DUE: THIS WEEK".to_string(),
                format!("{} \u{2013} {}", w.start.format("%a %b %d"), w.end.format("%a %b %d")),
            ],
            (DueMode::NextWeek, Some(w)) => vec![
                "DUE: NEXT WEEK".to_string(),
                format!("{} \u{2013} {}", w.start.format("%a %b %d"), w.end.format("%a %b %d")),
            ],
            (DueMode::ThisMonth, Some(w)) => vec![
                "DUE: THIS MONTH".to_string(),
                format!("{} \u{2013} {}", w.start.format("%Y-%m-%d"), w.end.format("%Y-%m-%d")),
            ],
            (DueMode::Date(_), Some(w)) => {
                vec![format!("DUE: DATE: {}", w.start.format("%Y-%m-%d"))]
            }
            _ => vec!["DUE: NONE".to_string()],
        }
    }
}

fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
}
