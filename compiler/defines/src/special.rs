//! Built-in macros describing the build environment.
//!
//! `__DATE__` and `__TIME__` are fixed for the duration of a run, while
//! `__FILE__` and `__LINE__` are special: the engine computes their value
//! every time they are expanded.
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use crate::Definition;

pub const DATE: &str = "__DATE__";
pub const TIME: &str = "__TIME__";
pub const FILE: &str = "__FILE__";
pub const LINE: &str = "__LINE__";

/// The special macros of a single run, computed from one clock reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialMacros {
    date: String,
    time: String,
}
impl SpecialMacros {
    /// Reads the local wall clock
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at<Tz>(now: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            date: now.format("\"%b %d %Y\"").to_string(),
            time: now.format("\"%H:%M:%S\"").to_string(),
        }
    }

    /// The quoted `"Mon DD YYYY"` value of `__DATE__`
    pub fn date(&self) -> &str {
        self.date.as_str()
    }

    /// The quoted `"HH:MM:SS"` value of `__TIME__`
    pub fn time(&self) -> &str {
        self.time.as_str()
    }

    /// The definitions to insert, in insertion order
    pub fn definitions(&self) -> [Definition; 4] {
        [
            Definition::new(DATE, self.date.as_str()),
            Definition::new(TIME, self.time.as_str()),
            Definition::special(FILE),
            Definition::special(LINE),
        ]
    }
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::DefineKind;

    fn fixed(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> SpecialMacros {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(hh, mm, ss))
            .unwrap();
        SpecialMacros::at(Utc.from_utc_datetime(&naive))
    }

    #[test]
    fn date_is_quoted_with_zero_padded_day() {
        let macros = fixed(2024, 3, 5, 7, 8, 9);

        assert_eq!(macros.date(), "\"Mar 05 2024\"");
        assert_eq!(macros.time(), "\"07:08:09\"");
    }

    #[test]
    fn time_uses_24_hour_clock() {
        let macros = fixed(1999, 12, 31, 23, 59, 1);

        assert_eq!(macros.date(), "\"Dec 31 1999\"");
        assert_eq!(macros.time(), "\"23:59:01\"");
    }

    #[test]
    fn file_and_line_are_special() {
        let defs = fixed(2024, 1, 1, 0, 0, 0).definitions();
        let summary = defs
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![
                (DATE, DefineKind::Ordinary),
                (TIME, DefineKind::Ordinary),
                (FILE, DefineKind::Special),
                (LINE, DefineKind::Special),
            ]
        );
    }
}
