//! [`Schedule`] definitions.

use std::fmt;

use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use time::Date;

#[cfg(doc)]
use super::Listing;
use super::{Id, Link, Name};

/// Seasons and upcoming dates of a [`Listing`].
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    /// ID of the [`Listing`] this [`Schedule`] belongs to.
    pub listing: Id,

    /// Played [`Season`]s, ordered by their [`SeasonNumber`]s.
    pub seasons: Vec<Season>,

    /// Announced dates of the next season, in the order they were provided.
    pub next_dates: Vec<NextDate>,
}

impl Schedule {
    /// Creates a new [`Schedule`], ordering the provided `seasons` by their
    /// [`SeasonNumber`]s.
    #[must_use]
    pub fn new(
        listing: Id,
        mut seasons: Vec<Season>,
        next_dates: Vec<NextDate>,
    ) -> Self {
        seasons.sort_by_key(|s| s.number);
        Self {
            listing,
            seasons,
            next_dates,
        }
    }

    /// Creates an empty [`Schedule`] of the [`Listing`] with the provided
    /// [`Id`].
    #[must_use]
    pub fn empty(listing: Id) -> Self {
        Self::new(listing, vec![], vec![])
    }
}

/// Season of a [`Listing`].
#[derive(Clone, Debug, PartialEq)]
pub struct Season {
    /// [`SeasonNumber`] of this [`Season`].
    pub number: SeasonNumber,

    /// Name of this [`Season`], if it has one.
    pub name: Option<Name>,

    /// External page of this [`Season`].
    pub link: Option<Link>,
}

impl Season {
    /// Returns the human-readable label of this [`Season`]: its name, or its
    /// number if it has none.
    #[must_use]
    pub fn label(&self) -> String {
        self.name.as_ref().map_or_else(
            || format!("Season {}", self.number),
            ToString::to_string,
        )
    }
}

/// Number of a [`Season`], from `1` to `100`.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct SeasonNumber(i16);

impl SeasonNumber {
    /// Lowest [`SeasonNumber`].
    pub const MIN: i16 = 1;

    /// Highest [`SeasonNumber`].
    pub const MAX: i16 = 100;

    /// Creates a new [`SeasonNumber`] if the given `number` is in range.
    #[must_use]
    pub fn new(number: i16) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&number)
            .then_some(Self(number))
    }
}

/// Custom label of a [`NextDate`], like `Fall 2025`.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct DateLabel(String);

impl DateLabel {
    /// Maximum length of a [`DateLabel`] in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`DateLabel`] if the given `label` is trimmed, non-empty
    /// and fits the length limit.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        (label.trim() == label
            && !label.is_empty()
            && label.chars().count() <= Self::MAX_LEN)
            .then_some(Self(label))
    }
}

/// Announced date (or date range) of the next season of a [`Listing`].
///
/// Displayed as its [`DateLabel`] if any, otherwise as its dates:
/// - `April 01, 2025` for a single day;
/// - `April 01–05, 2025` within a month;
/// - `April 28 – May 02, 2025` within a year;
/// - `December 30, 2025 – January 02, 2026` otherwise;
/// - `TBD` without a start date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NextDate {
    /// First day of the season.
    pub start: Option<Date>,

    /// Last day of the season.
    pub end: Option<Date>,

    /// [`DateLabel`] overriding the dates display.
    pub label: Option<DateLabel>,
}

impl NextDate {
    /// Indicates whether this [`NextDate`] ends before it starts.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if e < s)
    }
}

impl fmt::Display for NextDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// Writes `April 01`.
        fn month_day(d: Date) -> String {
            format!("{} {:02}", d.month(), d.day())
        }

        if let Some(label) = &self.label {
            return write!(f, "{label}");
        }
        match (self.start, self.end) {
            (Some(s), Some(e)) if s != e => {
                if (s.year(), s.month()) == (e.year(), e.month()) {
                    write!(f, "{}–{:02}, {}", month_day(s), e.day(), e.year())
                } else if s.year() == e.year() {
                    write!(
                        f,
                        "{} – {}, {}",
                        month_day(s),
                        month_day(e),
                        e.year(),
                    )
                } else {
                    write!(
                        f,
                        "{}, {} – {}, {}",
                        month_day(s),
                        s.year(),
                        month_day(e),
                        e.year(),
                    )
                }
            }
            (Some(s), _) => write!(f, "{}, {}", month_day(s), s.year()),
            (None, _) => write!(f, "TBD"),
        }
    }
}

#[cfg(test)]
mod spec {
    use time::{Date, Month};

    use crate::domain::listing::{Id, Name};

    use super::{DateLabel, NextDate, Schedule, Season, SeasonNumber};

    fn date(y: i32, m: Month, d: u8) -> Option<Date> {
        Some(Date::from_calendar_date(y, m, d).unwrap())
    }

    fn next(start: Option<Date>, end: Option<Date>) -> String {
        NextDate {
            start,
            end,
            label: None,
        }
        .to_string()
    }

    #[test]
    fn displays_dates() {
        use Month::{April, December, January, May};

        assert_eq!(next(date(2025, April, 1), None), "April 01, 2025");
        assert_eq!(
            next(date(2025, April, 1), date(2025, April, 1)),
            "April 01, 2025",
        );
        assert_eq!(
            next(date(2025, April, 1), date(2025, April, 5)),
            "April 01–05, 2025",
        );
        assert_eq!(
            next(date(2025, April, 28), date(2025, May, 2)),
            "April 28 – May 02, 2025",
        );
        assert_eq!(
            next(date(2025, December, 30), date(2026, January, 2)),
            "December 30, 2025 – January 02, 2026",
        );
        assert_eq!(
            next(date(2025, April, 1), date(2026, April, 3)),
            "April 01, 2025 – April 03, 2026",
        );
        assert_eq!(next(None, date(2025, April, 5)), "TBD");
        assert_eq!(next(None, None), "TBD");
    }

    #[test]
    fn prefers_custom_label() {
        let dates = NextDate {
            start: date(2025, Month::April, 1),
            end: None,
            label: DateLabel::new("Spring 2025"),
        };

        assert_eq!(dates.to_string(), "Spring 2025");
        assert!(DateLabel::new(" Spring").is_none());
        assert!(DateLabel::new("x".repeat(101)).is_none());
    }

    #[test]
    fn detects_reversed_range() {
        let dates = NextDate {
            start: date(2025, Month::May, 2),
            end: date(2025, Month::April, 28),
            label: None,
        };

        assert!(dates.is_reversed());
        assert!(!NextDate::default().is_reversed());
    }

    #[test]
    fn labels_seasons() {
        let named = Season {
            number: SeasonNumber::new(1).unwrap(),
            name: Name::new("Borneo"),
            link: None,
        };
        let unnamed = Season {
            number: SeasonNumber::new(2).unwrap(),
            name: None,
            link: None,
        };

        assert_eq!(named.label(), "Borneo");
        assert_eq!(unnamed.label(), "Season 2");
        assert!(SeasonNumber::new(0).is_none());
        assert!(SeasonNumber::new(100).is_some());
        assert!(SeasonNumber::new(101).is_none());

        let schedule = Schedule::new(Id::new(), vec![unnamed, named], vec![]);
        assert_eq!(schedule.seasons[0].label(), "Borneo");
    }
}
