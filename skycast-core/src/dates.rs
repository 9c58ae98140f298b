//! Locale- and timezone-aware date rendering for presentation code.
//!
//! A [`DateFormatter`] is built once at startup and handed to whatever needs to render
//! timestamps. It never changes after construction.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};

pub use chrono::Locale;
pub use chrono_tz::Tz;

use crate::error::DateError;

pub const DEFAULT_LOCALE: Locale = Locale::en_US;

const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Localized display formats, named after the usual `LT`/`LL`-style shorthands.
///
/// `L` and `LTS` follow the locale's own date/time layout. The long forms keep
/// a month-day-year layout and localize month and weekday names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalizedFormat {
    /// `LT`
    Time,
    /// `LTS`
    TimeWithSeconds,
    /// `L`
    Date,
    /// `LL`
    LongDate,
    /// `LLL`
    LongDateTime,
    /// `LLLL`
    FullDateTime,
}

impl LocalizedFormat {
    pub fn token(&self) -> &'static str {
        match self {
            LocalizedFormat::Time => "LT",
            LocalizedFormat::TimeWithSeconds => "LTS",
            LocalizedFormat::Date => "L",
            LocalizedFormat::LongDate => "LL",
            LocalizedFormat::LongDateTime => "LLL",
            LocalizedFormat::FullDateTime => "LLLL",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.token() == token)
    }

    pub const fn all() -> &'static [LocalizedFormat] {
        &[
            LocalizedFormat::Time,
            LocalizedFormat::TimeWithSeconds,
            LocalizedFormat::Date,
            LocalizedFormat::LongDate,
            LocalizedFormat::LongDateTime,
            LocalizedFormat::FullDateTime,
        ]
    }

    fn pattern(&self) -> &'static str {
        match self {
            LocalizedFormat::Time => "%-I:%M %p",
            LocalizedFormat::TimeWithSeconds => "%X",
            LocalizedFormat::Date => "%x",
            LocalizedFormat::LongDate => "%B %-d, %Y",
            LocalizedFormat::LongDateTime => "%B %-d, %Y %-I:%M %p",
            LocalizedFormat::FullDateTime => "%A, %B %-d, %Y %-I:%M %p",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    timezone: Tz,
    locale: Locale,
}

impl DateFormatter {
    pub fn new(timezone: Tz, locale: Locale) -> Self {
        Self { timezone, locale }
    }

    /// Host timezone with the default locale.
    pub fn detect() -> Self {
        Self::new(detect_timezone(), DEFAULT_LOCALE)
    }

    pub fn with_timezone(self, timezone: Tz) -> Self {
        Self { timezone, ..self }
    }

    pub fn with_locale(self, locale: Locale) -> Self {
        Self { locale, ..self }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.to_local(Utc::now())
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }

    /// `None` when `ts` is outside the representable range.
    pub fn unix_to_local(&self, ts: i64) -> Option<DateTime<Tz>> {
        DateTime::from_timestamp(ts, 0).map(|dt| self.to_local(dt))
    }

    pub fn format(&self, instant: DateTime<Utc>, format: LocalizedFormat) -> String {
        self.to_local(instant)
            .format_localized(format.pattern(), self.locale)
            .to_string()
    }

    pub fn format_unix(&self, ts: i64, format: LocalizedFormat) -> Option<String> {
        let instant = DateTime::from_timestamp(ts, 0)?;
        Some(self.format(instant, format))
    }

    /// Render `ts` at a fixed UTC shift, as reported per location by the provider.
    pub fn format_unix_with_offset(
        &self,
        ts: i64,
        offset_secs: i32,
        format: LocalizedFormat,
    ) -> Option<String> {
        let offset = FixedOffset::east_opt(offset_secs)?;
        let instant = DateTime::from_timestamp(ts, 0)?;
        Some(
            instant
                .with_timezone(&offset)
                .format_localized(format.pattern(), self.locale)
                .to_string(),
        )
    }

    /// Parse a wall-clock time in the configured timezone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earliest instant.
    pub fn parse_local(&self, input: &str) -> Result<DateTime<Tz>, DateError> {
        let trimmed = input.trim();
        let naive = LOCAL_INPUT_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
            .ok_or_else(|| DateError::Parse(input.to_string()))?;

        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => Err(DateError::NonexistentLocalTime {
                input: input.to_string(),
                timezone: self.timezone.name().to_string(),
            }),
        }
    }
}

/// IANA timezone of the host, or UTC when it cannot be determined.
pub fn detect_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(err) => {
                tracing::warn!(timezone = %name, "Unrecognised host timezone, using UTC: {err}");
                Tz::UTC
            }
        },
        Err(err) => {
            tracing::warn!("Could not detect host timezone, using UTC: {err}");
            Tz::UTC
        }
    }
}

/// Accepts both `en_US` and `en-US`.
pub fn parse_locale(name: &str) -> Option<Locale> {
    let normalized = name.trim().replace('-', "_");
    Locale::try_from(normalized.as_str()).ok()
}
