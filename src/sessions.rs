use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

static DATE_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A training session as it appears in the roster file.  Dates are parsed
/// here, once, at the ingestion boundary; everything downstream sees either
/// a valid calendar day or `None`.
#[derive(Clone, Debug, Deserialize)]
struct RawSession {
    id: u32,
    title: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default, rename = "type")]
    category: Option<String>,
    #[serde(default)]
    trainer: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    attendees: Option<u32>,
}

/// A scheduled training session.  `date` is `None` when the roster entry had
/// no date or an unparseable one; such sessions are excluded from every day
/// bucket but still loaded, so a bad record cannot take the calendar down.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Session {
    id: u32,
    title: String,
    date: Option<Date>,
    time: Option<String>,
    category: Option<String>,
    trainer: Option<String>,
    location: Option<String>,
    attendees: Option<u32>,
}

impl Session {
    fn from_raw(raw: RawSession) -> Session {
        let date = raw.date.as_deref().and_then(|s| {
            let parsed = parse_day(s);
            if parsed.is_none() {
                log::warn!(
                    "session {}: unparseable date {s:?}; it will not appear on the calendar",
                    raw.id
                );
            }
            parsed
        });
        Session {
            id: raw.id,
            title: raw.title,
            date,
            time: raw.time,
            category: raw.category,
            trainer: raw.trainer,
            location: raw.location,
            attendees: raw.attendees,
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn date(&self) -> Option<Date> {
        self.date
    }

    pub(crate) fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub(crate) fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub(crate) fn trainer(&self) -> Option<&str> {
        self.trainer.as_deref()
    }

    pub(crate) fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub(crate) fn attendees(&self) -> Option<u32> {
        self.attendees
    }

    #[cfg(test)]
    pub(crate) fn sample(id: u32, title: &str, date: &str) -> Session {
        Session::from_raw(RawSession {
            id,
            title: title.to_owned(),
            date: Some(date.to_owned()),
            time: None,
            category: None,
            trainer: None,
            location: None,
            attendees: None,
        })
    }
}

/// Parses a roster date at day granularity.  Bucketing ignores time of day,
/// so a trailing `T10:00:00`-style component is simply cut off.
fn parse_day(s: &str) -> Option<Date> {
    let day_part = s.get(..10).unwrap_or(s);
    Date::parse(day_part, &DATE_FMT).ok()
}

#[derive(Debug, Error)]
pub(crate) enum RosterError {
    #[error("failed to read roster file {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse roster file {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Loads the session roster: a JSON array of session records.
pub(crate) fn load_roster(path: &Path) -> Result<Vec<Session>, RosterError> {
    let text = fs::read_to_string(path).map_err(|source| RosterError::Read {
        path: path.to_owned(),
        source,
    })?;
    let raw = serde_json::from_str::<Vec<RawSession>>(&text).map_err(|source| {
        RosterError::Parse {
            path: path.to_owned(),
            source,
        }
    })?;
    let sessions = raw.into_iter().map(Session::from_raw).collect::<Vec<_>>();
    log::info!("loaded {} sessions from {}", sessions.len(), path.display());
    Ok(sessions)
}
