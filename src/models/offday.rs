use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OffdayError;

// Where the off-day document lives unless OFFDAY_DATA says otherwise.
pub const DEFAULT_DATA_LOCATION: &str = "./data/offdays.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffdayRecord {
    pub date: NaiveDate,
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl OffdayRecord {
    pub fn new(date: NaiveDate, user_id: UserId, name: &str) -> Self {
        Self {
            date,
            user_id,
            name: name.to_string(),
            created_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OffdayDocument {
    #[serde(default)]
    items: Vec<RawOffday>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffday {
    date: String,
    name: String,
    #[serde(default)]
    user_id: Option<u32>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Loads the off-day document at `path`.
///
/// A missing file is an empty calendar, not an error. Timestamped dates are
/// reduced to the calendar day they fall on in `tz`.
pub fn load_offdays(path: &Path, tz: Tz) -> Result<Vec<OffdayRecord>, OffdayError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no off-day document, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(OffdayError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let document: OffdayDocument =
        serde_json::from_str(&raw).map_err(|source| OffdayError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let records = validate_items(document.items, tz)?;
    debug!(path = %path.display(), count = records.len(), "loaded off-day records");
    Ok(records)
}

/// Parses an off-day document from a string, with the same rules as [`load_offdays`].
pub fn parse_offdays(raw: &str, tz: Tz) -> Result<Vec<OffdayRecord>, OffdayError> {
    let document: OffdayDocument =
        serde_json::from_str(raw).map_err(|source| OffdayError::Json {
            path: "<inline>".into(),
            source,
        })?;
    validate_items(document.items, tz)
}

fn validate_items(items: Vec<RawOffday>, tz: Tz) -> Result<Vec<OffdayRecord>, OffdayError> {
    let ids = assign_user_ids(&items)?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let name = item.name.trim().to_string();
            if name.is_empty() {
                return Err(OffdayError::EmptyName { index });
            }
            let date = normalize_date(&item.date, tz).ok_or_else(|| OffdayError::InvalidDate {
                index,
                value: item.date.clone(),
            })?;
            let user_id = match item.user_id {
                Some(id) => UserId(id),
                None => ids[&name],
            };
            Ok(OffdayRecord {
                date,
                user_id,
                name,
                created_at: item.created_at,
            })
        })
        .collect()
}

/// Plain `yyyy-MM-dd`, or an RFC 3339 timestamp taken as its local day in `tz`.
pub fn normalize_date(value: &str, tz: Tz) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&tz).date_naive())
}

// Names keep the first explicit id they appear with. Names that never carry
// one get fresh ids above the largest explicit id, in name order.
fn assign_user_ids(items: &[RawOffday]) -> Result<HashMap<String, UserId>, OffdayError> {
    let mut ids: HashMap<String, UserId> = HashMap::new();
    for item in items {
        if let Some(id) = item.user_id {
            ids.entry(item.name.trim().to_string()).or_insert(UserId(id));
        }
    }
    let mut next = match items.iter().filter_map(|item| item.user_id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    };
    let unassigned: BTreeSet<String> = items
        .iter()
        .map(|item| item.name.trim().to_string())
        .filter(|name| !name.is_empty() && !ids.contains_key(name))
        .collect();
    for name in unassigned {
        let Some(id) = next else {
            return Err(OffdayError::IdSpaceExhausted { name });
        };
        ids.insert(name, UserId(id));
        next = id.checked_add(1);
    }
    Ok(ids)
}
