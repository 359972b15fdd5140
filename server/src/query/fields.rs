use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};
use url::Url;

use super::QueryError;
use entity::Genres;

// Timestamps without an offset are taken as UTC.
static NAIVE_FORMATS: [&[FormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Submitted form fields in submission order. A key may repeat, as a
/// multi-select does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl From<Vec<(String, String)>> for Fields {
    fn from(value: Vec<(String, String)>) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Fields {
    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn required(&self, key: &'static str) -> Result<String, QueryError> {
        self.optional(key)
            .ok_or_else(|| QueryError::validation(key, "this field is required"))
    }

    /// Trimmed value, blank submissions count as absent.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    /// An optional absolute URL.
    pub fn link(&self, key: &'static str) -> Result<Option<String>, QueryError> {
        match self.optional(key) {
            Some(value) => Url::parse(&value)
                .map(|_| Some(value))
                .map_err(|e| QueryError::validation(key, format!("invalid URL: {}", e))),
            None => Ok(None),
        }
    }

    /// The edit forms submit `website_link`, older clients `website`.
    pub fn website(&self) -> Result<Option<String>, QueryError> {
        if self.contains("website_link") {
            self.link("website_link")
        } else {
            self.link("website")
        }
    }

    /// Checkboxes are only submitted when ticked, whatever their value.
    pub fn checkbox(&self, key: &str) -> bool {
        self.contains(key)
    }

    /// Every non-blank `genres` value, in submission order.
    pub fn genres(&self) -> Genres {
        Genres(
            self.get_all("genres")
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn id(&self, key: &'static str) -> Result<i32, QueryError> {
        self.required(key)?
            .parse::<i32>()
            .map_err(|e| QueryError::validation(key, format!("not a valid id: {}", e)))
    }

    pub fn timestamp(&self, key: &'static str) -> Result<OffsetDateTime, QueryError> {
        let value = self.required(key)?;
        parse_timestamp(&value).ok_or_else(|| {
            QueryError::validation(key, format!("not a valid date and time: {}", value))
        })
    }
}

pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Ok(t) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(t.to_offset(UtcOffset::UTC));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
}
