use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One published documentation entry as returned by the content API.
///
/// The CMS returns `null` for empty fields and numeric ids, so every field is
/// decoded permissively: anything missing or `null` falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub slug: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    pub category: Option<String>,
    pub parent_title: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub order: i64,
    #[serde(deserialize_with = "nullable")]
    pub language: String,
    #[serde(deserialize_with = "nullable")]
    pub is_published: bool,
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    /// Category label, treating an empty string as absent.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Sub-group label, treating an empty string as absent.
    pub fn parent_title(&self) -> Option<&str> {
        self.parent_title.as_deref().filter(|p| !p.is_empty())
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.published_at)
    }
}

/// `{ "data": [...] }` envelope wrapping every collection response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionEnvelope {
    #[serde(default, deserialize_with = "nullable")]
    pub data: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Id, Language::En];

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "en" => Ok(Self::En),
            other => anyhow::bail!("unsupported language: {other}"),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::En => "en",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "Indonesia",
            Self::En => "English",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::En => "EN",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => anyhow::bail!("unsupported theme: {other}"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tolerates_nulls_and_numeric_ids() {
        let raw = r##"{
            "id": 42,
            "slug": "intro",
            "title": "Intro",
            "description": null,
            "content": "# Intro",
            "category": null,
            "parentTitle": "Basics",
            "order": 3,
            "language": "en",
            "isPublished": true,
            "updatedAt": "2025-01-02T03:04:05.000Z"
        }"##;
        let record: DocumentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.description, "");
        assert_eq!(record.category(), None);
        assert_eq!(record.parent_title(), Some("Basics"));
        assert_eq!(record.order, 3);
        assert!(record.is_published);
        assert!(record.last_updated().is_some());
    }

    #[test]
    fn empty_labels_count_as_absent() {
        let record = DocumentRecord {
            category: Some(String::new()),
            parent_title: Some(String::new()),
            ..DocumentRecord::default()
        };
        assert_eq!(record.category(), None);
        assert_eq!(record.parent_title(), None);
    }

    #[test]
    fn envelope_without_data_is_empty() {
        let envelope: CollectionEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
        let envelope: CollectionEnvelope = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn unparseable_timestamp_is_dropped() {
        let record: DocumentRecord =
            serde_json::from_str(r#"{"slug":"a","updatedAt":"yesterday"}"#).unwrap();
        assert_eq!(record.updated_at, None);
    }

    #[test]
    fn parse_language_and_theme() {
        assert_eq!(Language::parse(" EN ").unwrap(), Language::En);
        assert_eq!(Language::parse("id").unwrap(), Language::Id);
        let err = Language::parse("fr").unwrap_err().to_string();
        assert!(err.contains("unsupported language"));

        assert_eq!(Theme::parse("Light").unwrap(), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
