//! Multipart parsing for the admin media forms

use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, Utc};
use khmedia_core::{AppError, MediaCategory, MediaKind};
use khmedia_services::UploadedFile;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Fields of a media form plus its optional `file` part.
#[derive(Debug, Default)]
pub struct MediaForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MediaForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn kind(&self) -> Result<MediaKind, AppError> {
        let raw = self
            .text("kind")
            .ok_or_else(|| AppError::InvalidInput("Field 'kind' is required".to_string()))?;
        MediaKind::from_str(raw).map_err(|e| AppError::InvalidInput(e.to_string()))
    }

    pub fn parent_id(&self) -> Result<Option<Uuid>, AppError> {
        self.text("parent_id")
            .map(Uuid::parse_str)
            .transpose()
            .map_err(AppError::from)
    }

    pub fn title(&self) -> String {
        self.text("title").unwrap_or_default().to_string()
    }

    pub fn caption(&self) -> Option<String> {
        self.text("caption").map(String::from)
    }

    /// Checkbox-style flag: `true/1/on/yes` or `false/0/off/no`.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, AppError> {
        match self.text(name).map(str::to_lowercase).as_deref() {
            None => Ok(default),
            Some("true" | "1" | "on" | "yes") => Ok(true),
            Some("false" | "0" | "off" | "no") => Ok(false),
            Some(other) => Err(AppError::InvalidInput(format!(
                "Invalid value for '{}': {}",
                name, other
            ))),
        }
    }

    pub fn category(&self) -> Result<Option<MediaCategory>, AppError> {
        self.text("category")
            .map(MediaCategory::from_str)
            .transpose()
            .map_err(|e| AppError::InvalidInput(e.to_string()))
    }

    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
    pub fn date(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(raw) = self.text("date") else {
            return Ok(None);
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Some(dt.and_utc()))
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid date: {}", raw)))
    }

    pub fn order(&self) -> Result<i32, AppError> {
        match self.text("order") {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::InvalidInput(format!("Invalid order: {}", raw))),
        }
    }
}

/// Read every part of a media form.
///
/// Only one field named "file" is accepted. An empty file part (a form
/// submitted without choosing a file) counts as no file.
pub async fn extract_media_form(mut multipart: Multipart) -> Result<MediaForm, AppError> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

            if data.is_empty() && filename.is_empty() {
                continue;
            }

            let mut file = UploadedFile::new(filename, data);
            file.content_type = content_type;
            form.file = Some(file);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read field: {}", e)))?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> MediaForm {
        MediaForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    #[test]
    fn test_field_parsing() {
        let f = form(&[
            ("kind", "gallery-image"),
            ("parent_id", ""),
            ("title", "  Sports Day "),
            ("order", "3"),
        ]);
        assert_eq!(f.kind().unwrap(), MediaKind::GalleryImage);
        assert_eq!(f.parent_id().unwrap(), None);
        assert_eq!(f.title(), "Sports Day");
        assert_eq!(f.caption(), None);
        assert_eq!(f.order().unwrap(), 3);
        assert!(f.flag("active", true).unwrap());
        assert!(!f.flag("featured", false).unwrap());
        assert_eq!(f.category().unwrap(), None);
        assert_eq!(f.date().unwrap(), None);
    }

    #[test]
    fn test_collection_fields() {
        let f = form(&[
            ("active", "off"),
            ("featured", "On"),
            ("category", "sports"),
            ("date", "2024-03-25"),
        ]);
        assert!(!f.flag("active", true).unwrap());
        assert!(f.flag("featured", false).unwrap());
        assert_eq!(f.category().unwrap(), Some(MediaCategory::Sports));
        assert_eq!(
            f.date().unwrap().unwrap().to_rfc3339(),
            "2024-03-25T00:00:00+00:00"
        );

        let ts = form(&[("date", "2024-10-31T18:30:00+05:30")]);
        assert_eq!(
            ts.date().unwrap().unwrap().to_rfc3339(),
            "2024-10-31T13:00:00+00:00"
        );
    }

    #[test]
    fn test_invalid_fields() {
        assert!(form(&[]).kind().is_err());
        assert!(form(&[("kind", "poster")]).kind().is_err());
        assert!(form(&[("parent_id", "abc")]).parent_id().is_err());
        assert!(form(&[("order", "first")]).order().is_err());
        assert!(form(&[("featured", "maybe")]).flag("featured", false).is_err());
        assert!(form(&[("category", "music")]).category().is_err());
        assert!(form(&[("date", "25/03/2024")]).date().is_err());
    }
}
