use crate::map_embed::sanitize_map_url;
use crate::validate::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("gallery index {index} is out of bounds (gallery holds {len} images)")]
pub struct GalleryIndexError {
    pub index: usize,
    pub len: usize,
}

/// The free-form `extra` object of the flat page shape. Only `gallery` and
/// `map_url` have meaning, anything else an editor stored is carried along.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyExtra {
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl LegacyExtra {
    /// Lenient read of a stored `extra` column. A `gallery` that is not a
    /// list of strings reads as empty; every other key is kept.
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut other = match value {
            Some(Value::Object(map)) => map.clone(),
            _ => return LegacyExtra::default(),
        };

        let gallery = other
            .remove("gallery")
            .and_then(|g| serde_json::from_value(g).ok())
            .unwrap_or_default();
        let map_url = match other.remove("map_url") {
            Some(Value::String(url)) => Some(url),
            Some(Value::Null) | None => None,
            Some(unknown) => {
                other.insert("map_url".to_string(), unknown);
                None
            }
        };

        LegacyExtra {
            gallery,
            map_url,
            other,
        }
    }

    /// Strict read of an `extra` object an editor submitted.
    pub fn from_submitted(value: Value) -> Result<Self, ValidationErrors> {
        let map = match value {
            Value::Object(map) => map,
            _ => return Err(ValidationErrors::single("extra", "The extra field must be an object.")),
        };

        let mut errors = ValidationErrors::new();
        let gallery_ok = match map.get("gallery") {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.iter().all(Value::is_string),
            Some(_) => false,
        };
        if !gallery_ok {
            errors.add("extra.gallery", "The extra.gallery field must be a list of paths.");
        }
        if !matches!(map.get("map_url"), None | Some(Value::Null) | Some(Value::String(_))) {
            errors.add("extra.map_url", "The extra.map_url field must be a string.");
        }
        errors.into_result()?;

        Ok(LegacyExtra::from_value(Some(&Value::Object(map))))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn sanitized(mut self) -> Self {
        self.map_url = self
            .map_url
            .map(|url| sanitize_map_url(&url))
            .filter(|url| !url.is_empty());
        self
    }

    pub fn push_image(&mut self, path: impl Into<String>) {
        self.gallery.push(path.into());
    }

    /// Removes the entry at `index`; later entries shift down by one.
    pub fn remove_image(&mut self, index: usize) -> Result<String, GalleryIndexError> {
        if index >= self.gallery.len() {
            return Err(GalleryIndexError {
                index,
                len: self.gallery.len(),
            });
        }
        Ok(self.gallery.remove(index))
    }
}
