use crate::block::{BlockFields, BlockKind, BlockRecord};
use crate::locale::Bilingual;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const MAX_STRING_CHARS: usize = 255;

pub const RESERVED_CHARS: &[char] = &[
    '{', '}', '|', '\\', '^', '[', ']', '`', ';', '/', '?', ':', '@', '&', '=', '+', '$', ',',
    '<', '>', '#', '%', '"', '\'',
];

/// Field-level validation failures, keyed by field path (`blocks.2.type`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut messages = self.errors.values().flatten();
        match messages.next() {
            None => f.write_str("validation failed"),
            Some(first) => {
                f.write_str(first)?;
                let rest = self.len() - 1;
                match rest {
                    0 => Ok(()),
                    1 => write!(f, " (and 1 more error)"),
                    n => write!(f, " (and {n} more errors)"),
                }
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

pub fn required(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.add(field, format!("The {field} field is required."));
    }
}

pub fn max_chars(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.add(
                field,
                format!("The {field} field must not be greater than {max} characters."),
            );
        }
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if slug.is_empty() {
        errors.add("slug", "The slug field is required.");
    } else if slug.chars().any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c)) {
        errors.add("slug", "The slug may only contain URL-safe characters.");
    }
    max_chars(&mut errors, "slug", Some(slug), MAX_STRING_CHARS);

    errors.into_result()
}

/// Body of a page save: the complete new state of the page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSubmission {
    pub title_fr: Option<String>,
    pub title_ar: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockFields>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedPage {
    pub title: Bilingual,
    pub blocks: Vec<BlockRecord>,
}

pub fn validate_page(submission: PageSubmission) -> Result<ValidatedPage, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    max_chars(&mut errors, "title_fr", submission.title_fr.as_deref(), MAX_STRING_CHARS);
    max_chars(&mut errors, "title_ar", submission.title_ar.as_deref(), MAX_STRING_CHARS);

    let blocks = match validate_blocks(submission.blocks) {
        Ok(blocks) => blocks,
        Err(block_errors) => {
            errors.merge(block_errors);
            Vec::new()
        }
    };

    errors.into_result()?;
    Ok(ValidatedPage {
        title: Bilingual::new(submission.title_fr, submission.title_ar),
        blocks,
    })
}

/// Checks every block's type and caps. Fields are kept as submitted. A single
/// bad entry rejects the whole list.
pub fn validate_blocks(submitted: Vec<BlockFields>) -> Result<Vec<BlockRecord>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut blocks = Vec::with_capacity(submitted.len());

    for (idx, fields) in submitted.into_iter().enumerate() {
        let type_field = format!("blocks.{idx}.type");
        let kind = match fields.kind.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add(&type_field, format!("The {type_field} field is required."));
                None
            }
            Some(name) => match name.parse::<BlockKind>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.add(&type_field, format!("The selected {type_field} is invalid."));
                    None
                }
            },
        };

        for (name, value) in [("alt_fr", &fields.alt_fr), ("alt_ar", &fields.alt_ar)] {
            max_chars(
                &mut errors,
                &format!("blocks.{idx}.{name}"),
                value.as_deref(),
                MAX_STRING_CHARS,
            );
        }

        if let Some(kind) = kind {
            blocks.push(BlockRecord::new(kind, fields));
        }
    }

    errors.into_result()?;
    Ok(blocks)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageRule {
    pub max_kb: u64,
    pub extensions: &'static [&'static str],
}

/// Editor imagery: anything a browser renders as an image.
pub const BLOCK_IMAGE: ImageRule = ImageRule {
    max_kb: 4096,
    extensions: &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"],
};

pub const NEWS_IMAGE: ImageRule = ImageRule {
    max_kb: 2048,
    extensions: &["jpg", "jpeg", "png"],
};

pub fn check_image(
    errors: &mut ValidationErrors,
    field: &str,
    file_name: &str,
    content_type: Option<&str>,
    size: usize,
    rule: ImageRule,
) {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let is_image = content_type.map_or(true, |ct| ct.starts_with("image/"));

    if !is_image || !rule.extensions.contains(&extension.as_str()) {
        errors.add(
            field,
            format!(
                "The {field} field must be a file of type: {}.",
                rule.extensions.join(", ")
            ),
        );
    }
    if size as u64 > rule.max_kb * 1024 {
        errors.add(
            field,
            format!(
                "The {field} field must not be greater than {} kilobytes.",
                rule.max_kb
            ),
        );
    }
}
