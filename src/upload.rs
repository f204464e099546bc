use crate::error::{CmsError, CmsResult};
use axum::extract::Multipart;
use baladiya_core::validate::{check_image, ImageRule};
use baladiya_core::ValidationErrors;
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn check(&self, errors: &mut ValidationErrors, field: &str, rule: ImageRule) {
        check_image(
            errors,
            field,
            &self.file_name,
            self.content_type.as_deref(),
            self.data.len(),
            rule,
        );
    }
}

/// A fully buffered multipart body. Array fields (`extra_images[]`) are
/// filed under their bare name.
#[derive(Clone, Debug, Default)]
pub struct MultipartForm {
    texts: HashMap<String, String>,
    files: Vec<Upload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> CmsResult<MultipartForm> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field
                .name()
                .unwrap_or_default()
                .trim_end_matches("[]")
                .to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(malformed)?;
                    form.files.push(Upload {
                        field: name,
                        file_name,
                        content_type,
                        data,
                    });
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    form.texts.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.texts.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, upload: Upload) -> Self {
        self.files.push(upload);
        self
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.iter().find(|f| f.field == name)
    }

    pub fn files<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Upload> + 'a {
        self.files.iter().filter(move |f| f.field == name)
    }
}

fn malformed(why: axum::extract::multipart::MultipartError) -> CmsError {
    CmsError::Validation(ValidationErrors::single(
        "body",
        format!("Malformed multipart body: {why}"),
    ))
}

/// Requires a single image under `field`.
pub fn required_image<'a>(
    form: &'a MultipartForm,
    field: &str,
    rule: ImageRule,
) -> CmsResult<&'a Upload> {
    let mut errors = ValidationErrors::new();
    match form.file(field) {
        Some(upload) => {
            upload.check(&mut errors, field, rule);
            errors.into_result()?;
            Ok(upload)
        }
        None => Err(ValidationErrors::single(field, format!("The {field} field is required.")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baladiya_core::validate::BLOCK_IMAGE;

    fn png(field: &str, size: usize) -> Upload {
        Upload {
            field: field.to_string(),
            file_name: "carte.png".to_string(),
            content_type: Some("image/png".to_string()),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn finds_files_by_field() {
        let form = MultipartForm::default()
            .with_text("title_fr", "Titre")
            .with_file(png("extra_images", 1))
            .with_file(png("extra_images", 2))
            .with_file(png("image", 3));

        assert_eq!(form.text("title_fr"), Some("Titre"));
        assert_eq!(form.files("extra_images").count(), 2);
        assert_eq!(form.file("image").map(|f| f.data.len()), Some(3));
        assert!(form.file("file").is_none());
    }

    #[test]
    fn required_image_checks_presence_and_rule() {
        let form = MultipartForm::default().with_file(png("file", 10));
        assert!(required_image(&form, "file", BLOCK_IMAGE).is_ok());
        assert!(matches!(
            required_image(&form, "image", BLOCK_IMAGE),
            Err(CmsError::Validation(_))
        ));

        let big = MultipartForm::default().with_file(png("file", 4097 * 1024));
        assert!(matches!(
            required_image(&big, "file", BLOCK_IMAGE),
            Err(CmsError::Validation(_))
        ));
    }
}
