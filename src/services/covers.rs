//! Book cover images: upload checks and blob bookkeeping

use std::sync::Arc;

use mime_guess::Mime;

use super::storage::BlobStore;
use crate::error::AppResult;

/// Directory, inside the blob store, holding book covers
pub const COVER_DIR: &str = "uploads/books";

pub const NOT_AN_IMAGE_MESSAGE: &str = "The cover image field must be an image.";

/// A cover image file received with a create / update request
#[derive(Debug, Clone, Default)]
pub struct CoverUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Svg,
    Webp,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Svg => "svg",
            ImageKind::Webp => "webp",
        }
    }

    pub fn from_mime(mime: &Mime) -> Option<Self> {
        match mime.essence_str() {
            "image/jpeg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(ImageKind::Bmp),
            "image/svg+xml" => Some(ImageKind::Svg),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// File type from the file name, falling back to the declared content type
    pub fn detect(upload: &CoverUpload) -> Option<Self> {
        let from_name = upload
            .file_name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .and_then(|mime| Self::from_mime(&mime));

        from_name.or_else(|| {
            upload
                .content_type
                .as_deref()
                .and_then(|ct| ct.parse::<Mime>().ok())
                .and_then(|mime| Self::from_mime(&mime))
        })
    }
}

/// Check type and size; every problem is reported
pub fn validate_cover(upload: &CoverUpload, max_kb: u64) -> Result<ImageKind, Vec<String>> {
    let mut errors = Vec::new();

    let kind = ImageKind::detect(upload);
    if kind.is_none() {
        errors.push(NOT_AN_IMAGE_MESSAGE.to_string());
    }

    if upload.bytes.len() as u64 > max_kb * 1024 {
        errors.push(format!(
            "The cover image field must not be greater than {} kilobytes.",
            max_kb
        ));
    }

    match kind {
        Some(kind) if errors.is_empty() => Ok(kind),
        _ => Err(errors),
    }
}

/// Cover image operations over a blob store
#[derive(Clone)]
pub struct CoverImages {
    store: Arc<dyn BlobStore>,
    max_upload_size_kb: u64,
}

impl CoverImages {
    pub fn new(store: Arc<dyn BlobStore>, max_upload_size_kb: u64) -> Self {
        Self {
            store,
            max_upload_size_kb,
        }
    }

    pub fn validate(&self, upload: &CoverUpload) -> Result<ImageKind, Vec<String>> {
        validate_cover(upload, self.max_upload_size_kb)
    }

    pub async fn store(&self, upload: CoverUpload, kind: ImageKind) -> AppResult<String> {
        self.store.put(COVER_DIR, kind.extension(), upload.bytes).await
    }

    /// Delete a cover; failures are logged and swallowed
    pub async fn discard(&self, path: &str) {
        if let Err(e) = self.store.delete(path).await {
            tracing::warn!("Could not delete cover image {}: {}", path, e);
        }
    }

    /// Drop the previous cover, if any, then store the new one
    pub async fn replace(&self, previous: Option<&str>, upload: CoverUpload, kind: ImageKind) -> AppResult<String> {
        if let Some(previous) = previous {
            self.discard(previous).await;
        }
        self.store(upload, kind).await
    }

    pub fn url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.store.public_url(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::storage::MockBlobStore;
    use mockall::predicate::eq;

    fn upload(name: &str, size: usize) -> CoverUpload {
        CoverUpload {
            file_name: Some(name.to_string()),
            content_type: None,
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_detects_image_types_by_name() {
        assert_eq!(ImageKind::detect(&upload("cover.JPEG", 1)), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(&upload("cover.png", 1)), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(&upload("cover.svg", 1)), Some(ImageKind::Svg));
        assert_eq!(ImageKind::detect(&upload("cover.webp", 1)), Some(ImageKind::Webp));
        assert_eq!(ImageKind::detect(&upload("document.pdf", 1)), None);
    }

    #[test]
    fn test_falls_back_to_content_type() {
        let upload = CoverUpload {
            file_name: Some("blob".to_string()),
            content_type: Some("image/gif".to_string()),
            bytes: vec![],
        };
        assert_eq!(ImageKind::detect(&upload), Some(ImageKind::Gif));
    }

    #[test]
    fn test_pdf_is_not_an_image() {
        let errors = validate_cover(&upload("document.pdf", 10), 2048).unwrap_err();
        assert_eq!(errors, vec![NOT_AN_IMAGE_MESSAGE.to_string()]);
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_cover(&upload("image.jpg", 2048 * 1024), 2048).is_ok());

        let errors = validate_cover(&upload("image.jpg", 2048 * 1024 + 1), 2048).unwrap_err();
        assert_eq!(
            errors,
            vec!["The cover image field must not be greater than 2048 kilobytes.".to_string()]
        );
    }

    #[test]
    fn test_type_and_size_errors_are_both_reported() {
        let errors = validate_cover(&upload("movie.mp4", 5 * 1024), 1).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_discard_swallows_store_errors() {
        let mut store = MockBlobStore::new();
        store
            .expect_delete()
            .with(eq("uploads/books/old.png"))
            .times(1)
            .returning(|_| Err(AppError::Storage("permission denied".to_string())));

        let covers = CoverImages::new(Arc::new(store), 2048);
        covers.discard("uploads/books/old.png").await;
    }

    #[tokio::test]
    async fn test_replace_discards_then_stores() {
        let mut store = MockBlobStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_delete()
            .with(eq("uploads/books/old.png"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::Storage("gone".to_string())));
        store
            .expect_put()
            .withf(|dir, ext, bytes| dir == COVER_DIR && ext == "png" && bytes.len() == 3)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("uploads/books/new.png".to_string()));

        let covers = CoverImages::new(Arc::new(store), 2048);
        let path = covers
            .replace(Some("uploads/books/old.png"), upload("new.png", 3), ImageKind::Png)
            .await
            .unwrap();
        assert_eq!(path, "uploads/books/new.png");
    }

    #[tokio::test]
    async fn test_replace_without_previous_only_stores() {
        let mut store = MockBlobStore::new();
        store.expect_delete().never();
        store
            .expect_put()
            .times(1)
            .returning(|_, _, _| Ok("uploads/books/first.jpg".to_string()));

        let covers = CoverImages::new(Arc::new(store), 2048);
        let path = covers.replace(None, upload("first.jpg", 1), ImageKind::Jpeg).await.unwrap();
        assert_eq!(path, "uploads/books/first.jpg");
    }

    #[test]
    fn test_url() {
        let mut store = MockBlobStore::new();
        store
            .expect_public_url()
            .returning(|p| format!("http://cdn.test/{}", p));

        let covers = CoverImages::new(Arc::new(store), 2048);
        assert_eq!(covers.url(Some("a.png")), Some("http://cdn.test/a.png".to_string()));
        assert_eq!(covers.url(None), None);
    }
}
