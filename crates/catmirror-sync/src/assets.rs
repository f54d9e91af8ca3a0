//! Asset Mirror: copies a record's primary image into object storage.

use catmirror_source::{ImageRow, ImagesField, SourceClient};
use catmirror_storage::StorageClient;

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Object key for a record's mirrored image.
#[must_use]
pub fn image_key(record_id: &str) -> String {
    format!("{record_id}.jpg")
}

/// Mirrors the first image of a record and returns its public URL.
///
/// Returns `None` without any request when the record has no images. Every
/// failure along the way is logged and also yields `None`; the parent record
/// is still written.
pub async fn mirror_image(
    source: &SourceClient,
    storage: &StorageClient,
    record_id: &str,
    images: Option<&ImagesField>,
) -> Option<String> {
    let images = images?;
    if images.meta.size == Some(0) {
        return None;
    }

    let download_href = match images.rows.first() {
        Some(row) => row.meta.download_href.clone(),
        None => first_listed_image(source, record_id, &images.meta.href).await,
    };
    let Some(download_href) = download_href else {
        tracing::warn!(record_id, "sync: image has no download link; skipping image");
        return None;
    };

    let bytes = match source.fetch_bytes(&download_href).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(record_id, error = %e, "sync: image download failed");
            return None;
        }
    };

    let key = image_key(record_id);
    if let Err(e) = storage.upload(&key, bytes, IMAGE_CONTENT_TYPE).await {
        tracing::warn!(record_id, error = %e, "sync: image upload failed");
        return None;
    }

    Some(storage.public_url(&key))
}

/// Fetches the image collection behind `href` when it was not expanded inline.
async fn first_listed_image(source: &SourceClient, record_id: &str, href: &str) -> Option<String> {
    let body = match source.fetch_related(href).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(record_id, error = %e, "sync: image list fetch failed");
            return None;
        }
    };

    let first = body.get("rows")?.as_array()?.first()?.clone();
    match serde_json::from_value::<ImageRow>(first) {
        Ok(row) => row.meta.download_href,
        Err(e) => {
            tracing::warn!(record_id, error = %e, "sync: malformed image row");
            None
        }
    }
}
