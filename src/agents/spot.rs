//! Where Is It? — identify the landmark in a photo and suggest an itinerary.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::TravelAgent;
use crate::error::AppError;
use crate::llm::{CompletionRequest, ImagePayload};
use crate::session::ITINERARY_ARTIFACT;

/// Upper bound on uploaded photo size.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// MIME type for a photo path, from its extension. Only the formats the
/// upload form accepts are recognised.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Read a photo from disk into an [`ImagePayload`].
pub async fn load_image(path: &Path) -> Result<ImagePayload, AppError> {
    let mime = mime_for_path(path).ok_or_else(|| {
        AppError::InvalidInput(format!("{}: only jpg, jpeg and png photos are supported", path.display()))
    })?;
    let size = tokio::fs::metadata(path).await?.len();
    check_size(size)?;
    let data = tokio::fs::read(path).await?;
    Ok(ImagePayload::new(mime, data))
}

fn check_size(size: u64) -> Result<(), AppError> {
    if size == 0 {
        return Err(AppError::InvalidInput("photo is empty".into()));
    }
    if size > MAX_IMAGE_BYTES as u64 {
        return Err(AppError::InvalidInput(format!(
            "photo is {size} bytes; the limit is {MAX_IMAGE_BYTES}"
        )));
    }
    Ok(())
}

impl TravelAgent {
    pub async fn locate_spot(&mut self, image: &ImagePayload) -> Result<String, AppError> {
        check_size(image.data.len() as u64)?;

        let instruction = self.templates.spot.render(&HashMap::new())?;
        let reply = self
            .provider
            .complete(&CompletionRequest::new(&instruction).with_image(image))
            .await?;

        self.session.record_artifact(ITINERARY_ARTIFACT, reply.clone());
        info!(session_id = %self.session.id(), mime = %image.mime_type, "spot: itinerary recorded");
        Ok(reply)
    }
}
