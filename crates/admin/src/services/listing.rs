//! Listing assistant: draft a product name and description from a photo.
//!
//! The flow is:
//! 1. Validate the uploaded image (present, supported type, decodable, small enough)
//! 2. Send it to Claude as an image block with a JSON-only instruction
//! 3. Strip any code fences from the reply and parse `{name, description}`

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::claude::{ClaudeClient, ClaudeError, ContentBlock, ImageSource, Message};

/// Image types the Messages API accepts.
pub const SUPPORTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Largest decoded image the API accepts.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are a product listing assistant for an online marketplace. \
Look at the product photo and write a short, accurate product name and a one-paragraph \
description a shopper would find useful. Respond ONLY with valid JSON. No markdown. \
No explanation.";

const USER_PROMPT: &str = r#"Schema:
{
  "name": string,
  "description": string
}"#;

/// Errors that can occur while drafting a listing.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// No image data was sent.
    #[error("Image data missing")]
    MissingImage,

    /// The image type is not one Claude can read.
    #[error("Unsupported image type: {0}")]
    UnsupportedMimeType(String),

    /// The image data is not valid base64.
    #[error("Image data is not valid base64")]
    InvalidImage,

    /// The decoded image is over the size limit.
    #[error("Image exceeds 5 MB")]
    ImageTooLarge,

    /// Claude API error.
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),

    /// The model's reply was not the JSON we asked for.
    #[error("AI did not return valid JSON")]
    InvalidJson,
}

/// A drafted product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub name: String,
    pub description: String,
}

/// A validated product photo.
#[derive(Debug, Clone)]
pub struct ListingImage {
    media_type: String,
    data: String,
}

impl ListingImage {
    /// Validate an uploaded image.
    ///
    /// `data` may be bare base64 or a `data:<mime>;base64,` URL.
    ///
    /// # Errors
    ///
    /// Returns the matching `ListingError` for missing, unsupported, malformed
    /// or oversized images.
    pub fn parse(data: &str, mime_type: &str) -> Result<Self, ListingError> {
        let data = data.trim();
        let data = data
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .map_or(data, |(_, payload)| payload);
        let mime_type = mime_type.trim().to_ascii_lowercase();

        if data.is_empty() || mime_type.is_empty() {
            return Err(ListingError::MissingImage);
        }
        if !SUPPORTED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(ListingError::UnsupportedMimeType(mime_type));
        }

        let bytes = STANDARD
            .decode(data)
            .map_err(|_| ListingError::InvalidImage)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ListingError::ImageTooLarge);
        }

        Ok(Self {
            media_type: mime_type,
            data: data.to_string(),
        })
    }

    fn into_block(self) -> ContentBlock {
        ContentBlock::Image {
            source: ImageSource::Base64 {
                media_type: self.media_type,
                data: self.data,
            },
        }
    }
}

/// Drafts listings with Claude.
pub struct ListingService<'a> {
    claude: &'a ClaudeClient,
}

impl<'a> ListingService<'a> {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(claude: &'a ClaudeClient) -> Self {
        Self { claude }
    }

    /// Ask Claude for a name and description of the pictured product.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Claude` if the API call fails, or
    /// `ListingError::InvalidJson` if the reply cannot be parsed.
    #[instrument(skip(self, image), fields(media_type = %image.media_type))]
    pub async fn draft(&self, image: ListingImage) -> Result<ListingDraft, ListingError> {
        let message = Message::user(vec![
            image.into_block(),
            ContentBlock::Text {
                text: USER_PROMPT.to_string(),
            },
        ]);

        let response = self
            .claude
            .chat(vec![message], Some(SYSTEM_PROMPT.to_string()), MAX_TOKENS)
            .await?;

        let raw = response.text();
        let draft = parse_listing(&raw).inspect_err(|_| {
            warn!(response_id = %response.id, "Listing reply was not valid JSON");
        })?;

        info!(response_id = %response.id, name = %draft.name, "Listing drafted");
        Ok(draft)
    }
}

/// Parse a model reply into a listing, tolerating Markdown code fences.
///
/// # Errors
///
/// Returns `ListingError::InvalidJson` unless the reply is a JSON object with
/// string `name` and `description` fields.
pub fn parse_listing(raw: &str) -> Result<ListingDraft, ListingError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    serde_json::from_str::<ListingDraft>(cleaned.trim()).map_err(|_| ListingError::InvalidJson)
}
