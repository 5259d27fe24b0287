//! Media identifiers handed to the rewriter once an upload completes.

use crate::error::MediaError;

/// Which local placeholder to resolve and what replaces it.
///
/// Immutable for the duration of one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Client-assigned placeholder id written into blocks before upload.
    pub local_id: String,
    /// Server-assigned media id.
    pub remote_id: String,
    /// Attribute-safe URL of the uploaded file.
    pub remote_url: String,
    /// `VideoPress` GUID for video uploads.
    pub remote_guid: Option<String>,
    /// Attachment page URL, used by galleries linking to attachment pages.
    pub attachment_page_url: Option<String>,
}

impl MediaReference {
    /// Create a reference without a GUID or attachment page.
    #[must_use]
    pub fn new(
        local_id: impl Into<String>,
        remote_id: impl Into<String>,
        remote_url: impl Into<String>,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            remote_id: remote_id.into(),
            remote_url: remote_url.into(),
            remote_guid: None,
            attachment_page_url: None,
        }
    }

    /// Set the `VideoPress` GUID.
    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.remote_guid = Some(guid.into());
        self
    }

    /// Set the attachment page URL.
    #[must_use]
    pub fn with_attachment_page_url(mut self, url: impl Into<String>) -> Self {
        self.attachment_page_url = Some(url.into());
        self
    }

    /// Build a reference from a finished upload.
    ///
    /// Picks the optimized URL when the server produced one and escapes
    /// quotes so the URL can be written into HTML attributes. Empty GUIDs
    /// and attachment URLs are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] if `local_id` is blank or the upload has no
    /// media id or no URL.
    pub fn from_upload(
        local_id: impl Into<String>,
        upload: &UploadedMedia,
    ) -> Result<Self, MediaError> {
        let local_id = local_id.into();
        if local_id.trim().is_empty() {
            return Err(MediaError::EmptyLocalId);
        }
        let remote_id = upload.media_id.trim();
        if remote_id.is_empty() {
            return Err(MediaError::EmptyMediaId);
        }
        let url = upload.optimal_url();
        if url.is_empty() {
            return Err(MediaError::EmptyUrl);
        }

        Ok(Self {
            local_id,
            remote_id: remote_id.to_owned(),
            remote_url: escape_quotes(url),
            remote_guid: non_empty(upload.videopress_guid.as_deref()),
            attachment_page_url: non_empty(upload.attachment_page_url.as_deref())
                .map(|url| escape_quotes(&url)),
        })
    }
}

/// Server response for a completed upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedMedia {
    /// Remote media id.
    pub media_id: String,
    /// URL of the original file.
    pub file_url: String,
    /// URL of a server-optimized rendition, if any.
    pub optimized_url: Option<String>,
    /// `VideoPress` GUID for video uploads.
    pub videopress_guid: Option<String>,
    /// Attachment page URL.
    pub attachment_page_url: Option<String>,
}

impl UploadedMedia {
    /// URL to reference from post content.
    #[must_use]
    pub fn optimal_url(&self) -> &str {
        self.optimized_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.file_url.trim())
    }
}

/// Escape quote characters for use inside HTML attribute values.
#[must_use]
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "&quot;").replace('\'', "&#39;")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
