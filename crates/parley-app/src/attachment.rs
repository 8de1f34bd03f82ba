//! Attachment Staging - the single file waiting to be sent.
//!
//! At most one attachment is staged at a time. Each staged attachment owns a
//! preview handle issued by a [`PreviewRegistry`]; the handle is released
//! when the attachment is replaced, removed, or taken for sending, so the
//! registry's live count returns to zero once the slot is empty.

use std::collections::HashSet;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use parley_core::prelude::*;

/// MIME type used when the extension is not recognized.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// Raw file payload: what actually goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// - [`Error::AttachmentNotFound`] if `path` is not a file.
    /// - [`Error::AttachmentTooLarge`] if it is bigger than `max_bytes`.
    /// - [`Error::Io`] if reading fails.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|_| Error::AttachmentNotFound {
            path: path.to_path_buf(),
        })?;
        if !metadata.is_file() {
            return Err(Error::AttachmentNotFound {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() > max_bytes {
            return Err(Error::AttachmentTooLarge {
                size: metadata.len(),
                limit: max_bytes,
            });
        }

        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: mime_from_path(path).to_string(),
            filename,
            bytes,
        })
    }

    /// Override the inferred MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Detect MIME type from file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Base64 (standard alphabet, padded) text for the `send_file` `data` field.
pub fn encode_attachment(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Previews
// ─────────────────────────────────────────────────────────────────────────────

/// How a staged attachment is previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// Still image
    Image,
    /// Playable video
    Video,
}

impl PreviewKind {
    /// Classify a MIME type; anything but `image/*` and `video/*` is refused.
    pub fn classify(mime_type: &str) -> Result<Self> {
        let lower = mime_type.trim().to_ascii_lowercase();
        if lower.starts_with("image/") {
            Ok(PreviewKind::Image)
        } else if lower.starts_with("video/") {
            Ok(PreviewKind::Video)
        } else {
            Err(Error::unsupported_attachment(mime_type))
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PreviewKind::Image => "image",
            PreviewKind::Video => "video",
        }
    }
}

/// A transient local resource standing in for the file until it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: u64,
    pub url: String,
    pub kind: PreviewKind,
}

/// Issues preview handles and tracks which are still alive.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: u64,
    live: HashSet<u64>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, kind: PreviewKind, filename: &str) -> PreviewHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id);
        PreviewHandle {
            id,
            url: format!("preview://{id}/{filename}"),
            kind,
        }
    }

    /// Release a handle. Returns `false` if it was already released.
    pub fn release(&mut self, handle: &PreviewHandle) -> bool {
        let released = self.live.remove(&handle.id);
        if !released {
            warn!("Preview handle {} released twice", handle.id);
        }
        released
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Staging
// ─────────────────────────────────────────────────────────────────────────────

/// An attachment waiting in the staging slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
    pub preview: Option<PreviewHandle>,
}

impl PendingAttachment {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn kind(&self) -> Option<PreviewKind> {
        self.preview.as_ref().map(|p| p.kind)
    }
}

#[derive(Debug, Default)]
pub struct AttachmentStaging {
    slot: Option<PendingAttachment>,
    previews: PreviewRegistry,
}

impl AttachmentStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `file`, replacing any attachment already in the slot.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedAttachmentType`] for anything but images and
    /// videos; the slot is left exactly as it was.
    pub fn stage(&mut self, file: AttachmentFile) -> Result<&PendingAttachment> {
        let kind = PreviewKind::classify(&file.mime_type)?;

        self.release_current();
        let preview = self.previews.issue(kind, &file.filename);
        debug!(
            "Staged {} ({}, {} bytes) as {}",
            file.filename,
            file.mime_type,
            file.bytes.len(),
            preview.url
        );

        Ok(self.slot.insert(PendingAttachment {
            bytes: file.bytes,
            mime_type: file.mime_type,
            filename: file.filename,
            preview: Some(preview),
        }))
    }

    /// Empty the slot. Returns `true` if something was removed.
    pub fn clear(&mut self) -> bool {
        let had = self.slot.is_some();
        self.release_current();
        self.slot = None;
        had
    }

    /// Remove the staged attachment for sending, releasing its preview.
    pub fn take(&mut self) -> Option<AttachmentFile> {
        self.release_current();
        self.slot.take().map(|pending| AttachmentFile {
            filename: pending.filename,
            mime_type: pending.mime_type,
            bytes: pending.bytes,
        })
    }

    pub fn pending(&self) -> Option<&PendingAttachment> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Number of preview handles issued and not yet released.
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    fn release_current(&mut self) {
        if let Some(preview) = self.slot.as_mut().and_then(|p| p.preview.take()) {
            self.previews.release(&preview);
        }
    }
}
