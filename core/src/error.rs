use thiserror::Error;

/// Failures surfaced by clipboard ports and the image codec.
///
/// None of these ever reach the user: the bridge degrades to the file
/// chooser, to a no-op, or drops the mirror write.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The platform refused clipboard access.
    #[error("clipboard access denied")]
    PermissionDenied,

    /// The clipboard API could not be reached at all.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard holds nothing of the requested kind.
    #[error("no {0} content on clipboard")]
    NoMatchingContent(String),

    /// The port cannot write payloads of this type.
    #[error("unsupported clipboard type: {0}")]
    UnsupportedType(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid RGBA buffer for {width}x{height} image")]
    InvalidBuffer { width: u32, height: u32 },
}

impl ClipboardError {
    /// Whether this failure came from the image codec rather than the clipboard.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidBuffer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failure_classification() {
        assert!(ClipboardError::InvalidBuffer {
            width: 2,
            height: 2
        }
        .is_decode_failure());
        assert!(!ClipboardError::PermissionDenied.is_decode_failure());
        assert!(!ClipboardError::NoMatchingContent("image".into()).is_decode_failure());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ClipboardError::NoMatchingContent("text/plain".into()).to_string(),
            "no text/plain content on clipboard"
        );
        assert_eq!(
            ClipboardError::PermissionDenied.to_string(),
            "clipboard access denied"
        );
    }
}
