pub fn accepts_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Where a stored `image_url` is served from. Paths under the uploads
/// prefix live in the static folder; anything else is used verbatim.
pub fn resolve_image_src(path: &str, static_prefix: &str, uploads_prefix: &str) -> String {
    let path = path.trim();
    if path.starts_with(uploads_prefix) {
        format!("{}/{}", static_prefix.trim_end_matches('/'), path)
    } else {
        path.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingImage {
    pub name: String,
    pub mime: String,
    pub data_url: Option<String>,
    read_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageDisplay {
    Prompt,
    Stored(String),
    /// A file is pending; `None` until the data URL has been decoded.
    Pending(Option<String>),
}

/// Drop-zone state; the `File` itself stays in the wasm layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageCapture {
    stored_src: Option<String>,
    pending: Option<PendingImage>,
    delete_current: bool,
    reads: u64,
    hovering: bool,
}

impl ImageCapture {
    /// Installs the server-side image. The read counter survives so that a
    /// decode still running from an earlier session can't match a new file.
    pub fn set_stored(&mut self, stored_src: Option<String>) {
        self.stored_src = stored_src.filter(|s| !s.trim().is_empty());
    }

    pub fn has_stored(&self) -> bool {
        self.stored_src.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingImage> {
        self.pending.as_ref()
    }

    pub fn delete_current(&self) -> bool {
        self.delete_current
    }

    pub fn hovering(&self) -> bool {
        self.hovering
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    /// Registers a picked/dropped/pasted file. Returns the read id the
    /// decoded preview must be delivered with, or `None` for non-images.
    pub fn accept(&mut self, name: &str, mime: &str) -> Option<u64> {
        if !accepts_mime(mime) {
            return None;
        }
        self.reads += 1;
        self.pending = Some(PendingImage {
            name: name.to_string(),
            mime: mime.to_string(),
            data_url: None,
            read_id: self.reads,
        });
        Some(self.reads)
    }

    /// Stores a decoded preview unless a newer file replaced the one it
    /// belongs to.
    pub fn preview_ready(&mut self, read_id: u64, data_url: String) -> bool {
        match self.pending.as_mut() {
            Some(pending) if pending.read_id == read_id => {
                pending.data_url = Some(data_url);
                true
            }
            _ => false,
        }
    }

    pub fn clear_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn set_delete_current(&mut self, delete: bool) {
        self.delete_current = delete;
    }

    /// Sent as `delete_current_image=on`.
    pub fn wants_delete(&self) -> bool {
        self.delete_current && self.pending.is_none() && self.stored_src.is_some()
    }

    pub fn display(&self) -> ImageDisplay {
        if let Some(pending) = &self.pending {
            return ImageDisplay::Pending(pending.data_url.clone());
        }
        match &self.stored_src {
            Some(src) if !self.delete_current => ImageDisplay::Stored(src.clone()),
            _ => ImageDisplay::Prompt,
        }
    }

    pub fn reset(&mut self) {
        let reads = self.reads;
        *self = Self::default();
        self.reads = reads;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        let mut capture = ImageCapture::default();
        assert_eq!(capture.accept("notes.txt", "text/plain"), None);
        assert!(!capture.has_pending());
        assert!(capture.accept("logo.PNG", "IMAGE/PNG").is_some());
        assert!(capture.has_pending());
    }

    #[test]
    fn newest_file_owns_the_preview() {
        let mut capture = ImageCapture::default();
        let first = capture.accept("a.png", "image/png").unwrap();
        let second = capture.accept("b.png", "image/png").unwrap();
        assert!(capture.preview_ready(second, "data:image/png;base64,BBB".into()));
        assert!(!capture.preview_ready(first, "data:image/png;base64,AAA".into()));
        assert_eq!(
            capture.display(),
            ImageDisplay::Pending(Some("data:image/png;base64,BBB".into()))
        );
        assert_eq!(capture.pending().unwrap().name, "b.png");
    }

    #[test]
    fn delete_checkbox_hides_stored_image() {
        let mut capture = ImageCapture::default();
        capture.set_stored(Some("/static/uploads/x.png".into()));
        assert_eq!(capture.display(), ImageDisplay::Stored("/static/uploads/x.png".into()));

        capture.set_delete_current(true);
        assert_eq!(capture.display(), ImageDisplay::Prompt);
        assert!(capture.wants_delete());

        let read = capture.accept("new.jpg", "image/jpeg").unwrap();
        capture.preview_ready(read, "data:image/jpeg;base64,Z".into());
        assert!(!capture.wants_delete());
        assert!(matches!(capture.display(), ImageDisplay::Pending(Some(_))));

        capture.clear_pending();
        assert!(capture.wants_delete());
    }

    #[test]
    fn delete_without_stored_image_is_a_no_op() {
        let mut capture = ImageCapture::default();
        capture.set_stored(Some("  ".into()));
        capture.set_delete_current(true);
        assert!(!capture.wants_delete());
    }

    #[test]
    fn reset_drops_pending_and_stale_reads() {
        let mut capture = ImageCapture::default();
        capture.set_stored(Some("https://cdn.example.com/a.png".into()));
        let read = capture.accept("a.png", "image/png").unwrap();
        capture.reset();
        assert_eq!(capture, {
            let mut fresh = ImageCapture::default();
            fresh.reads = read;
            fresh
        });
        assert!(!capture.preview_ready(read, "data:".into()));
        assert_eq!(capture.display(), ImageDisplay::Prompt);
    }

    #[test]
    fn stored_image_keeps_read_counter() {
        let mut capture = ImageCapture::default();
        let old = capture.accept("old.png", "image/png").unwrap();
        capture.reset();
        capture.set_stored(Some("/static/uploads/b.png".into()));
        let new = capture.accept("new.png", "image/png").unwrap();
        assert_ne!(old, new);
        assert!(!capture.preview_ready(old, "data:OLD".into()));
        assert_eq!(capture.display(), ImageDisplay::Pending(None));
    }

    #[test]
    fn stored_paths_resolve_against_static_prefix() {
        assert_eq!(
            resolve_image_src("uploads/ab12_logo.png", "/static/", "uploads/"),
            "/static/uploads/ab12_logo.png"
        );
        assert_eq!(
            resolve_image_src("https://cdn.example.com/og.png", "/static", "uploads/"),
            "https://cdn.example.com/og.png"
        );
    }
}
