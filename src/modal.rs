use crate::image_capture::{resolve_image_src, ImageCapture};
use crate::models::{EntryDetails, LinkType, SectionOption};
use crate::preview::PreviewTracker;
use crate::url_fields::UrlFieldList;

/// Multipart field carrying a pending image.
pub const IMAGE_FIELD: &str = "custom_image_file";
pub const DELETE_IMAGE_FIELD: &str = "delete_current_image";
pub const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModalKind {
    AddEntry,
    EditEntry,
    EditSection,
}

impl ModalKind {
    pub fn dom_id(self) -> &'static str {
        match self {
            ModalKind::AddEntry => "addLinkEntryModal",
            ModalKind::EditEntry => "editLinkEntryModal",
            ModalKind::EditSection => "editSectionModal",
        }
    }

    pub fn has_drop_zone(self) -> bool {
        matches!(self, ModalKind::AddEntry | ModalKind::EditEntry)
    }
}

/// Which modal is showing. Only one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModalController {
    open: Option<ModalKind>,
}

impl ModalController {
    pub fn current(&self) -> Option<ModalKind> {
        self.open
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.open == Some(kind)
    }

    /// Opens `kind`, returning a different modal it displaced so the caller
    /// can reset that one.
    pub fn open(&mut self, kind: ModalKind) -> Option<ModalKind> {
        self.open.replace(kind).filter(|prev| *prev != kind)
    }

    /// Returns true when `kind` was the open modal.
    pub fn close(&mut self, kind: ModalKind) -> bool {
        if self.open == Some(kind) {
            self.open = None;
            true
        } else {
            false
        }
    }

    /// Modal whose drop zone should receive a clipboard image.
    pub fn paste_target(&self) -> Option<ModalKind> {
        self.open.filter(|kind| kind.has_drop_zone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormContext {
    Add,
    Edit { entry_id: i64 },
}

impl FormContext {
    pub fn prefix(self) -> &'static str {
        match self {
            FormContext::Add => "add",
            FormContext::Edit { .. } => "edit",
        }
    }
}

/// View-model behind one entry modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryModalModel {
    pub context: FormContext,
    pub title: String,
    /// Title as loaded from the server, shown in the edit heading.
    pub loaded_title: String,
    pub description: String,
    pub section_id: Option<i64>,
    pub sections: Vec<SectionOption>,
    pub urls: UrlFieldList,
    pub image: ImageCapture,
    pub preview: PreviewTracker,
    pub submitting: bool,
}

impl EntryModalModel {
    pub fn new_add(sections: Vec<SectionOption>) -> Self {
        Self {
            context: FormContext::Add,
            title: String::new(),
            loaded_title: String::new(),
            description: String::new(),
            section_id: None,
            sections,
            urls: UrlFieldList::with_blank_row(),
            image: ImageCapture::default(),
            preview: PreviewTracker::default(),
            submitting: false,
        }
    }

    pub fn new_edit() -> Self {
        Self {
            context: FormContext::Edit { entry_id: 0 },
            urls: UrlFieldList::default(),
            sections: Vec::new(),
            ..Self::new_add(Vec::new())
        }
    }

    /// Back to the pristine state for this modal's context.
    pub fn reset(&mut self) {
        self.title.clear();
        self.loaded_title.clear();
        self.description.clear();
        self.section_id = None;
        self.image.reset();
        self.preview.reset();
        self.submitting = false;
        match self.context {
            FormContext::Add => {
                self.urls.clear();
                self.urls.push_blank();
            }
            FormContext::Edit { .. } => {
                self.context = FormContext::Edit { entry_id: 0 };
                self.urls.clear();
                self.sections.clear();
            }
        }
    }

    pub fn preselect_section(&mut self, section_id: Option<i64>) {
        self.section_id = section_id.filter(|id| self.sections.iter().any(|s| s.id == *id));
    }

    pub fn populate(&mut self, details: EntryDetails, static_prefix: &str, uploads_prefix: &str) {
        self.reset();
        self.context = FormContext::Edit {
            entry_id: details.id,
        };
        self.title = details.title.unwrap_or_default();
        self.loaded_title = self.title.clone();
        self.description = details.description.unwrap_or_default();
        self.section_id = Some(details.section_id);
        self.sections = details.all_sections;
        self.urls.populate(&details.urls);
        let stored = details
            .image_url
            .map(|url| resolve_image_src(&url, static_prefix, uploads_prefix));
        self.image.set_stored(stored);
    }

    pub fn action(&self, add_action: &str) -> String {
        match self.context {
            FormContext::Add => add_action.to_string(),
            FormContext::Edit { entry_id } => format!("/edit_link_entry/{entry_id}"),
        }
    }

    /// Value of the url row the preview fetcher listens to: the first row,
    /// on the add form, when it holds an external URL.
    pub fn preview_source(&self) -> Option<&str> {
        if self.context != FormContext::Add {
            return None;
        }
        self.urls
            .first()
            .filter(|f| f.link_type == LinkType::ExternalUrl)
            .map(|f| f.value.as_str())
    }

    pub fn is_preview_row(&self, index: u32) -> bool {
        self.context == FormContext::Add && self.urls.first().is_some_and(|f| f.index == index)
    }

    pub fn payload(&self) -> EntryFormPayload {
        let mut fields = vec![
            ("link_title".to_string(), self.title.trim().to_string()),
            (
                "link_description".to_string(),
                self.description.trim().to_string(),
            ),
            (
                "section_id".to_string(),
                self.section_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ];
        fields.extend(self.urls.form_fields());
        if self.image.wants_delete() {
            fields.push((DELETE_IMAGE_FIELD.to_string(), "on".to_string()));
        }
        EntryFormPayload {
            fields,
            attach_image: self.image.has_pending(),
        }
    }
}

/// Multipart body of an entry form, minus the file blob itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFormPayload {
    pub fields: Vec<(String, String)>,
    pub attach_image: bool,
}

impl EntryFormPayload {
    #[cfg(test)]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Navigate(String),
    Reload,
    Alert(String),
}

pub fn submit_outcome(ok: bool, status: u16, final_url: &str, body: &str) -> SubmitOutcome {
    if !ok {
        let body = body.trim();
        if body.is_empty() {
            return SubmitOutcome::Alert(format!("Saving failed (HTTP {status})"));
        }
        return SubmitOutcome::Alert(truncate_chars(body, ERROR_BODY_LIMIT));
    }
    if final_url.trim().is_empty() {
        SubmitOutcome::Reload
    } else {
        SubmitOutcome::Navigate(final_url.to_string())
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Edit-section modal contents, taken from the trigger's data attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionEdit {
    pub id: String,
    pub name: String,
}

impl SectionEdit {
    pub fn from_attributes(id: Option<String>, name: Option<String>) -> Option<Self> {
        let id = id.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        Some(Self {
            id,
            name: name.unwrap_or_default(),
        })
    }

    pub fn action(&self) -> String {
        format!("/edit_section/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_capture::ImageDisplay;
    use crate::models::UrlRecord;
    use crate::preview::{PreviewAction, PreviewState};

    fn sections() -> Vec<SectionOption> {
        vec![
            SectionOption {
                id: 1,
                name: "Media".into(),
            },
            SectionOption {
                id: 2,
                name: "Tools".into(),
            },
        ]
    }

    fn details() -> EntryDetails {
        EntryDetails {
            id: 42,
            title: Some("Jellyfin".into()),
            description: None,
            section_id: 2,
            image_url: Some("uploads/jf.png".into()),
            urls: vec![UrlRecord {
                id: 9,
                link_type: LinkType::InternalApp,
                value: "8096".into(),
                label: "LAN".into(),
            }],
            all_sections: sections(),
        }
    }

    #[test]
    fn controller_tracks_a_single_modal() {
        let mut modals = ModalController::default();
        assert_eq!(modals.open(ModalKind::AddEntry), None);
        assert_eq!(modals.paste_target(), Some(ModalKind::AddEntry));
        assert_eq!(modals.open(ModalKind::EditSection), Some(ModalKind::AddEntry));
        assert_eq!(modals.paste_target(), None);
        assert!(!modals.close(ModalKind::AddEntry));
        assert!(modals.close(ModalKind::EditSection));
        assert_eq!(modals.current(), None);
    }

    #[test]
    fn reopened_add_modal_is_pristine() {
        let mut model = EntryModalModel::new_add(sections());
        model.title = "Grafana".into();
        model.urls.push_blank();
        model.urls.set_value(0, "3000".into());
        model.image.accept("shot.png", "image/png");
        model.reset();

        assert_eq!(model.urls.len(), 1);
        let row = model.urls.first().unwrap();
        assert_eq!(row.index, 0);
        assert!(row.value.is_empty());
        assert!(!model.image.has_pending());
        assert!(model.title.is_empty());
        assert_eq!(model.sections.len(), 2);
    }

    #[test]
    fn populate_fills_edit_model() {
        let mut model = EntryModalModel::new_edit();
        model.populate(details(), "/static/", "uploads/");
        assert_eq!(model.context, FormContext::Edit { entry_id: 42 });
        assert_eq!(model.action("/add_link_entry"), "/edit_link_entry/42");
        assert_eq!(model.section_id, Some(2));
        assert_eq!(
            model.image.display(),
            ImageDisplay::Stored("/static/uploads/jf.png".into())
        );
        assert_eq!(model.urls.first().unwrap().submitted_id(), "9");
        assert_eq!(model.preview_source(), None);

        model.reset();
        assert!(model.urls.is_empty());
        assert!(!model.image.has_stored());
    }

    #[test]
    fn reopened_edit_modal_ignores_earlier_image_reads() {
        let mut model = EntryModalModel::new_edit();
        model.populate(details(), "/static/", "uploads/");
        let old_read = model.image.accept("old.png", "image/png").unwrap();
        model.reset();

        let mut second = details();
        second.id = 43;
        second.image_url = None;
        model.populate(second, "/static/", "uploads/");
        let new_read = model.image.accept("new.png", "image/png").unwrap();

        assert_ne!(old_read, new_read);
        assert!(!model.image.preview_ready(old_read, "data:OLD".into()));
        assert_eq!(model.image.display(), ImageDisplay::Pending(None));
        assert!(model.image.preview_ready(new_read, "data:NEW".into()));
        assert_eq!(
            model.image.display(),
            ImageDisplay::Pending(Some("data:NEW".into()))
        );
    }

    #[test]
    fn edit_heading_keeps_loaded_title() {
        let mut model = EntryModalModel::new_edit();
        model.populate(details(), "/static/", "uploads/");
        model.title = "Jellyfin (LAN)".into();
        assert_eq!(model.loaded_title, "Jellyfin");
        model.reset();
        assert!(model.loaded_title.is_empty());
    }

    #[test]
    fn payload_carries_delete_flag_and_urls() {
        let mut model = EntryModalModel::new_edit();
        model.populate(details(), "/static/", "uploads/");
        model.image.set_delete_current(true);
        let payload = model.payload();
        assert_eq!(payload.value("link_title"), Some("Jellyfin"));
        assert_eq!(payload.value("section_id"), Some("2"));
        assert_eq!(payload.value("urls[0][id]"), Some("9"));
        assert_eq!(payload.value(DELETE_IMAGE_FIELD), Some("on"));
        assert!(!payload.attach_image);

        model.image.accept("new.png", "image/png");
        let payload = model.payload();
        assert_eq!(payload.value(DELETE_IMAGE_FIELD), None);
        assert!(payload.attach_image);
    }

    #[test]
    fn pasting_hides_preview_and_clearing_refetches() {
        let mut model = EntryModalModel::new_add(sections());
        model.urls.set_type(0, LinkType::ExternalUrl);
        model.urls.set_value(0, "grafana.example.com".into());
        let source = model.preview_source().unwrap().to_string();
        let PreviewAction::Schedule { token, .. } = model.preview.on_input(&source) else {
            panic!("expected schedule");
        };
        model.preview.begin(token);
        assert_eq!(model.preview.state(), &PreviewState::Loading);

        model.image.accept("paste.png", "image/png");
        model.preview.suppress();
        assert_eq!(model.preview.state(), &PreviewState::Hidden);

        model.image.clear_pending();
        let source = model.preview_source().unwrap_or_default().to_string();
        assert!(matches!(
            model.preview.release(&source),
            PreviewAction::Schedule { .. }
        ));
    }

    #[test]
    fn preview_follows_first_external_row_only() {
        let mut model = EntryModalModel::new_add(sections());
        assert_eq!(model.preview_source(), None);
        model.urls.set_type(0, LinkType::ExternalUrl);
        assert_eq!(model.preview_source(), Some(""));
        assert!(model.is_preview_row(0));
        let second = model.urls.push_blank();
        assert!(!model.is_preview_row(second));
    }

    #[test]
    fn preselect_ignores_unknown_sections() {
        let mut model = EntryModalModel::new_add(sections());
        model.preselect_section(Some(2));
        assert_eq!(model.section_id, Some(2));
        model.preselect_section(Some(99));
        assert_eq!(model.section_id, None);
    }

    #[test]
    fn submit_outcomes() {
        assert_eq!(
            submit_outcome(true, 200, "http://dash.lan/", ""),
            SubmitOutcome::Navigate("http://dash.lan/".into())
        );
        assert_eq!(submit_outcome(true, 200, "", ""), SubmitOutcome::Reload);
        let long = "e".repeat(500);
        match submit_outcome(false, 500, "", &long) {
            SubmitOutcome::Alert(msg) => assert_eq!(msg.chars().count(), ERROR_BODY_LIMIT),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            submit_outcome(false, 502, "", "  "),
            SubmitOutcome::Alert("Saving failed (HTTP 502)".into())
        );
    }

    #[test]
    fn section_edit_needs_an_id() {
        assert_eq!(SectionEdit::from_attributes(Some(" ".into()), None), None);
        let edit = SectionEdit::from_attributes(Some("5".into()), Some("Media".into())).unwrap();
        assert_eq!(edit.action(), "/edit_section/5");
    }
}
