use leptos::prelude::*;
use leptos::web_sys::{ClipboardEvent, Element, MouseEvent};
use wasm_bindgen::prelude::*;

use crate::config::DashboardConfig;
use crate::dom::{self, first_image};
use crate::entry_modal::{open_edit_entry, EntryModal, EntryModalHandle};
use crate::link_resolver::AppDomains;
use crate::modal::{EntryModalModel, ModalController, ModalKind, SectionEdit};
use crate::section_modal::SectionModal;
use crate::sortable::{install_edit_mode, Sortables};

/// The page's modals and the single "which one is open" switch.
#[derive(Clone, Copy)]
pub struct Modals {
    pub controller: RwSignal<ModalController>,
    pub add: EntryModalHandle,
    pub edit: EntryModalHandle,
    pub section: RwSignal<SectionEdit>,
}

impl Modals {
    pub fn open(&self, kind: ModalKind) {
        if let Some(displaced) = self.controller.try_update(|c| c.open(kind)).flatten() {
            self.reset(displaced);
        }
        log::debug!("opened {}", kind.dom_id());
    }

    /// Closing always resets, so the next open starts clean.
    pub fn close(&self, kind: ModalKind) {
        if self.controller.try_update(|c| c.close(kind)).unwrap_or(false) {
            self.reset(kind);
        }
    }

    fn reset(&self, kind: ModalKind) {
        match kind {
            ModalKind::AddEntry => self.add.reset(),
            ModalKind::EditEntry => self.edit.reset(),
            ModalKind::EditSection => self.section.set(SectionEdit::default()),
        }
    }

    pub fn entry(&self, kind: ModalKind) -> Option<EntryModalHandle> {
        match kind {
            ModalKind::AddEntry => Some(self.add),
            ModalKind::EditEntry => Some(self.edit),
            ModalKind::EditSection => None,
        }
    }

    pub fn open_add(&self, section_id: Option<i64>) {
        self.add.reset();
        self.add.model.update(|m| m.preselect_section(section_id));
        self.open(ModalKind::AddEntry);
    }

    pub fn open_section(&self, edit: SectionEdit) {
        self.section.set(edit);
        self.open(ModalKind::EditSection);
    }
}

fn closest(target: &Element, selector: &str) -> Option<Element> {
    target.closest(selector).ok().flatten()
}

/// Buttons on the server-rendered cards and section headers.
fn install_page_triggers(modals: Modals) {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
        let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(button) = closest(&target, ".edit-entry-btn") {
            ev.prevent_default();
            match button.get_attribute("data-entry-id") {
                Some(entry_id) if !entry_id.trim().is_empty() => {
                    open_edit_entry(modals, entry_id.trim().to_string())
                }
                _ => log::warn!("edit button without data-entry-id"),
            }
        } else if let Some(button) = closest(&target, ".edit-section-btn") {
            ev.prevent_default();
            match SectionEdit::from_attributes(
                button.get_attribute("data-section-id"),
                button.get_attribute("data-section-name"),
            ) {
                Some(edit) => modals.open_section(edit),
                None => log::warn!("edit-section button without data-section-id"),
            }
        } else if let Some(button) = closest(&target, "[data-action=\"open-add-entry\"]") {
            ev.prevent_default();
            let section_id = button
                .get_attribute("data-section-id")
                .and_then(|id| id.trim().parse::<i64>().ok());
            modals.open_add(section_id);
        }
    });
    let _ = document().add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Clipboard images go to the drop zone of whichever entry modal is open.
fn install_paste_capture(modals: Modals) {
    let closure = Closure::<dyn FnMut(ClipboardEvent)>::new(move |ev: ClipboardEvent| {
        let Some(kind) = modals.controller.with_untracked(|c| c.paste_target()) else {
            return;
        };
        let Some(handle) = modals.entry(kind) else {
            return;
        };
        let files = ev.clipboard_data().and_then(|data| data.files());
        if let Some(file) = first_image(files) {
            ev.prevent_default();
            handle.accept_file(file);
        }
    });
    let _ = window().add_event_listener_with_callback("paste", closure.as_ref().unchecked_ref());
    closure.forget();
}

#[component]
pub fn App(config: DashboardConfig, domains: AppDomains) -> impl IntoView {
    let sections = config.sections.clone();
    let config = StoredValue::new(config);

    let modals = Modals {
        controller: RwSignal::new(ModalController::default()),
        add: EntryModalHandle::new(ModalKind::AddEntry, EntryModalModel::new_add(sections), config),
        edit: EntryModalHandle::new(ModalKind::EditEntry, EntryModalModel::new_edit(), config),
        section: RwSignal::new(SectionEdit::default()),
    };

    install_page_triggers(modals);
    install_paste_capture(modals);
    dom::install_environment_selector(domains);
    install_edit_mode(Sortables::install());

    view! {
        <EntryModal handle=modals.add modals=modals />
        <EntryModal handle=modals.edit modals=modals />
        <SectionModal modals=modals />
        <div
            class="modal-backdrop fade show"
            style:display=move || if modals.controller.with(|c| c.current().is_some()) { "block" } else { "none" }
        ></div>
    }
}
