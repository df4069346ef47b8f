use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos::web_sys::{DragEvent, File, FormData, HtmlInputElement, MouseEvent, SubmitEvent};
use wasm_bindgen::prelude::*;

use crate::api::{self, ApiError};
use crate::app::Modals;
use crate::config::DashboardConfig;
use crate::dom::{alert, first_image, read_data_url};
use crate::image_capture::ImageDisplay;
use crate::modal::{EntryModalModel, FormContext, ModalKind, SubmitOutcome, IMAGE_FIELD};
use crate::models::{EntryDetails, LinkPreviewResponse, LinkType};
use crate::preview::{PreviewAction, PreviewState};
use crate::url_fields::{field_name, value_input_spec};

/// Everything one entry modal owns: its view-model plus the browser objects
/// that can't live in a signal.
#[derive(Clone, Copy)]
pub struct EntryModalHandle {
    pub kind: ModalKind,
    pub model: RwSignal<EntryModalModel>,
    file: StoredValue<Option<File>, LocalStorage>,
    preview_timer: StoredValue<Option<Timeout>, LocalStorage>,
    config: StoredValue<DashboardConfig>,
}

impl EntryModalHandle {
    pub fn new(kind: ModalKind, model: EntryModalModel, config: StoredValue<DashboardConfig>) -> Self {
        Self {
            kind,
            model: RwSignal::new(model),
            file: StoredValue::new_local(None),
            preview_timer: StoredValue::new_local(None),
            config,
        }
    }

    pub fn reset(&self) {
        self.file.set_value(None);
        self.preview_timer.set_value(None);
        self.model.update(|m| m.reset());
    }

    pub fn populate(&self, details: EntryDetails) {
        let (static_prefix, uploads_prefix) = self
            .config
            .with_value(|c| (c.static_prefix.clone(), c.uploads_prefix.clone()));
        self.file.set_value(None);
        self.preview_timer.set_value(None);
        self.model
            .update(|m| m.populate(details, &static_prefix, &uploads_prefix));
    }

    pub fn accept_file(&self, file: File) {
        let name = file.name();
        let mime = file.type_();
        let Some(read_id) = self
            .model
            .try_update(|m| m.image.accept(&name, &mime))
            .flatten()
        else {
            log::debug!("ignoring {mime:?} file dropped on the {} form", self.prefix());
            return;
        };

        // a manual image wins over any fetched preview
        self.preview_timer.set_value(None);
        self.model.update(|m| m.preview.suppress());

        let model = self.model;
        if let Err(err) = read_data_url(&file, move |data_url| {
            model.update(|m| {
                m.image.preview_ready(read_id, data_url);
            });
        }) {
            log::warn!("could not read {name:?}: {err:?}");
        }
        self.file.set_value(Some(file));
    }

    pub fn clear_image(&self) {
        self.file.set_value(None);
        let action = self.model.try_update(|m| {
            m.image.clear_pending();
            let source = m.preview_source().unwrap_or_default().to_string();
            m.preview.release(&source)
        });
        if let Some(action) = action {
            self.run_preview(action);
        }
    }

    pub fn set_link_type(&self, index: u32, link_type: LinkType) {
        self.model.update(|m| m.urls.set_type(index, link_type));
        self.refresh_preview(index);
    }

    pub fn set_url_value(&self, index: u32, value: String) {
        self.model.update(|m| m.urls.set_value(index, value));
        self.refresh_preview(index);
    }

    pub fn add_url(&self) {
        self.model.update(|m| {
            m.urls.push_blank();
        });
    }

    pub fn remove_url(&self, index: u32) {
        let was_preview_row = self.model.with_untracked(|m| m.is_preview_row(index));
        self.model.update(|m| {
            m.urls.remove(index);
        });
        if was_preview_row {
            self.refresh_preview_source();
        }
    }

    fn prefix(&self) -> &'static str {
        self.model.with_untracked(|m| m.context.prefix())
    }

    fn refresh_preview(&self, index: u32) {
        if self.model.with_untracked(|m| m.is_preview_row(index)) {
            self.refresh_preview_source();
        }
    }

    fn refresh_preview_source(&self) {
        let action = self.model.try_update(|m| {
            let source = m.preview_source().unwrap_or_default().to_string();
            m.preview.on_input(&source)
        });
        if let Some(action) = action {
            self.run_preview(action);
        }
    }

    fn run_preview(&self, action: PreviewAction) {
        let PreviewAction::Schedule { token, url } = action else {
            self.preview_timer.set_value(None);
            return;
        };
        let model = self.model;
        let delay = self.config.with_value(|c| c.preview_debounce_ms);
        // replacing the stored timer drops (cancels) the previous one
        let timer = Timeout::new(delay, move || {
            if model.try_update(|m| m.preview.begin(token)) != Some(true) {
                return;
            }
            spawn_local(async move {
                let response = match api::link_preview(&url).await {
                    Ok(response) => {
                        if let LinkPreviewResponse::Error { error } = &response {
                            log::warn!("preview for {url}: {error}");
                        }
                        Some(response)
                    }
                    Err(err) => {
                        log::warn!("preview for {url} failed: {err}");
                        None
                    }
                };
                model.update(|m| {
                    if !m.preview.finish(token, &url, response) {
                        log::debug!("dropped stale preview for {url}");
                    }
                });
            });
        });
        self.preview_timer.set_value(Some(timer));
    }

    fn form_data(&self) -> Result<FormData, JsValue> {
        let payload = self.model.with_untracked(|m| m.payload());
        let form = FormData::new()?;
        for (name, value) in &payload.fields {
            form.append_with_str(name, value)?;
        }
        if payload.attach_image {
            if let Some(file) = self.file.with_value(|f| f.clone()) {
                form.append_with_blob_and_filename(IMAGE_FIELD, &file, &file.name())?;
            }
        }
        Ok(form)
    }

    pub fn submit(&self, ev: SubmitEvent, modals: Modals) {
        ev.prevent_default();
        if self.model.with_untracked(|m| m.submitting) {
            return;
        }
        let add_action = self.config.with_value(|c| c.add_entry_action.clone());
        let action = self.model.with_untracked(|m| m.action(&add_action));
        let form = match self.form_data() {
            Ok(form) => form,
            Err(err) => {
                log::error!("could not build form data: {err:?}");
                return;
            }
        };

        self.model.update(|m| m.submitting = true);
        let handle = *self;
        spawn_local(async move {
            match api::submit_entry_form(&action, form).await {
                Ok(SubmitOutcome::Alert(message)) => {
                    handle.model.update(|m| m.submitting = false);
                    alert(&message);
                }
                Ok(outcome) => {
                    modals.close(handle.kind);
                    let location = window().location();
                    let navigated = match outcome {
                        SubmitOutcome::Navigate(url) => location.set_href(&url),
                        _ => location.reload(),
                    };
                    if let Err(err) = navigated {
                        log::error!("could not leave the page after saving: {err:?}");
                    }
                }
                Err(err) => {
                    handle.model.update(|m| m.submitting = false);
                    log::error!("saving entry to {action} failed: {err}");
                    alert(&format!("Could not save the entry: {err}"));
                }
            }
        });
    }
}

/// Fetches the entry and opens the edit modal, or alerts and stays closed.
pub fn open_edit_entry(modals: Modals, entry_id: String) {
    spawn_local(async move {
        match api::entry_details(&entry_id).await {
            Ok(details) => {
                modals.edit.populate(details);
                modals.open(ModalKind::EditEntry);
            }
            Err(ApiError::Server(message)) => alert(&message),
            Err(err) => {
                log::error!("loading entry {entry_id} failed: {err}");
                alert(&format!("Could not load the entry: {err}"));
            }
        }
    });
}

#[component]
pub fn EntryModal(handle: EntryModalHandle, modals: Modals) -> impl IntoView {
    let kind = handle.kind;
    let model = handle.model;
    let is_open = move || modals.controller.with(|c| c.is_open(kind));
    let heading = move || {
        model.with(|m| match m.context {
            FormContext::Add => "Add entry".to_string(),
            FormContext::Edit { .. } => format!("Edit entry: {}", m.loaded_title),
        })
    };
    let sections = Memo::new(move |_| model.with(|m| m.sections.clone()));
    let is_add = move || model.with(|m| m.context == FormContext::Add);

    view! {
        <div
            id=kind.dom_id()
            class="modal"
            class:show=is_open
            style:display=move || if is_open() { "block" } else { "none" }
            tabindex="-1"
            on:click=move |ev: MouseEvent| {
                if ev.target() == ev.current_target() {
                    modals.close(kind);
                }
            }
        >
            <div class="modal-dialog modal-lg">
                <div class="modal-content">
                    <form on:submit=move |ev| handle.submit(ev, modals)>
                        <div class="modal-header">
                            <h5 class="modal-title">{heading}</h5>
                            <button type="button" class="close" on:click=move |_| modals.close(kind)>
                                "×"
                            </button>
                        </div>
                        <div class="modal-body">
                            <div class="form-group">
                                <label>"Title"</label>
                                <input
                                    type="text"
                                    class="form-control"
                                    name="link_title"
                                    required
                                    prop:value=move || model.with(|m| m.title.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        model.update(|m| m.title = value);
                                    }
                                />
                            </div>
                            <div class="form-group">
                                <label>"Description"</label>
                                <textarea
                                    class="form-control"
                                    name="link_description"
                                    rows="2"
                                    prop:value=move || model.with(|m| m.description.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        model.update(|m| m.description = value);
                                    }
                                ></textarea>
                            </div>
                            <div class="form-row">
                                <div class="form-group col-md-6">
                                    <label>"Section"</label>
                                    <select
                                        class="form-control"
                                        name="section_id"
                                        required
                                        on:change=move |ev| {
                                            let value = event_target_value(&ev).parse::<i64>().ok();
                                            model.update(|m| m.section_id = value);
                                        }
                                    >
                                        <option value="" prop:selected=move || model.with(|m| m.section_id.is_none())>
                                            "Choose a section"
                                        </option>
                                        {move || {
                                            sections
                                                .get()
                                                .into_iter()
                                                .map(|section| {
                                                    let id = section.id;
                                                    view! {
                                                        <option
                                                            value=id.to_string()
                                                            prop:selected=move || model.with(|m| m.section_id == Some(id))
                                                        >
                                                            {section.name}
                                                        </option>
                                                    }
                                                })
                                                .collect::<Vec<_>>()
                                        }}
                                    </select>
                                </div>
                                <div class="form-group col-md-6">
                                    <label>"Custom image"</label>
                                    <ImageDropZone handle=handle />
                                </div>
                            </div>
                            <Show when=is_add>
                                <PreviewPanel model=model />
                            </Show>
                            <hr />
                            <h6>"Links"</h6>
                            <div id=format!("urls-container-{}", handle.prefix())>
                                <For
                                    each=move || model.with(|m| m.urls.indices())
                                    key=|index| *index
                                    children=move |index| view! { <UrlFieldRow handle=handle index=index /> }
                                />
                            </div>
                            <button type="button" class="btn btn-secondary mt-2" on:click=move |_| handle.add_url()>
                                "+ Add link"
                            </button>
                        </div>
                        <div class="modal-footer">
                            <button type="button" class="btn btn-secondary" on:click=move |_| modals.close(kind)>
                                "Cancel"
                            </button>
                            <button
                                type="submit"
                                class="btn btn-primary"
                                prop:disabled=move || model.with(|m| m.submitting)
                            >
                                {move || if is_add() { "Add entry" } else { "Save changes" }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[component]
fn UrlFieldRow(handle: EntryModalHandle, index: u32) -> impl IntoView {
    let model = handle.model;
    let prefix = handle.prefix();
    let link_type = Memo::new(move |_| {
        model.with(|m| m.urls.get(index).map(|f| f.link_type).unwrap_or_default())
    });
    let position = move || {
        model.with(|m| m.urls.indices().iter().position(|i| *i == index).unwrap_or_default())
    };
    let radio_group = format!("{prefix}-urls-{index}-type");

    let radios = LinkType::ALL
        .into_iter()
        .map(|ty| {
            let radio_id = format!("{prefix}-type-{}-{index}", ty.as_str());
            view! {
                <div class="form-check form-check-inline">
                    <input
                        class="form-check-input link-type-radio"
                        type="radio"
                        id=radio_id.clone()
                        name=radio_group.clone()
                        value=ty.as_str()
                        prop:checked=move || link_type.get() == ty
                        on:change=move |_| handle.set_link_type(index, ty)
                    />
                    <label class="form-check-label" for=radio_id>
                        {ty.label()}
                    </label>
                </div>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="url-field-group mb-3 p-3" id=format!("{prefix}-link-field-{index}")>
            <input
                type="hidden"
                name=move || field_name(position(), "id")
                prop:value=move || {
                    model.with(|m| m.urls.get(index).map(|f| f.submitted_id()).unwrap_or_default())
                }
            />
            <div class="form-group">{radios}</div>
            <div class="form-row">
                <div class="form-group col-md-6">
                    <label>"Label"</label>
                    <input
                        type="text"
                        class="form-control"
                        name=move || field_name(position(), "label")
                        placeholder="e.g. Jellyfin"
                        prop:value=move || {
                            model.with(|m| m.urls.get(index).map(|f| f.label.clone()).unwrap_or_default())
                        }
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            model.update(|m| m.urls.set_label(index, value));
                        }
                    />
                </div>
                <div class="form-group col-md-6 value-field-container">
                    {move || {
                        let spec = value_input_spec(link_type.get());
                        view! {
                            <label>{spec.label}</label>
                            <input
                                type=spec.input_type
                                class="form-control"
                                name=move || field_name(position(), "value")
                                placeholder=spec.placeholder
                                required
                                prop:value=move || {
                                    model.with(|m| m.urls.get(index).map(|f| f.value.clone()).unwrap_or_default())
                                }
                                on:input=move |ev| handle.set_url_value(index, event_target_value(&ev))
                            />
                        }
                    }}
                </div>
            </div>
            <button
                type="button"
                class="btn btn-sm btn-danger remove-url-field"
                on:click=move |_| handle.remove_url(index)
            >
                "Remove"
            </button>
        </div>
    }
}

#[component]
fn ImageDropZone(handle: EntryModalHandle) -> impl IntoView {
    let model = handle.model;
    let prefix = handle.prefix();
    let file_input = NodeRef::<leptos::html::Input>::new();
    let display = Memo::new(move |_| model.with(|m| m.image.display()));

    let on_click = move |ev: MouseEvent| {
        let clicked_control = ev
            .target()
            .and_then(|t| t.dyn_into::<leptos::web_sys::Element>().ok())
            .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "BUTTON" | "LABEL"));
        if clicked_control {
            return;
        }
        if let Some(input) = file_input.get() {
            input.click();
        }
    };
    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        model.update(|m| m.image.set_hovering(true));
    };
    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        model.update(|m| m.image.set_hovering(false));
        if let Some(file) = first_image(ev.data_transfer().and_then(|dt| dt.files())) {
            handle.accept_file(file);
        }
    };

    view! {
        <div
            class="image-drop-zone"
            id=format!("{prefix}-image-drop-zone")
            class:drag-over=move || model.with(|m| m.image.hovering())
            on:click=on_click
            on:dragover=on_drag_over
            on:dragleave=move |_| model.update(|m| m.image.set_hovering(false))
            on:drop=on_drop
        >
            <div class="image-preview-container" id=format!("{prefix}-image-preview-container")>
                {move || match display.get() {
                    ImageDisplay::Prompt => {
                        view! { <span class="drop-zone-prompt">"Drag, paste (Ctrl+V) or click"</span> }
                            .into_any()
                    }
                    ImageDisplay::Stored(src) => view! { <img src=src alt="Current image" /> }.into_any(),
                    ImageDisplay::Pending(Some(data_url)) => {
                        view! { <img src=data_url alt="New image preview" /> }.into_any()
                    }
                    ImageDisplay::Pending(None) => {
                        view! { <span class="drop-zone-prompt">"Loading preview..."</span> }.into_any()
                    }
                }}
            </div>
            <input
                type="file"
                class="form-control-file image-file-input"
                accept="image/*"
                style="display: none;"
                node_ref=file_input
                on:change=move |ev| {
                    let input: HtmlInputElement = event_target(&ev);
                    if let Some(file) = first_image(input.files()) {
                        handle.accept_file(file);
                    }
                    // same file picked twice must fire change again
                    input.set_value("");
                }
            />
        </div>
        {move || {
            model.with(|m| {
                m.image.pending().map(|pending| {
                    let caption = format!("{} ({})", pending.name, pending.mime);
                    view! { <small class="form-text text-muted pending-image-name">{caption}</small> }
                })
            })
        }}
        <Show when=move || model.with(|m| m.image.has_pending())>
            <button type="button" class="btn btn-sm btn-link" on:click=move |_| handle.clear_image()>
                "Discard new image"
            </button>
        </Show>
        <Show when=move || model.with(|m| m.image.has_stored())>
            <div class="form-group form-check">
                <input
                    type="checkbox"
                    class="form-check-input"
                    id=format!("{prefix}-delete-current-image")
                    prop:checked=move || model.with(|m| m.image.delete_current())
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        model.update(|m| m.image.set_delete_current(checked));
                    }
                />
                <label class="form-check-label" for=format!("{prefix}-delete-current-image")>
                    "Delete current image"
                </label>
            </div>
        </Show>
    }
}

#[component]
fn PreviewPanel(model: RwSignal<EntryModalModel>) -> impl IntoView {
    let state = Memo::new(move |_| model.with(|m| m.preview.state().clone()));

    move || match state.get() {
        PreviewState::Hidden => ().into_any(),
        PreviewState::Loading => {
            view! { <div class="link-preview link-preview-loading">"Loading preview..."</div> }.into_any()
        }
        PreviewState::Failed => {
            view! { <div class="link-preview link-preview-failed">"No preview available for this URL"</div> }
                .into_any()
        }
        PreviewState::Ready(card) => view! {
            <div class="link-preview">
                {card.image_url.map(|src| view! { <img class="link-preview-image" src=src alt="" /> })}
                <div class="link-preview-text">
                    <strong>{card.title}</strong>
                    <p>{card.description}</p>
                </div>
            </div>
        }
        .into_any(),
    }
}
