use leptos::prelude::*;
use leptos::web_sys::MouseEvent;

use crate::app::Modals;
use crate::modal::ModalKind;

/// Rename form for a section. Submitted natively to `/edit_section/:id`.
#[component]
pub fn SectionModal(modals: Modals) -> impl IntoView {
    let kind = ModalKind::EditSection;
    let section = modals.section;
    let is_open = move || modals.controller.with(|c| c.is_open(kind));

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
            <div class="modal-dialog">
                <div class="modal-content">
                    <form method="post" action=move || section.with(|s| s.action())>
                        <div class="modal-header">
                            <h5 class="modal-title">"Edit section"</h5>
                            <button type="button" class="close" on:click=move |_| modals.close(kind)>
                                "×"
                            </button>
                        </div>
                        <div class="modal-body">
                            <div class="form-group">
                                <label for="edit_section_name">"Section name"</label>
                                <input
                                    type="text"
                                    class="form-control"
                                    id="edit_section_name"
                                    name="edit_section_name"
                                    required
                                    prop:value=move || section.with(|s| s.name.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        section.update(|s| s.name = value);
                                    }
                                />
                            </div>
                        </div>
                        <div class="modal-footer">
                            <button type="button" class="btn btn-secondary" on:click=move |_| modals.close(kind)>
                                "Cancel"
                            </button>
                            <button type="submit" class="btn btn-primary">"Save"</button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
