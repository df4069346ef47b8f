use js_sys::{Object, Reflect};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos::web_sys::{Element, Event, HtmlInputElement, Node};
use wasm_bindgen::prelude::*;

use crate::api;
use crate::dom::{child_ids, query_all, set_body_class};
use crate::models::OrderUpdate;
use crate::order_sync::{entry_drop_updates, sections_update, GridSnapshot};

#[wasm_bindgen]
extern "C" {
    /// The page's global `Sortable` (SortableJS).
    pub type Sortable;

    #[wasm_bindgen(catch, static_method_of = Sortable, js_name = create)]
    fn create(el: &Element, options: &Object) -> Result<Sortable, JsValue>;

    #[wasm_bindgen(method)]
    fn option(this: &Sortable, name: &str, value: JsValue);

    type SortableEvent;

    #[wasm_bindgen(method, getter)]
    fn item(this: &SortableEvent) -> Element;

    #[wasm_bindgen(method, getter = from)]
    fn source(this: &SortableEvent) -> Element;

    #[wasm_bindgen(method, getter = to)]
    fn destination(this: &SortableEvent) -> Element;
}

pub const EDIT_MODE_CLASS: &str = "edit-mode";

fn set_option(options: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(options, &JsValue::from_str(key), value);
}

fn base_options(on_end: Closure<dyn FnMut(SortableEvent)>) -> Object {
    let options = Object::new();
    set_option(&options, "animation", &JsValue::from_f64(150.0));
    set_option(&options, "ghostClass", &JsValue::from_str("sortable-ghost"));
    set_option(&options, "disabled", &JsValue::TRUE);
    set_option(&options, "onEnd", on_end.as_ref());
    on_end.forget();
    options
}

fn post_updates(updates: Vec<OrderUpdate>) {
    for update in updates {
        spawn_local(async move {
            if let Err(err) = api::update_order(&update).await {
                log::error!("reorder of {:?} failed: {err}", update.kind);
            }
        });
    }
}

fn on_sections_end(evt: SortableEvent) {
    let update = sections_update(child_ids(&evt.destination()));
    log::debug!("sections reordered: {:?}", update.order);
    post_updates(vec![update]);
}

fn on_entries_end(evt: SortableEvent) {
    let from = evt.source();
    let to = evt.destination();
    let to_node: &Node = &to;
    let same_grid = from.is_same_node(Some(to_node));
    let updates = entry_drop_updates(
        evt.item().get_attribute("data-id"),
        GridSnapshot::new(from.get_attribute("data-section-id"), child_ids(&from)),
        GridSnapshot::new(to.get_attribute("data-section-id"), child_ids(&to)),
        same_grid,
    );
    post_updates(updates);
}

/// Sortables created for the page; all start disabled.
pub struct Sortables {
    instances: Vec<Sortable>,
}

impl Sortables {
    pub fn install() -> Self {
        let mut instances = Vec::new();

        if let Some(container) = document().get_element_by_id("sections-container") {
            let options = base_options(Closure::new(on_sections_end));
            set_option(&options, "handle", &JsValue::from_str(".handle-icon"));
            match Sortable::create(&container, &options) {
                Ok(sortable) => instances.push(sortable),
                Err(err) => log::error!("Sortable unavailable for sections: {err:?}"),
            }
        }

        for grid in query_all(".link-entries-grid") {
            let options = base_options(Closure::new(on_entries_end));
            // shared group lets cards move between sections
            set_option(&options, "group", &JsValue::from_str("shared"));
            match Sortable::create(&grid, &options) {
                Ok(sortable) => instances.push(sortable),
                Err(err) => log::error!("Sortable unavailable for entry grid: {err:?}"),
            }
        }

        log::debug!("{} sortable containers installed", instances.len());
        Self { instances }
    }

    pub fn set_enabled(&self, enabled: bool) {
        for sortable in &self.instances {
            sortable.option("disabled", JsValue::from_bool(!enabled));
        }
    }
}

/// Edit mode gates drag-and-drop. The page always starts outside it.
pub fn install_edit_mode(sortables: Sortables) {
    let apply = move |on: bool| {
        set_body_class(EDIT_MODE_CLASS, on);
        sortables.set_enabled(on);
    };

    let Some(checkbox) = document()
        .get_element_by_id("edit-mode-checkbox")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        apply(false);
        return;
    };
    checkbox.set_checked(false);
    apply(false);

    let closure = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
        let checked = e
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .is_some_and(|input| input.checked());
        apply(checked);
    });
    let _ = checkbox.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}
