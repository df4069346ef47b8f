use leptos::prelude::*;
use leptos::web_sys::{Element, Event, File, FileList, FileReader, HtmlSelectElement};
use wasm_bindgen::prelude::*;

use crate::config::{normalize_domains, ConfigError, DashboardConfig, APP_DOMAINS_GLOBAL, CONFIG_ELEMENT_ID};
use crate::image_capture::accepts_mime;
use crate::link_resolver::{resolve_link, AppDomains, LinkTarget};

pub fn query_all(selector: &str) -> Vec<Element> {
    let Ok(list) = document().query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// `data-id` of each child element, in DOM order.
pub fn child_ids(container: &Element) -> Vec<Option<String>> {
    let children = container.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .map(|child| child.get_attribute("data-id"))
        .collect()
}

pub fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

pub fn set_body_class(class: &str, on: bool) {
    if let Some(body) = document().body() {
        let _ = body.class_list().toggle_with_force(class, on);
    }
}

/// First image in a file list; anything else is ignored.
pub fn first_image(files: Option<FileList>) -> Option<File> {
    let files = files?;
    (0..files.length())
        .filter_map(|i| files.get(i))
        .find(|file| accepts_mime(&file.type_()))
}

/// Decodes `file` into a data URL and hands it to `on_ready`.
pub fn read_data_url<F>(file: &File, on_ready: F) -> Result<(), JsValue>
where
    F: FnOnce(String) + 'static,
{
    let reader = FileReader::new()?;
    let result_reader = reader.clone();
    let onload = Closure::once_into_js(move |_: Event| match result_reader.result() {
        Ok(result) => match result.as_string() {
            Some(data_url) => on_ready(data_url),
            None => log::warn!("image reader produced a non-string result"),
        },
        Err(err) => log::warn!("image read failed: {err:?}"),
    });
    reader.set_onload(Some(onload.unchecked_ref()));
    reader.read_as_data_url(file)
}

pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    let raw = document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
        .unwrap_or_default();
    DashboardConfig::from_json(&raw)
}

pub fn load_app_domains() -> Result<AppDomains, ConfigError> {
    let value = js_sys::Reflect::get(&window(), &JsValue::from_str(APP_DOMAINS_GLOBAL))
        .map_err(|e| ConfigError::Domains(format!("{e:?}")))?;
    if value.is_undefined() || value.is_null() {
        return Ok(AppDomains::new());
    }
    let domains: AppDomains = serde_wasm_bindgen::from_value(value)
        .map_err(|e| ConfigError::Domains(e.to_string()))?;
    Ok(normalize_domains(domains))
}

/// Rewrites every `.dynamic-link` for `environment`.
pub fn apply_environment(environment: &str, domains: &AppDomains) {
    let environment = environment.trim();
    if environment.is_empty() {
        return;
    }
    let links = query_all(".dynamic-link");
    let mut placeholders = 0;
    for link in &links {
        let Some(target) = LinkTarget::from_attributes(
            link.get_attribute("data-link-type").as_deref(),
            link.get_attribute("data-port").as_deref(),
            link.get_attribute("data-subdomain").as_deref(),
            link.get_attribute("data-url").as_deref(),
        ) else {
            log::debug!("skipping dynamic link without a known data-link-type");
            continue;
        };
        let resolution = resolve_link(&target, environment, domains);
        if let Some(warning) = &resolution.warning {
            log::warn!("link for environment {environment:?}: {warning}");
        }
        if !resolution.link.is_navigable() {
            placeholders += 1;
        }
        let _ = link.set_attribute("href", &resolution.link.href);
        link.set_text_content(Some(&resolution.link.text));
    }
    log::debug!(
        "resolved {} links for {environment:?}, {placeholders} left as placeholders",
        links.len()
    );
}

pub fn install_environment_selector(domains: AppDomains) {
    let Some(selector) = document()
        .get_element_by_id("environment-selector")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
    else {
        return;
    };

    apply_environment(&selector.value(), &domains);

    let closure = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
        let value = e
            .target()
            .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
            .map(|select| select.value())
            .unwrap_or_default();
        apply_environment(&value, &domains);
    });
    let _ = selector.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}
