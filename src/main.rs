mod api;
mod app;
mod config;
mod dom;
mod entry_modal;
mod image_capture;
mod link_resolver;
mod logging;
mod modal;
mod models;
mod order_sync;
mod preview;
mod section_modal;
mod sortable;
mod url_fields;

use app::*;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let (config, config_error) = match dom::load_config() {
        Ok(config) => (config, None),
        Err(err) => (config::DashboardConfig::default(), Some(err)),
    };
    logging::init(config.log_level());
    if let Some(err) = config_error {
        log::error!("dashboard config unreadable, using defaults: {err}");
    }

    let domains = dom::load_app_domains().unwrap_or_else(|err| {
        log::error!("APP_DOMAINS unreadable, links stay unresolved: {err}");
        link_resolver::AppDomains::new()
    });
    log::info!("dashboard ui starting with {} configured environments", domains.len());

    mount_to_body(move || view! { <App config=config domains=domains /> });
}
