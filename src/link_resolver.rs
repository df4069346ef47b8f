use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

use crate::models::LinkType;

/// Environment that subdomain links are published under.
pub const PUBLIC_ENVIRONMENT: &str = "public";

/// `APP_DOMAINS` from the page: environment name to base URL.
pub type AppDomains = HashMap<String, String>;

/// Per-link data carried by the `data-*` attributes of a `.dynamic-link`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    InternalApp { port: String },
    Subdomain { label: String },
    External { url: String },
}

impl LinkTarget {
    pub fn from_attributes(
        link_type: Option<&str>,
        port: Option<&str>,
        subdomain: Option<&str>,
        url: Option<&str>,
    ) -> Option<Self> {
        let owned = |v: Option<&str>| v.unwrap_or_default().trim().to_string();
        match LinkType::parse(link_type?)? {
            LinkType::InternalApp => Some(LinkTarget::InternalApp { port: owned(port) }),
            LinkType::Subdomain => Some(LinkTarget::Subdomain {
                label: owned(subdomain),
            }),
            LinkType::ExternalUrl => Some(LinkTarget::External { url: owned(url) }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
    pub href: String,
    pub text: String,
}

impl ResolvedLink {
    fn navigable(url: String) -> Self {
        Self {
            href: url.clone(),
            text: url,
        }
    }

    fn placeholder(text: impl Into<String>) -> Self {
        Self {
            href: "#".to_string(),
            text: text.into(),
        }
    }

    pub fn is_navigable(&self) -> bool {
        self.href != "#"
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("base URL {base:?} is not a valid URL: {reason}")]
    MalformedBase { base: String, reason: String },
    #[error("base URL {base:?} has no host")]
    MissingHost { base: String },
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("invalid subdomain label {0:?}")]
    InvalidSubdomain(String),
}

/// Outcome of resolving one link; `warning` carries anything worth logging.
#[derive(Debug, PartialEq, Eq)]
pub struct Resolution {
    pub link: ResolvedLink,
    pub warning: Option<LinkError>,
}

impl Resolution {
    fn ok(link: ResolvedLink) -> Self {
        Self {
            link,
            warning: None,
        }
    }

    fn failed(error: LinkError) -> Self {
        Self {
            link: ResolvedLink::placeholder("Invalid base URL"),
            warning: Some(error),
        }
    }
}

pub fn resolve_link(target: &LinkTarget, environment: &str, domains: &AppDomains) -> Resolution {
    match target {
        LinkTarget::External { url } => {
            if url.is_empty() {
                Resolution::ok(ResolvedLink::placeholder("No URL configured"))
            } else {
                Resolution::ok(ResolvedLink::navigable(url.clone()))
            }
        }
        LinkTarget::InternalApp { port } => {
            let Some(base) = base_url_for(domains, environment) else {
                return Resolution::ok(ResolvedLink::placeholder(format!(
                    "Set the '{environment}' domain in settings"
                )));
            };
            match internal_app_url(base, port) {
                Ok(url) => Resolution::ok(ResolvedLink::navigable(url)),
                Err(err @ LinkError::InvalidPort(_)) => Resolution {
                    link: ResolvedLink::placeholder("Invalid port"),
                    warning: Some(err),
                },
                Err(err) => Resolution::failed(err),
            }
        }
        LinkTarget::Subdomain { label } => {
            if environment != PUBLIC_ENVIRONMENT {
                return Resolution::ok(ResolvedLink::placeholder(format!(
                    "{label} (public only)"
                )));
            }
            let Some(base) = base_url_for(domains, PUBLIC_ENVIRONMENT) else {
                return Resolution::ok(ResolvedLink::placeholder(format!(
                    "{label} (set the public domain in settings)"
                )));
            };
            match subdomain_url(base, label) {
                Ok(url) => Resolution::ok(ResolvedLink::navigable(url)),
                Err(err @ LinkError::InvalidSubdomain(_)) => Resolution {
                    link: ResolvedLink::placeholder(format!("{label} (invalid subdomain)")),
                    warning: Some(err),
                },
                Err(err) => Resolution::failed(err),
            }
        }
    }
}

fn base_url_for<'a>(domains: &'a AppDomains, environment: &str) -> Option<&'a str> {
    domains
        .get(environment)
        .map(|base| base.trim())
        .filter(|base| !base.is_empty())
}

fn parse_base(base: &str) -> Result<(String, String), LinkError> {
    let parsed = Url::parse(base).map_err(|e| LinkError::MalformedBase {
        base: base.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| LinkError::MissingHost {
            base: base.to_string(),
        })?;
    Ok((parsed.scheme().to_string(), host.to_string()))
}

/// `scheme://host:port`, keeping scheme and host of `base` and replacing its port.
pub fn internal_app_url(base: &str, port: &str) -> Result<String, LinkError> {
    let (scheme, host) = parse_base(base)?;
    let port_num = port
        .trim()
        .parse::<u16>()
        .map_err(|_| LinkError::InvalidPort(port.to_string()))?;
    Ok(format!("{scheme}://{host}:{port_num}"))
}

/// `scheme://label.host` on the public base URL.
pub fn subdomain_url(base: &str, label: &str) -> Result<String, LinkError> {
    static RE_LABEL: OnceLock<Regex> = OnceLock::new();
    let re_label = RE_LABEL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
            .unwrap()
    });
    let label = label.trim();
    if !re_label.is_match(label) {
        return Err(LinkError::InvalidSubdomain(label.to_string()));
    }
    let (scheme, host) = parse_base(base)?;
    Ok(format!("{scheme}://{label}.{host}"))
}
