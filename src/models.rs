use serde::{Deserialize, Serialize};

/// How a url field's `value` is interpreted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    #[default]
    InternalApp,
    Subdomain,
    ExternalUrl,
}

impl LinkType {
    pub const ALL: [LinkType; 3] = [
        LinkType::InternalApp,
        LinkType::Subdomain,
        LinkType::ExternalUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::InternalApp => "internal_app",
            LinkType::Subdomain => "subdomain",
            LinkType::ExternalUrl => "external_url",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "internal_app" => Some(LinkType::InternalApp),
            "subdomain" => Some(LinkType::Subdomain),
            "external_url" => Some(LinkType::ExternalUrl),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkType::InternalApp => "Internal app (port)",
            LinkType::Subdomain => "Subdomain",
            LinkType::ExternalUrl => "External URL",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SectionOption {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub link_type: LinkType,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EntryDetails {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub section_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub urls: Vec<UrlRecord>,
    #[serde(default)]
    pub all_sections: Vec<SectionOption>,
}

/// `/get_entry_details/:id` answers either the entry or `{error}`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum EntryDetailsResponse {
    Error { error: String },
    Details(EntryDetails),
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkPreview {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum LinkPreviewResponse {
    Error { error: String },
    Preview(LinkPreview),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Sections,
    Entries,
}

/// Body of `POST /update_order`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderUpdate {
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub order: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl OrderResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// sqlite hands back whatever affinity the column ended up with
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_entry_details_with_numeric_port() {
        let raw = r#"{
            "id": 7, "title": "Jellyfin", "description": null, "section_id": 2,
            "image_url": "uploads/ab12_logo.png", "created_at": "2024-01-01",
            "urls": [{"id": 3, "link_entry_id": 7, "link_type": "internal_app", "value": 8096, "label": "LAN"}],
            "all_sections": [{"id": 2, "name": "Media"}, {"id": 4, "name": "Tools"}]
        }"#;
        let parsed: EntryDetailsResponse = serde_json::from_str(raw).unwrap();
        let EntryDetailsResponse::Details(details) = parsed else {
            panic!("expected details");
        };
        assert_eq!(details.urls[0].value, "8096");
        assert_eq!(details.urls[0].link_type, LinkType::InternalApp);
        assert_eq!(details.description, None);
        assert_eq!(details.all_sections.len(), 2);
    }

    #[test]
    fn decodes_error_payloads() {
        let parsed: EntryDetailsResponse =
            serde_json::from_str(r#"{"error": "Entry not found"}"#).unwrap();
        assert_eq!(
            parsed,
            EntryDetailsResponse::Error {
                error: "Entry not found".to_string()
            }
        );

        let preview: LinkPreviewResponse = serde_json::from_str(r#"{"error": "timeout"}"#).unwrap();
        assert!(matches!(preview, LinkPreviewResponse::Error { .. }));
        let preview: LinkPreviewResponse = serde_json::from_str(r#"{"title": "GitHub"}"#).unwrap();
        assert!(matches!(preview, LinkPreviewResponse::Preview(LinkPreview { title: Some(_), .. })));
    }

    #[test]
    fn order_update_omits_absent_ids() {
        let update = OrderUpdate {
            kind: OrderKind::Sections,
            order: vec!["3".into(), "1".into()],
            section_id: None,
            entry_id: None,
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"type":"sections","order":["3","1"]}"#
        );
    }

    #[test]
    fn link_type_round_trips_through_wire_names() {
        for ty in LinkType::ALL {
            assert_eq!(LinkType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(LinkType::parse("ftp"), None);
    }
}
