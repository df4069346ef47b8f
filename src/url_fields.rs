use crate::models::{LinkType, UrlRecord};

/// Hidden id submitted for rows the server has not seen yet.
pub const NEW_URL_ID: &str = "new";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlFieldDraft {
    /// Per-modal sequential index; stable for the row's lifetime.
    pub index: u32,
    /// Server id when editing an existing url.
    pub id: Option<i64>,
    pub link_type: LinkType,
    pub label: String,
    pub value: String,
}

impl UrlFieldDraft {
    pub fn submitted_id(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| NEW_URL_ID.to_string())
    }
}

/// Markup parameters for a row's value input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueInputSpec {
    pub label: &'static str,
    pub input_type: &'static str,
    pub placeholder: &'static str,
}

pub fn value_input_spec(link_type: LinkType) -> ValueInputSpec {
    match link_type {
        LinkType::InternalApp => ValueInputSpec {
            label: "Port",
            input_type: "number",
            placeholder: "8096",
        },
        LinkType::Subdomain => ValueInputSpec {
            label: "Subdomain",
            input_type: "text",
            placeholder: "jellyfin",
        },
        LinkType::ExternalUrl => ValueInputSpec {
            label: "Full URL",
            input_type: "url",
            placeholder: "https://github.com",
        },
    }
}

/// `urls[i][field]`
pub fn field_name(position: usize, field: &str) -> String {
    format!("urls[{position}][{field}]")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlFieldList {
    next_index: u32,
    fields: Vec<UrlFieldDraft>,
}

impl UrlFieldList {
    /// A fresh list holding a single empty row at index 0.
    pub fn with_blank_row() -> Self {
        let mut list = Self::default();
        list.push_blank();
        list
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.index).collect()
    }

    pub fn get(&self, index: u32) -> Option<&UrlFieldDraft> {
        self.fields.iter().find(|f| f.index == index)
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut UrlFieldDraft> {
        self.fields.iter_mut().find(|f| f.index == index)
    }

    pub fn first(&self) -> Option<&UrlFieldDraft> {
        self.fields.first()
    }

    pub fn push_blank(&mut self) -> u32 {
        self.push(None, LinkType::default(), String::new(), String::new())
    }

    fn push(&mut self, id: Option<i64>, link_type: LinkType, label: String, value: String) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.fields.push(UrlFieldDraft {
            index,
            id,
            link_type,
            label,
            value,
        });
        index
    }

    pub fn remove(&mut self, index: u32) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.index != index);
        self.fields.len() != before
    }

    /// Switching type swaps the value widget, so the old value is dropped.
    pub fn set_type(&mut self, index: u32, link_type: LinkType) {
        if let Some(field) = self.get_mut(index) {
            if field.link_type != link_type {
                field.link_type = link_type;
                field.value.clear();
            }
        }
    }

    pub fn set_label(&mut self, index: u32, label: String) {
        if let Some(field) = self.get_mut(index) {
            field.label = label;
        }
    }

    pub fn set_value(&mut self, index: u32, value: String) {
        if let Some(field) = self.get_mut(index) {
            field.value = value;
        }
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.next_index = 0;
    }

    /// Replaces the rows with the entry's stored urls, ids preserved.
    pub fn populate(&mut self, urls: &[UrlRecord]) {
        self.clear();
        for url in urls {
            self.push(Some(url.id), url.link_type, url.label.clone(), url.value.clone());
        }
        if self.fields.is_empty() {
            self.push_blank();
        }
    }

    /// `(name, value)` pairs in submission order, indices contiguous from 0.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.fields.len() * 4);
        for (position, field) in self.fields.iter().enumerate() {
            out.push((field_name(position, "id"), field.submitted_id()));
            out.push((field_name(position, "type"), field.link_type.as_str().to_string()));
            out.push((field_name(position, "label"), field.label.trim().to_string()));
            out.push((field_name(position, "value"), field.value.trim().to_string()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_list_starts_at_index_zero() {
        let list = UrlFieldList::with_blank_row();
        assert_eq!(list.len(), 1);
        let first = list.first().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.id, None);
        assert!(first.value.is_empty());
    }

    #[test]
    fn indices_keep_growing_until_cleared() {
        let mut list = UrlFieldList::with_blank_row();
        let one = list.push_blank();
        let two = list.push_blank();
        assert_eq!((one, two), (1, 2));
        assert!(list.remove(one));
        assert!(!list.remove(one));
        assert_eq!(list.push_blank(), 3);
        assert_eq!(list.indices(), vec![0, 2, 3]);

        list.clear();
        assert_eq!(list.push_blank(), 0);
    }

    #[test]
    fn switching_type_clears_value() {
        let mut list = UrlFieldList::with_blank_row();
        list.set_value(0, "8096".into());
        list.set_label(0, "Jellyfin".into());
        list.set_type(0, LinkType::ExternalUrl);
        let field = list.get(0).unwrap();
        assert_eq!(field.link_type, LinkType::ExternalUrl);
        assert!(field.value.is_empty());
        assert_eq!(field.label, "Jellyfin");

        list.set_value(0, "https://jellyfin.org".into());
        list.set_type(0, LinkType::ExternalUrl);
        assert_eq!(list.get(0).unwrap().value, "https://jellyfin.org");
    }

    #[test]
    fn populate_keeps_server_ids() {
        let mut list = UrlFieldList::with_blank_row();
        list.push_blank();
        list.populate(&[
            UrlRecord {
                id: 12,
                link_type: LinkType::Subdomain,
                value: "jellyfin".into(),
                label: "Public".into(),
            },
            UrlRecord {
                id: 13,
                link_type: LinkType::InternalApp,
                value: "8096".into(),
                label: "LAN".into(),
            },
        ]);
        assert_eq!(list.indices(), vec![0, 1]);
        assert_eq!(list.get(0).unwrap().submitted_id(), "12");
        assert_eq!(list.push_blank(), 2);
        assert_eq!(list.get(2).unwrap().submitted_id(), NEW_URL_ID);
    }

    #[test]
    fn form_fields_reindex_after_removal() {
        let mut list = UrlFieldList::with_blank_row();
        list.set_value(0, "3000".into());
        let middle = list.push_blank();
        let last = list.push_blank();
        list.set_type(last, LinkType::ExternalUrl);
        list.set_value(last, " https://example.com ".into());
        list.remove(middle);

        let fields = list.form_fields();
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "urls[0][id]",
                "urls[0][type]",
                "urls[0][label]",
                "urls[0][value]",
                "urls[1][id]",
                "urls[1][type]",
                "urls[1][label]",
                "urls[1][value]",
            ]
        );
        assert_eq!(fields[5].1, "external_url");
        assert_eq!(fields[7].1, "https://example.com");
    }

    #[test]
    fn value_inputs_follow_type() {
        assert_eq!(value_input_spec(LinkType::InternalApp).input_type, "number");
        assert_eq!(value_input_spec(LinkType::Subdomain).input_type, "text");
        assert_eq!(value_input_spec(LinkType::ExternalUrl).input_type, "url");
    }
}
