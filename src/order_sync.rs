use crate::models::{OrderKind, OrderUpdate};

/// A grid's state at drop time, read straight off the DOM.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridSnapshot {
    pub section_id: Option<String>,
    pub child_ids: Vec<Option<String>>,
}

impl GridSnapshot {
    pub fn new(section_id: Option<String>, child_ids: Vec<Option<String>>) -> Self {
        Self {
            section_id,
            child_ids,
        }
    }
}

/// Keeps ids in visual order, dropping children without a usable id
/// (sortable ghosts, placeholders).
pub fn collect_order<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    ids.into_iter()
        .flatten()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn sections_update<I>(ids: I) -> OrderUpdate
where
    I: IntoIterator<Item = Option<String>>,
{
    OrderUpdate {
        kind: OrderKind::Sections,
        order: collect_order(ids),
        section_id: None,
        entry_id: None,
    }
}

/// Updates to post after an entry card was dropped.
///
/// The destination grid always gets an update carrying `entry_id` so the
/// server can move the entry to that section. A different source grid gets a
/// second update with its remaining order.
pub fn entry_drop_updates(
    entry_id: Option<String>,
    from: GridSnapshot,
    to: GridSnapshot,
    same_grid: bool,
) -> Vec<OrderUpdate> {
    let mut updates = Vec::with_capacity(2);
    updates.push(OrderUpdate {
        kind: OrderKind::Entries,
        order: collect_order(to.child_ids),
        section_id: non_empty(to.section_id),
        entry_id: non_empty(entry_id),
    });
    if !same_grid {
        updates.push(OrderUpdate {
            kind: OrderKind::Entries,
            order: collect_order(from.child_ids),
            section_id: non_empty(from.section_id),
            entry_id: None,
        });
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<Option<String>> {
        raw.iter()
            .map(|id| {
                if *id == "-" {
                    None
                } else {
                    Some(id.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn sections_order_skips_falsy_ids() {
        let update = sections_update(ids(&["4", "", "-", "1", " 9 "]));
        assert_eq!(update.kind, OrderKind::Sections);
        assert_eq!(update.order, vec!["4", "1", "9"]);
        assert_eq!(update.section_id, None);
        assert_eq!(update.entry_id, None);
    }

    #[test]
    fn cross_grid_drop_posts_both_sections() {
        let from = GridSnapshot::new(Some("1".into()), ids(&["10", "12"]));
        let to = GridSnapshot::new(Some("2".into()), ids(&["20", "11", "21"]));
        let updates = entry_drop_updates(Some("11".into()), from, to, false);

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].kind, OrderKind::Entries);
        assert_eq!(updates[0].section_id.as_deref(), Some("2"));
        assert_eq!(updates[0].entry_id.as_deref(), Some("11"));
        assert_eq!(updates[0].order, vec!["20", "11", "21"]);

        assert_eq!(updates[1].section_id.as_deref(), Some("1"));
        assert_eq!(updates[1].entry_id, None);
        assert_eq!(updates[1].order, vec!["10", "12"]);
    }

    #[test]
    fn same_grid_drop_posts_once() {
        let grid = GridSnapshot::new(Some("3".into()), ids(&["31", "30"]));
        let updates = entry_drop_updates(Some("31".into()), grid.clone(), grid, true);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].order, vec!["31", "30"]);
    }

    #[test]
    fn emptied_source_grid_still_reports_its_order() {
        let from = GridSnapshot::new(Some("1".into()), Vec::new());
        let to = GridSnapshot::new(Some("2".into()), ids(&["5"]));
        let updates = entry_drop_updates(Some("5".into()), from, to, false);
        assert_eq!(updates[1].order, Vec::<String>::new());
        assert_eq!(updates[1].section_id.as_deref(), Some("1"));
    }
}
