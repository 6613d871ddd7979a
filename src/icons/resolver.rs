//! Icon key to servable path resolution

use super::index::{IconIndex, SharedIconIndex};
use crate::models::Item;

#[derive(Clone)]
pub struct IconResolver {
    index: SharedIconIndex,
    url_prefix: String,
    default_icon: String,
}

impl IconResolver {
    pub fn new(
        index: SharedIconIndex,
        url_prefix: impl Into<String>,
        default_icon: impl Into<String>,
    ) -> Self {
        Self {
            index,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            default_icon: default_icon.into(),
        }
    }

    /// Path for the icon registered under `key`, or the default icon.
    /// A miss is not an error.
    pub fn resolve(&self, key: &str) -> String {
        self.path_for(&self.index.load(), key)
    }

    /// Overwrite `icon_file` on every item against a single index snapshot
    pub fn resolve_items(&self, items: &mut [Item]) {
        let index = self.index.load();
        for item in items {
            item.icon_file = self.path_for(&index, &item.icon);
        }
    }

    fn path_for(&self, index: &IconIndex, key: &str) -> String {
        match index.get(key) {
            Some(file) => format!("{}/{}", self.url_prefix, file),
            None => self.default_icon.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    fn resolver() -> IconResolver {
        let index = IconIndex::from_iter([
            ("plex".to_string(), "plex.png".to_string()),
            ("sonarr".to_string(), "sonarr.svg".to_string()),
        ])
        .shared();
        IconResolver::new(index, "/api/v1/icons/", "/static/default-icon.svg")
    }

    #[rstest]
    #[case("plex", "/api/v1/icons/plex.png")]
    #[case("sonarr", "/api/v1/icons/sonarr.svg")]
    #[case("unknown", "/static/default-icon.svg")]
    #[case("", "/static/default-icon.svg")]
    fn test_resolve(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(resolver().resolve(key), expected);
    }

    #[test]
    fn test_resolve_items_overwrites_caller_value() {
        let mut items = vec![
            Item {
                icon: "plex".into(),
                icon_file: "/somewhere/else.png".into(),
                ..Default::default()
            },
            Item {
                icon: "missing".into(),
                ..Default::default()
            },
        ];
        resolver().resolve_items(&mut items);

        assert_eq!(items[0].icon_file, "/api/v1/icons/plex.png");
        assert_eq!(items[1].icon_file, "/static/default-icon.svg");
    }

    #[test]
    fn test_resolve_and_resolve_items_agree() {
        let resolver = resolver();
        let keys = ["plex", "sonarr", "unknown", ""];
        let mut items: Vec<Item> = keys
            .iter()
            .map(|key| Item {
                icon: key.to_string(),
                ..Default::default()
            })
            .collect();
        resolver.resolve_items(&mut items);

        for (key, item) in keys.iter().zip(&items) {
            assert_eq!(item.icon_file, resolver.resolve(key));
        }
    }

    #[test]
    fn test_resolve_follows_index_swap() {
        let index = IconIndex::default().shared();
        let resolver = IconResolver::new(Arc::clone(&index), "/icons", "/default.svg");
        assert_eq!(resolver.resolve("plex"), "/default.svg");

        index.store(Arc::new(IconIndex::from_iter([(
            "plex".to_string(),
            "plex.png".to_string(),
        )])));
        assert_eq!(resolver.resolve("plex"), "/icons/plex.png");
    }
}
