//! Dashboard view assembly

use std::sync::Arc;

use crate::icons::IconResolver;
use crate::models::Item;
use crate::registry::SourceRegistry;

#[derive(Clone)]
pub struct Aggregator {
    registry: SourceRegistry,
    static_items: Arc<Vec<Item>>,
    resolver: IconResolver,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, static_items: Vec<Item>, resolver: IconResolver) -> Self {
        Self {
            registry,
            static_items: Arc::new(static_items),
            resolver,
        }
    }

    /// Registered items followed by static items, icons resolved against the
    /// current index, stably sorted by name (case-sensitive).
    pub async fn snapshot(&self) -> Vec<Item> {
        let mut items = self.registry.snapshot().await;
        items.extend(self.static_items.iter().cloned());

        self.resolver.resolve_items(&mut items);
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    pub fn static_items(&self) -> &[Item] {
        &self.static_items
    }
}
