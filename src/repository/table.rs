use super::RepositoryError;
use crate::gallery::{GalleryItem, ItemFilter, MetadataUpdate, NewGalleryItem};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The gallery collection shared by the repository backends; also the JSON
/// document layout of the file backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemTable {
    pub items: Vec<GalleryItem>,
    /// Time of the last mutation. Every timestamp issued by the table is
    /// strictly later than this.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ItemTable {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(RepositoryError::Corrupt(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_updated {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_updated = Some(next);
        next
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !self.items.iter().any(|item| item.id == id) {
                return id;
            }
        }
    }

    pub fn insert(&mut self, new_items: Vec<NewGalleryItem>) -> Vec<GalleryItem> {
        let mut inserted = Vec::with_capacity(new_items.len());
        for new_item in new_items {
            let id = self.fresh_id();
            let uploaded_at = self.tick();
            let item = new_item.into_item(id, uploaded_at);
            self.items.push(item.clone());
            inserted.push(item);
        }
        inserted
    }

    pub fn find(&self, filter: ItemFilter) -> Vec<GalleryItem> {
        let mut items: Vec<GalleryItem> = self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        items
    }

    pub fn get(&self, id: &str) -> Option<GalleryItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    pub fn update(&mut self, id: &str, update: MetadataUpdate) -> Option<GalleryItem> {
        let position = self.items.iter().position(|item| item.id == id)?;
        let updated_at = self.tick();
        let item = &mut self.items[position];
        update.apply(item, updated_at);
        Some(item.clone())
    }

    pub fn delete(&mut self, id: &str) -> Option<GalleryItem> {
        let position = self.items.iter().position(|item| item.id == id)?;
        self.tick();
        Some(self.items.remove(position))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gallery::{Category, MediaType};

    pub(crate) fn new_item(title: &str, category: Category) -> NewGalleryItem {
        NewGalleryItem {
            media_type: MediaType::Image,
            src: format!("/uploads/{}.jpg", title),
            title: title.to_string(),
            description: String::new(),
            category,
            storage_key: Some(format!("{}/{}.jpg", category, title)),
            file_name: format!("{}.jpg", title),
            file_size: 1,
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut table = ItemTable::default();
        let items = table.insert(
            (0..50)
                .map(|i| new_item(&format!("item-{}", i), Category::Rooms))
                .collect(),
        );

        for pair in items.windows(2) {
            assert!(pair[0].uploaded_at < pair[1].uploaded_at);
        }
    }

    #[test]
    fn test_watermark_survives_clock_behind() {
        let mut table = ItemTable {
            items: Vec::new(),
            last_updated: Some(Utc::now() + Duration::hours(1)),
        };
        let watermark = table.last_updated.unwrap();

        let item = table.insert(vec![new_item("late", Category::Dining)]).remove(0);
        assert!(item.uploaded_at > watermark);
    }

    #[test]
    fn test_find_is_newest_first_and_filtered() {
        let mut table = ItemTable::default();
        table.insert(vec![
            new_item("a", Category::Rooms),
            new_item("b", Category::Dining),
            new_item("c", Category::Rooms),
        ]);

        let rooms = table.find(ItemFilter::Category(Category::Rooms));
        let titles: Vec<_> = rooms.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);

        let all = table.find(ItemFilter::All);
        let titles: Vec<_> = all.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut table = ItemTable::default();
        let item = table.insert(vec![new_item("a", Category::Rooms)]).remove(0);
        table.items.push(item);

        assert!(matches!(table.validate(), Err(RepositoryError::Corrupt(_))));
    }
}
