use super::{Category, MediaType, NewGalleryItem};

struct SeedEntry {
    title: &'static str,
    description: &'static str,
    category: Category,
    src: &'static str,
    file_name: &'static str,
    file_size: u64,
}

const DEFAULT_ITEMS: [SeedEntry; 6] = [
    SeedEntry {
        title: "Luxury Suite Interior",
        description: "Opulent bedroom with premium amenities",
        category: Category::Rooms,
        src: "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800&h=600&fit=crop&crop=center",
        file_name: "luxury-suite.jpg",
        file_size: 1_024_000,
    },
    SeedEntry {
        title: "Grand Banquet Hall",
        description: "Elegant venue for weddings and celebrations",
        category: Category::Events,
        src: "https://images.unsplash.com/photo-1571896349842-33c89424de2d?w=800&h=600&fit=crop&crop=center",
        file_name: "banquet-hall.jpg",
        file_size: 1_200_000,
    },
    SeedEntry {
        title: "Premium Restaurant",
        description: "Fine dining with world-class cuisine",
        category: Category::Dining,
        src: "https://images.unsplash.com/photo-1564501049412-61c2a3083791?w=800&h=600&fit=crop&crop=center",
        file_name: "restaurant.jpg",
        file_size: 980_000,
    },
    SeedEntry {
        title: "Luxury Spa",
        description: "Rejuvenating wellness treatments",
        category: Category::Amenities,
        src: "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?w=800&h=600&fit=crop&crop=center",
        file_name: "spa.jpg",
        file_size: 1_100_000,
    },
    SeedEntry {
        title: "Rooftop Terrace",
        description: "Panoramic city views and relaxation",
        category: Category::Amenities,
        src: "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa?w=800&h=600&fit=crop&crop=center",
        file_name: "rooftop.jpg",
        file_size: 950_000,
    },
    SeedEntry {
        title: "Corporate Conference",
        description: "Professional meeting facilities",
        category: Category::Events,
        src: "https://images.unsplash.com/photo-1590490360182-c33d57733427?w=800&h=600&fit=crop&crop=center",
        file_name: "conference.jpg",
        file_size: 1_050_000,
    },
];

/// The stock hotel photos shown before anything has been uploaded. They are
/// externally hosted, so none of them carries a storage key.
pub fn default_items() -> Vec<NewGalleryItem> {
    DEFAULT_ITEMS
        .iter()
        .map(|entry| NewGalleryItem {
            media_type: MediaType::Image,
            src: entry.src.to_string(),
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            category: entry.category,
            storage_key: None,
            file_name: entry.file_name.to_string(),
            file_size: entry.file_size,
            mime_type: "image/jpeg".to_string(),
        })
        .collect()
}
