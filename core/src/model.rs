use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// The fields the retrieval index reads from a record.
///
/// Implementors stay owned by whoever stores them; the index only keeps a
/// shared handle and never mutates them.
pub trait SourceRecord {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn body(&self) -> &str;
    fn tags(&self) -> &[String];

    /// Title, description, body and tags joined by single spaces.
    fn corpus_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title(),
            self.description().unwrap_or(""),
            self.body(),
            self.tags().join(" ")
        )
    }
}

pub const DEFAULT_ICON: &str = "fas fa-file-text";

fn default_icon() -> String { DEFAULT_ICON.to_string() }

pub fn now_rfc3339() -> String { format_timestamp(OffsetDateTime::now_utc()) }

/// RFC 3339 text for `t`. Offsets with a seconds component have no RFC 3339
/// form; those fall back to unix seconds and log a warning.
pub fn format_timestamp(t: OffsetDateTime) -> String {
    match t.format(&Rfc3339) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "timestamp formatting failed, using unix seconds");
            t.unix_timestamp().to_string()
        }
    }
}

/// A knowledge-base entry: policy documents, amenity guides, templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub created_at: String,
}

/// Insert shape for an asset. `id` is only honoured when loading record
/// files; the HTTP layer always assigns a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Asset {
    pub fn from_new(new: NewAsset) -> Self {
        Self {
            id: new.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: new.title,
            description: new.description.filter(|d| !d.is_empty()),
            content: new.content,
            category: new.category,
            tags: new.tags,
            icon: new.icon.unwrap_or_else(default_icon),
            created_at: now_rfc3339(),
        }
    }
}

impl SourceRecord for Asset {
    fn id(&self) -> &str { &self.id }
    fn title(&self) -> &str { &self.title }
    fn description(&self) -> Option<&str> { self.description.as_deref() }
    fn body(&self) -> &str { &self.content }
    fn tags(&self) -> &[String] { &self.tags }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCategory {
    pub name: String,
    pub count: usize,
    pub items: Vec<Asset>,
}

/// Group assets by category, categories in first-seen order.
pub fn group_by_category<'a, I>(assets: I) -> Vec<AssetCategory>
where
    I: IntoIterator<Item = &'a Asset>,
{
    let mut out: Vec<AssetCategory> = Vec::new();
    for asset in assets {
        match out.iter_mut().find(|c| c.name == asset.category) {
            Some(cat) => {
                cat.items.push(asset.clone());
                cat.count += 1;
            }
            None => out.push(AssetCategory { name: asset.category.clone(), count: 1, items: vec![asset.clone()] }),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<ContentCard>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: now_rfc3339(),
            kind: MessageKind::Text,
            cards: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn new() -> Self {
        let now = now_rfc3339();
        Self { id: uuid::Uuid::new_v4().to_string(), messages: Vec::new(), created_at: now.clone(), updated_at: now }
    }
}

impl Default for Conversation {
    fn default() -> Self { Self::new() }
}

fn seed(title: &str, description: &str, content: &str, category: &str, tags: &[&str], icon: &str) -> NewAsset {
    NewAsset {
        id: None,
        title: title.into(),
        description: Some(description.into()),
        content: content.into(),
        category: category.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        icon: Some(icon.into()),
    }
}

/// The seed knowledge base the service starts with when no record file is given.
pub fn sample_assets() -> Vec<NewAsset> {
    vec![
        seed(
            "Hotel Policies",
            "Guest guidelines and procedures",
            "Check-in time is 3:00 PM, check-out is 11:00 AM. Guests must present valid ID and credit card at check-in. No smoking policy throughout the property.",
            "Documents",
            &["policy", "guest", "guidelines"],
            "fas fa-file-text",
        ),
        seed(
            "Amenities Guide",
            "Complete list of hotel amenities",
            "Indoor pool (6 AM - 10 PM), Fitness center (24/7), Spa services (9 AM - 8 PM), Free WiFi, Business center, Concierge services, Room service, Restaurant, Bar, Parking",
            "Documents",
            &["amenities", "services", "facilities"],
            "fas fa-concierge-bell",
        ),
        seed(
            "Property Photos",
            "Room and amenity images",
            "High-quality images showcasing our luxury suites, elegant lobby, spa facilities, dining areas, and outdoor spaces.",
            "Images",
            &["photos", "rooms", "facilities"],
            "fas fa-image",
        ),
        seed(
            "Response Templates",
            "Pre-written response patterns",
            "Template responses for common guest inquiries about reservations, amenities, local attractions, and services.",
            "Templates",
            &["templates", "responses"],
            "fas fa-clipboard-list",
        ),
        seed(
            "Local Attractions",
            "Nearby points of interest",
            "Central Park (0.2 miles), Metropolitan Museum (0.5 miles), Broadway Theater District (0.3 miles), Times Square (0.4 miles), Empire State Building (0.8 miles)",
            "Documents",
            &["attractions", "local", "tourism"],
            "fas fa-map-marker-alt",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::UtcOffset;

    #[test]
    fn timestamps_are_rfc3339() {
        assert_eq!(format_timestamp(datetime!(2024-01-01 0:00 UTC)), "2024-01-01T00:00:00Z");
        assert!(now_rfc3339().ends_with('Z'));
    }

    #[test]
    fn unformattable_timestamp_falls_back_to_unix_seconds() {
        let t = datetime!(2024-01-01 0:00 UTC).to_offset(UtcOffset::from_hms(1, 0, 30).unwrap());
        assert_eq!(format_timestamp(t), "1704067200");
    }

    #[test]
    fn corpus_text_joins_fields() {
        let asset = Asset::from_new(NewAsset {
            title: "Indoor Pool".into(),
            content: "Heated".into(),
            category: "Documents".into(),
            tags: vec!["swim".into(), "water".into()],
            ..Default::default()
        });
        assert_eq!(asset.corpus_text(), "Indoor Pool  Heated swim water");
        assert_eq!(asset.icon, DEFAULT_ICON);
        assert!(!asset.id.is_empty());
    }

    #[test]
    fn groups_in_first_seen_order() {
        let assets: Vec<Asset> = sample_assets().into_iter().map(Asset::from_new).collect();
        let cats = group_by_category(&assets);
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Documents", "Images", "Templates"]);
        assert_eq!(cats[0].count, 3);
    }

    #[test]
    fn asset_serializes_camel_case() {
        let asset = Asset::from_new(sample_assets().remove(0));
        let json = serde_json::to_value(&asset).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["tags"][0], "policy");
    }
}
