//! Dataset envelope wrapped around company search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Article, TimeObject};
use crate::sources::SourceProfile;

/// Output envelope for multi-source queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data_source: String,
    pub dataset_type: String,
    pub dataset_id: String,
    /// When the envelope was produced.
    pub time_object: TimeObject,
    pub events: Vec<Article>,
}

impl Envelope {
    /// Wrap `events` using the dataset metadata of `profile`.
    pub fn build(events: Vec<Article>, now: DateTime<Utc>, profile: &SourceProfile) -> Self {
        Self {
            data_source: profile.name.clone(),
            dataset_type: profile.dataset_type.clone(),
            dataset_id: profile.dataset_id.clone(),
            time_object: TimeObject::utc(now),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{SourceRegistry, NEWS_API_ORG};
    use chrono::TimeZone;

    #[test]
    fn test_news_api_envelope() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let events = vec![Article {
            symbol: Some("TSLA".to_string()),
            ..Default::default()
        }];
        let profile = SourceRegistry::default().resolve(NEWS_API_ORG);

        let envelope = Envelope::build(events.clone(), now, &profile);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["data_source"], "news_api_org");
        assert_eq!(json["dataset_type"], "News data");
        assert_eq!(json["dataset_id"], "1");
        assert_eq!(json["time_object"]["timezone"], "UTC");
        assert_eq!(json["time_object"]["timestamp"], "2025-03-10T08:00:00Z");
        assert_eq!(envelope.events, events);
    }

    #[test]
    fn test_generic_source_still_gets_a_valid_envelope() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let profile = SourceRegistry::default().resolve("some_scraper");

        let envelope = Envelope::build(Vec::new(), now, &profile);

        assert_eq!(envelope.data_source, "some_scraper");
        assert_eq!(envelope.dataset_type, "News data");
        assert_eq!(envelope.dataset_id, "0");
        assert_eq!(envelope.time_object.timestamp, now);
    }
}
