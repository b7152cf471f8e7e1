//! Google People API source.
//!
//! Lists every connection of the authenticated user with the fields the
//! contact normalizer reads, following `nextPageToken` until exhausted.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderResult;
use crate::http::HttpClient;
use crate::raw::RawPerson;
use crate::source::{BoxFuture, RecordSource};

/// Base URL for the People API v1.
pub const PEOPLE_API_BASE: &str = "https://people.googleapis.com/v1";

const PERSON_FIELDS: &str = "names,nicknames,phoneNumbers,birthdays,events";
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionsPage {
    #[serde(default)]
    connections: Vec<RawPerson>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    total_people: Option<u64>,
}

/// Reads contacts from `people/me/connections`.
#[derive(Debug, Clone)]
pub struct GooglePeopleSource {
    client: HttpClient,
    base_url: String,
}

impl GooglePeopleSource {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: PEOPLE_API_BASE.to_string(),
        }
    }

    /// Points the source at another server (used against local fakes).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn list_connections(&self) -> ProviderResult<Vec<RawPerson>> {
        let url = format!("{}/people/me/connections", self.base_url);
        let mut people = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("pageSize", PAGE_SIZE.to_string()),
                ("personFields", PERSON_FIELDS.to_string()),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: ConnectionsPage = self.client.get_json(&url, &query).await?;
            debug!(
                received = page.connections.len(),
                total = page.total_people,
                "fetched contacts page"
            );
            people.extend(page.connections);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("fetched {} contacts", people.len());
        Ok(people)
    }
}

impl RecordSource for GooglePeopleSource {
    type Record = RawPerson;

    fn name(&self) -> &str {
        "google-people"
    }

    fn fetch_all(&self) -> BoxFuture<'_, ProviderResult<Vec<RawPerson>>> {
        Box::pin(self.list_connections())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_connections_page() {
        let json = r#"{
            "connections": [
                {"resourceName": "people/c1", "names": [{"displayName": "Bob"}]},
                {"resourceName": "people/c2"}
            ],
            "nextPageToken": "page-2",
            "totalPeople": 3
        }"#;

        let page: ConnectionsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.connections.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
        assert_eq!(page.total_people, Some(3));
    }

    #[test]
    fn parse_empty_page() {
        let page: ConnectionsPage = serde_json::from_str("{}").unwrap();
        assert!(page.connections.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn source_name_and_base_url() {
        let client = HttpClient::new(Duration::from_secs(1)).unwrap();
        let source = GooglePeopleSource::new(client).with_base_url("http://127.0.0.1:9");
        assert_eq!(source.name(), "google-people");
        assert_eq!(source.base_url, "http://127.0.0.1:9");
    }
}
