//! Google Tasks API source.
//!
//! One fetch lists every task list, then every task in each list (including
//! completed and hidden ones; filtering happens during synthesis).

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderResult;
use crate::http::HttpClient;
use crate::raw::{RawTask, RawTaskList};
use crate::source::{BoxFuture, RecordSource};

/// Base URL for the Tasks API v1.
pub const TASKS_API_BASE: &str = "https://tasks.googleapis.com/tasks/v1";

const MAX_RESULTS: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskListsPage {
    #[serde(default)]
    items: Vec<ApiTaskList>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTaskList {
    id: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TasksPage {
    #[serde(default)]
    items: Vec<RawTask>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Reads every task list and its tasks.
#[derive(Debug, Clone)]
pub struct GoogleTasksSource {
    client: HttpClient,
    base_url: String,
}

impl GoogleTasksSource {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: TASKS_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn list_task_lists(&self) -> ProviderResult<Vec<ApiTaskList>> {
        let url = format!("{}/users/@me/lists", self.base_url);
        let mut lists = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("maxResults", MAX_RESULTS.to_string())];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: TaskListsPage = self.client.get_json(&url, &query).await?;
            lists.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(lists)
    }

    async fn list_tasks(&self, list_id: &str) -> ProviderResult<Vec<RawTask>> {
        let url = format!(
            "{}/lists/{}/tasks",
            self.base_url,
            urlencoding::encode(list_id)
        );
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("maxResults", MAX_RESULTS.to_string()),
                ("showCompleted", "true".to_string()),
                ("showHidden", "true".to_string()),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: TasksPage = self.client.get_json(&url, &query).await?;
            tasks.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(tasks)
    }

    async fn fetch_lists(&self) -> ProviderResult<Vec<RawTaskList>> {
        let lists = self.list_task_lists().await?;
        let mut out = Vec::with_capacity(lists.len());

        for list in lists {
            let tasks = self.list_tasks(&list.id).await?;
            let title = list.title.unwrap_or_else(|| list.id.clone());
            debug!(list = %title, tasks = tasks.len(), "fetched task list");
            out.push(RawTaskList {
                id: list.id,
                title,
                tasks,
            });
        }

        Ok(out)
    }
}

impl RecordSource for GoogleTasksSource {
    type Record = RawTaskList;

    fn name(&self) -> &str {
        "google-tasks"
    }

    fn fetch_all(&self) -> BoxFuture<'_, ProviderResult<Vec<RawTaskList>>> {
        Box::pin(self.fetch_lists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_lists_page() {
        let json = r#"{
            "kind": "tasks#taskLists",
            "items": [
                {"id": "L1", "title": "Personal"},
                {"id": "L2"}
            ]
        }"#;

        let page: TaskListsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title.as_deref(), Some("Personal"));
        assert!(page.items[1].title.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn parse_tasks_page_with_subtask() {
        let json = r#"{
            "items": [
                {"id": "p", "title": "Trip", "status": "needsAction", "due": "2025-03-01T00:00:00.000Z"},
                {"id": "c", "title": "Book hotel", "status": "completed", "parent": "p",
                 "completed": "2025-02-20T08:30:00.000Z"}
            ],
            "nextPageToken": "n2"
        }"#;

        let page: TasksPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].parent.as_deref(), Some("p"));
        assert!(page.items[1].is_completed());
        assert_eq!(page.next_page_token.as_deref(), Some("n2"));
    }
}
