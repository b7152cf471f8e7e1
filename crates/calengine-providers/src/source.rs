//! RecordSource trait definition.
//!
//! A [`RecordSource`] is the only shape the engine needs from a provider:
//! "fetch all records, or fail with a categorized error". Transport details
//! (REST pagination, ICS download) stay inside each implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::error::{ProviderError, ProviderResult};

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A provider that returns every record it serves in one aggregate fetch.
pub trait RecordSource: Send + Sync {
    /// The provider-shaped record this source yields.
    type Record: Send;

    /// Short name used in logs and errors ("google-people", "holiday-feed").
    fn name(&self) -> &str;

    /// Fetches all records.
    fn fetch_all(&self) -> BoxFuture<'_, ProviderResult<Vec<Self::Record>>>;
}

/// A source serving a fixed list of records, or a scripted sequence of failures.
///
/// Each call pops the next scripted failure; once they run out the records
/// are returned. Used for offline runs and tests.
pub struct StaticSource<R> {
    name: String,
    records: Vec<R>,
    failures: Mutex<Vec<ProviderError>>,
}

impl<R: Clone + Send + Sync> StaticSource<R> {
    pub fn new(name: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            name: name.into(),
            records,
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Queues failures returned, in order, before the records are served.
    #[must_use]
    pub fn with_failures(self, failures: Vec<ProviderError>) -> Self {
        let mut queued = failures;
        queued.reverse();
        Self {
            failures: Mutex::new(queued),
            ..self
        }
    }
}

impl<R: Clone + Send + Sync> RecordSource for StaticSource<R> {
    type Record = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_all(&self) -> BoxFuture<'_, ProviderResult<Vec<R>>> {
        Box::pin(async move {
            let next_failure = match self.failures.lock() {
                Ok(mut failures) => failures.pop(),
                Err(_) => return Err(ProviderError::internal("failure queue poisoned")),
            };
            match next_failure {
                Some(error) => Err(error),
                None => Ok(self.records.clone()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::retry::{ResilientFetcher, RetryPolicy};
    use std::time::Duration;

    #[tokio::test]
    async fn static_source_serves_records() {
        let source = StaticSource::new("static", vec![1, 2, 3]);
        assert_eq!(source.name(), "static");
        assert_eq!(source.fetch_all().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn scripted_failures_come_first_in_order() {
        let source = StaticSource::new("static", vec!["a"]).with_failures(vec![
            ProviderError::network("first"),
            ProviderError::timeout("second"),
        ]);

        assert_eq!(source.fetch_all().await.unwrap_err().code(), ProviderErrorCode::Network);
        assert_eq!(source.fetch_all().await.unwrap_err().code(), ProviderErrorCode::Timeout);
        assert_eq!(source.fetch_all().await.unwrap(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetcher_recovers_from_scripted_failures() {
        let source = StaticSource::new("static", vec![42]).with_failures(vec![
            ProviderError::rate_limited("slow down"),
            ProviderError::server("502"),
        ]);
        let fetcher = ResilientFetcher::new(RetryPolicy::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(10),
            2.0,
        ));

        assert_eq!(fetcher.fetch_all(&source).await.unwrap(), vec![42]);
    }
}
