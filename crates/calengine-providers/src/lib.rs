//! Record sources and normalizers.
//!
//! This crate is the input side of the engine:
//!
//! - [`RecordSource`] - "fetch all records, or fail with a categorized error"
//! - [`ResilientFetcher`] - bounded retry with exponential backoff around a fetch
//! - [`SourceNormalizer`] - provider records to intermediate records
//! - [`ProviderError`] - error taxonomy shared by every source
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ People API   │  │ Tasks API    │  │ Holiday ICS  │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ PeopleSource │  │ TasksSource  │  │ FeedSource   │
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        │    RecordSource + ResilientFetcher│
//!        ▼                 ▼                 ▼
//!   RawPerson         RawTaskList        RawHoliday
//!        │                 │                 │
//!        ▼ SourceNormalizer▼                 ▼
//!  ContactRecord       TaskRecord      HolidayRecord
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calengine_providers::{HttpClient, HolidayFeedSource, ResilientFetcher, RetryPolicy};
//!
//! let client = HttpClient::new(Duration::from_secs(120))?;
//! let source = HolidayFeedSource::new(client, DEFAULT_HOLIDAY_FEED_URL);
//! let raw = ResilientFetcher::new(RetryPolicy::default()).fetch_all(&source).await?;
//! ```

pub mod error;
pub mod google;
pub mod holidays;
pub mod http;
pub mod ics;
pub mod normalize;
pub mod raw;
pub mod retry;
pub mod source;

// Re-export main types at crate root
pub use error::{ErrorClass, ProviderError, ProviderErrorCode, ProviderResult};
pub use google::{AccessToken, GooglePeopleSource, GoogleTasksSource, TokenFile};
pub use holidays::{DEFAULT_HOLIDAY_FEED_URL, HolidayFeedSource};
pub use http::HttpClient;
pub use ics::parse_holiday_events;
pub use normalize::{
    ContactNormalizer, EventMarkers, HolidayNormalizer, SourceNormalizer, TaskNormalizer,
};
pub use raw::{RawHoliday, RawPerson, RawTask, RawTaskList};
pub use retry::{ResilientFetcher, RetryPolicy};
pub use source::{BoxFuture, RecordSource, StaticSource};
