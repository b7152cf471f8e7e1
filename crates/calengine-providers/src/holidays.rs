//! Public holiday feed source.
//!
//! Downloads an unauthenticated ICS feed and returns its VEVENTs.

use tracing::debug;

use crate::error::ProviderResult;
use crate::http::HttpClient;
use crate::ics::parse_holiday_events;
use crate::raw::RawHoliday;
use crate::source::{BoxFuture, RecordSource};

/// Default feed: mainland China statutory holidays and traditional festivals.
pub const DEFAULT_HOLIDAY_FEED_URL: &str = "https://calendars.icloud.com/holidays/cn_zh.ics";

#[derive(Debug, Clone)]
pub struct HolidayFeedSource {
    client: HttpClient,
    url: String,
}

impl HolidayFeedSource {
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn download(&self) -> ProviderResult<Vec<RawHoliday>> {
        let body = self.client.get_text(&self.url, &[]).await?;
        debug!(url = %self.url, bytes = body.len(), "downloaded holiday feed");
        parse_holiday_events(&body)
    }
}

impl RecordSource for HolidayFeedSource {
    type Record = RawHoliday;

    fn name(&self) -> &str {
        "holiday-feed"
    }

    fn fetch_all(&self) -> BoxFuture<'_, ProviderResult<Vec<RawHoliday>>> {
        Box::pin(self.download())
    }
}
