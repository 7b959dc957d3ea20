//! Live timing service endpoints
//!
//! [`Api`] builds the requests, [`TimingClient`] runs them through the
//! transport and the matching parser. Every read of a response body is a
//! yield point.

use core::fmt::Write;

use heapless::String;

use crate::config::MAX_BASE_URL_LEN;
use crate::error::{FetchError, ProtocolError};
use crate::extract::{extract_latest, TailRecord, TAIL_BYTES};
use crate::http::{FetchRequest, Url, MAX_URL_LEN};
use crate::orchestrator::{FetchOutcome, LapSource, TrackedTargets};
use crate::records::{DriverNumber, EventInfo, LapRecord, SessionInfo};
use crate::scheduler::YieldingSource;
use crate::stream::{parse_list, TopDrivers};
use crate::traits::{ChunkSource, Connector};
use crate::transport::HttpClient;

/// Request builder for one service base URL
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Api {
    base: String<MAX_BASE_URL_LEN>,
}

impl Api {
    /// `base_url` is scheme plus authority, optionally with a path prefix
    pub fn new(base_url: &str) -> Result<Self, ProtocolError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed)?;

        let mut base = String::new();
        base.push_str(trimmed)
            .map_err(|_| ProtocolError::RequestTooLarge)?;
        Ok(Self { base })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<FetchRequest, ProtocolError> {
        let mut url = String::<MAX_URL_LEN>::new();
        write!(url, "{}{}", self.base, path).map_err(|_| ProtocolError::RequestTooLarge)?;
        FetchRequest::get(&url)
    }

    /// Laps of one driver in the latest session
    pub fn laps(&self, driver: DriverNumber) -> Result<FetchRequest, ProtocolError> {
        self.endpoint("/v1/laps")?
            .query("session_key", "latest")?
            .query("driver_number", driver)
    }

    /// Classification of the latest session
    pub fn session_result(&self) -> Result<FetchRequest, ProtocolError> {
        self.endpoint("/v1/session_result")?
            .query("session_key", "latest")
    }

    pub fn meetings(&self) -> Result<FetchRequest, ProtocolError> {
        self.endpoint("/v1/meetings")?
            .query("meeting_key", "latest")
    }

    pub fn sessions(&self) -> Result<FetchRequest, ProtocolError> {
        self.endpoint("/v1/sessions")?
            .query("session_key", "latest")
    }
}

/// Fetches and decodes service payloads
///
/// `K` is the tail buffer size used for "latest record" endpoints.
pub struct TimingClient<C: Connector, const K: usize = TAIL_BYTES> {
    http: HttpClient<C>,
    api: Api,
}

impl<C: Connector, const K: usize> TimingClient<C, K> {
    pub fn new(connector: C, api: Api) -> Self {
        Self {
            http: HttpClient::new(connector),
            api,
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn connector_mut(&mut self) -> &mut C {
        self.http.connector_mut()
    }

    async fn fetch_latest<R: TailRecord>(&mut self, request: FetchRequest) -> Result<Option<R>, FetchError> {
        let response = self.http.get(&request).await?;
        let mut source = YieldingSource::new(response);
        let result = extract_latest::<R, _, K>(&mut source).await;
        source.close();
        result
    }

    /// Newest lap of `driver` with a recorded duration
    pub async fn fetch_lap(&mut self, driver: DriverNumber) -> Result<Option<LapRecord>, FetchError> {
        let request = self.api.laps(driver)?;
        self.fetch_latest(request).await
    }

    pub async fn event_info(&mut self) -> Result<Option<EventInfo>, FetchError> {
        let request = self.api.meetings()?;
        self.fetch_latest(request).await
    }

    pub async fn session_info(&mut self) -> Result<Option<SessionInfo>, FetchError> {
        let request = self.api.sessions()?;
        self.fetch_latest(request).await
    }

    /// Best `limit` drivers of the latest session, padded with `defaults`
    ///
    /// Reading stops as soon as positions 1 to `limit` have all been
    /// seen.
    pub async fn top_drivers<const N: usize>(
        &mut self,
        limit: usize,
        defaults: &[DriverNumber],
    ) -> Result<TrackedTargets<N>, FetchError> {
        let request = self.api.session_result()?;
        let response = self.http.get(&request).await?;
        let mut source = YieldingSource::new(response);

        let mut top = TopDrivers::<N>::new(limit);
        let flow = parse_list(&mut source, |entry| top.offer(entry)).await;
        source.close();
        flow?;

        Ok(TrackedTargets::new(&top.into_tracked(defaults)))
    }
}

impl<C: Connector, const K: usize> LapSource for TimingClient<C, K> {
    async fn latest_lap(&mut self, driver: DriverNumber) -> FetchOutcome<LapRecord> {
        self.fetch_lap(driver).await.into()
    }
}
