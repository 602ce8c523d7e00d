//! Survey server REST client
//!
//! Provides a typed HTTP client for the server's paginated data point feed.
//! Handles the bearer API key, query parameter construction, JSON
//! deserialization, and classification of failure responses.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldsync_api::client::RestClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RestClient::new(Some("api-key-here".to_string()));
//! let page = client.fetch_data_points(25, None).await?;
//! println!("{} records, {} total", page.data_points.len(), page.result_count);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::RemoteError;

/// Default base URL of the survey-data server
const DEFAULT_BASE_URL: &str = "https://api.akvoflowsandbox.appspot.com";

/// Path of the paginated data point feed
const DATA_POINTS_PATH: &str = "/datapoints";

// ============================================================================
// Wire response types
// ============================================================================

/// Response body of one feed page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPointPageResponse {
    /// Data points newer than the requested watermark, in server order
    #[serde(default)]
    pub data_points: Vec<WireDataPoint>,
    /// Server-reported total record count for the group
    #[serde(default)]
    pub result_count: i64,
}

/// A data point as serialized by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDataPoint {
    /// Natural record key
    pub id: String,
    /// Owning survey group
    #[serde(default)]
    pub survey_group_id: i64,
    /// Display label
    #[serde(default)]
    pub display_name: String,
    /// Latitude, nullable
    pub lat: Option<f64>,
    /// Longitude, nullable
    pub lon: Option<f64>,
    /// Last server-side update (epoch milliseconds)
    #[serde(default)]
    pub last_update_date_time: i64,
    /// Inline submissions; an empty list marks a corrupt record
    #[serde(default)]
    pub survey_instances: Vec<WireSurveyInstance>,
}

/// A submission (survey instance) as serialized by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSurveyInstance {
    /// Globally unique submission identifier
    pub uuid: String,
    /// Numeric form identifier
    #[serde(default)]
    pub survey_id: i64,
    /// Collection timestamp (epoch milliseconds)
    #[serde(default)]
    pub collection_date: i64,
    /// Enumerator/device name; the server may omit it
    #[serde(default)]
    pub submitter: Option<String>,
    /// Lifecycle status; 0 when the server omits it
    #[serde(default)]
    pub status: i32,
}

// ============================================================================
// RestClient
// ============================================================================

/// HTTP client for the survey server's data point feed
///
/// Wraps `reqwest::Client` with the bearer API key and base URL
/// construction. One `fetch_data_points` call fetches exactly one page;
/// paging policy lives with the caller.
pub struct RestClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// API key used as a bearer credential, when configured
    api_key: Option<String>,
}

impl RestClient {
    /// Creates a new RestClient against the production server
    ///
    /// # Arguments
    /// * `api_key` - Bearer credential; `None` for unauthenticated servers
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Creates a new RestClient with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `api_key` - Bearer credential; `None` for unauthenticated servers
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header
    /// when an API key is configured.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Fetches one page of data points for a survey group
    ///
    /// # Arguments
    /// * `survey_group_id` - The group to fetch for
    /// * `since` - Watermark lower bound; omitted from the request when
    ///   `None` (full sync from epoch)
    ///
    /// # Errors
    /// * [`RemoteError::Forbidden`] when the server answers HTTP 403
    /// * [`RemoteError::Network`] on any transport failure
    /// * [`RemoteError::UnexpectedStatus`] for other non-success responses
    ///   or an unparseable body
    pub async fn fetch_data_points(
        &self,
        survey_group_id: i64,
        since: Option<&str>,
    ) -> Result<DataPointPageResponse, RemoteError> {
        debug!(
            survey_group_id,
            since = since.unwrap_or("<epoch>"),
            "Fetching data point page"
        );

        let mut request = self
            .request(Method::GET, DATA_POINTS_PATH)
            .query(&[("surveyGroupId", survey_group_id.to_string())]);
        if let Some(since) = since {
            request = request.query(&[("since", since)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        match status {
            s if s.is_success() => {
                response
                    .json::<DataPointPageResponse>()
                    .await
                    .map_err(|e| RemoteError::UnexpectedStatus {
                        status: status.as_u16(),
                        message: format!("malformed page body: {e}"),
                    })
            }
            StatusCode::FORBIDDEN => Err(RemoteError::Forbidden(SurveyGroupId::new(
                survey_group_id,
            ))),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(RemoteError::UnexpectedStatus {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
