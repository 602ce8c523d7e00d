//! IRemoteDataSource adapter over the REST client
//!
//! Maps the server's wire shapes into the port-level DTOs the engine
//! consumes. The mapping is deliberately lossless for the fields the store
//! persists; server-only fields are dropped here.

use fieldsync_core::domain::newtypes::{SurveyGroupId, SyncTime};
use fieldsync_core::ports::{
    DataPointPage, IRemoteDataSource, RemoteDataPoint, RemoteError, RemoteSubmission,
};

use crate::client::{RestClient, WireDataPoint, WireSurveyInstance};

/// REST-backed implementation of the remote data source port
pub struct RestRemoteDataSource {
    client: RestClient,
}

impl RestRemoteDataSource {
    /// Creates the adapter over an existing client
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

/// Map a wire submission into the port DTO
fn submission_from_wire(instance: WireSurveyInstance) -> RemoteSubmission {
    RemoteSubmission {
        uuid: instance.uuid,
        form_id: instance.survey_id.to_string(),
        collection_date: instance.collection_date,
        submitter: instance.submitter.unwrap_or_default(),
        status: instance.status,
    }
}

/// Map a wire data point into the port DTO
fn data_point_from_wire(dp: WireDataPoint) -> RemoteDataPoint {
    RemoteDataPoint {
        id: dp.id,
        survey_group_id: dp.survey_group_id,
        display_name: dp.display_name,
        latitude: dp.lat,
        longitude: dp.lon,
        last_modified: dp.last_update_date_time,
        submissions: dp
            .survey_instances
            .into_iter()
            .map(submission_from_wire)
            .collect(),
    }
}

#[async_trait::async_trait]
impl IRemoteDataSource for RestRemoteDataSource {
    async fn fetch_page(
        &self,
        survey_group_id: SurveyGroupId,
        since: Option<&SyncTime>,
    ) -> Result<DataPointPage, RemoteError> {
        let response = self
            .client
            .fetch_data_points(survey_group_id.as_i64(), since.map(SyncTime::as_str))
            .await?;

        Ok(DataPointPage {
            data_points: response
                .data_points
                .into_iter()
                .map(data_point_from_wire)
                .collect(),
            result_count: response.result_count,
        })
    }
}
