//! Status command - Show sync state for a survey group

use anyhow::Result;
use clap::Args;

use fieldsync_core::config::Config;
use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{DataPointFilter, IDataPointStore};

use crate::output::{format_millis, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Survey group to inspect
    pub survey_group: i64,
}

impl StatusCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = format.formatter();
        let group = SurveyGroupId::new(self.survey_group);

        if !config.database.path.exists() {
            formatter.error("No database found. Run 'fieldsync sync' first.");
            return Ok(());
        }

        let store = super::open_store(config).await?;
        let watermark = store.get_sync_time(group).await?;
        let records = store
            .query_data_points(group, &DataPointFilter::new())
            .await?;
        let with_position = records.iter().filter(|dp| dp.coordinates.is_some()).count();

        if format.is_json() {
            formatter.json(&serde_json::json!({
                "survey_group": self.survey_group,
                "records": records.len(),
                "with_position": with_position,
                "watermark": watermark.as_ref().map(|t| t.as_str()),
                "database": config.database.path.display().to_string(),
            }));
            return Ok(());
        }

        formatter.success(&format!("Survey group {group}"));
        formatter.field("Records", &records.len().to_string());
        formatter.field("With position", &with_position.to_string());
        let last_sync = match &watermark {
            Some(time) => match time.as_str().parse::<i64>() {
                Ok(millis) => format_millis(millis),
                Err(_) => time.as_str().to_string(),
            },
            None => "never".to_string(),
        };
        formatter.field("Last sync", &last_sync);
        formatter.field("Database", &config.database.path.display().to_string());
        Ok(())
    }
}
