//! List command - Display stored data points
//!
//! Provides the `fieldsync list` CLI command which:
//! 1. Queries the local store with the requested ordering and name filter
//! 2. Renders the result set through the active formatter
//! 3. With `--watch`, keeps the query open and reprints the full result
//!    set whenever the store changes

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use fieldsync_core::config::Config;
use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::domain::Coordinates;
use fieldsync_core::ports::{DataPointFilter, IDataPointStore, OrderBy};

use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OrderField {
    /// Display name, case-insensitive
    Name,
    /// Last modified, newest first
    Date,
    /// Aggregated submission status, worst first
    Status,
    /// Distance from --lat/--lon, nearest first
    Distance,
}

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Survey group to list
    pub survey_group: i64,

    /// Result ordering
    #[arg(long, value_enum, default_value_t = OrderField::Name)]
    pub order_by: OrderField,

    /// Reference latitude for --order-by distance
    #[arg(long)]
    pub lat: Option<f64>,

    /// Reference longitude for --order-by distance
    #[arg(long)]
    pub lon: Option<f64>,

    /// Only records whose name contains this text
    #[arg(long)]
    pub name: Option<String>,

    /// Keep the query open and reprint on every change
    #[arg(long)]
    pub watch: bool,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = format.formatter();
        let group = SurveyGroupId::new(self.survey_group);
        let filter = self.build_filter()?;

        let store = super::open_store(config).await?;

        if self.watch {
            let mut snapshots = store.watch_data_points(group, &filter).await?;
            loop {
                tokio::select! {
                    snapshot = snapshots.recv() => match snapshot {
                        Some(records) => formatter.data_points(&records),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        } else {
            let records = store.query_data_points(group, &filter).await?;
            formatter.data_points(&records);
        }
        Ok(())
    }

    fn build_filter(&self) -> Result<DataPointFilter> {
        let order_by = match self.order_by {
            OrderField::Name => OrderBy::Name,
            OrderField::Date => OrderBy::Date,
            OrderField::Status => OrderBy::Status,
            OrderField::Distance => match (self.lat, self.lon) {
                (Some(latitude), Some(longitude)) => {
                    // Range-checks the reference point; the ordering
                    // expression is built from these values verbatim
                    Coordinates::new(latitude, longitude)
                        .context("invalid reference position")?;
                    OrderBy::Distance {
                        latitude,
                        longitude,
                    }
                }
                _ => bail!("--order-by distance requires both --lat and --lon"),
            },
        };
        let mut filter = DataPointFilter::new().with_order_by(order_by);
        if let Some(needle) = &self.name {
            filter = filter.with_name_contains(needle.clone());
        }
        Ok(filter)
    }
}
