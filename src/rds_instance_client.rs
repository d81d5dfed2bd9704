use crate::error::ReportError;
use crate::inventory::Describe;
use async_trait::async_trait;
use rusoto_rds::{DBInstance, DescribeDBInstancesMessage, Rds, RdsClient};
use tracing::info;

const MAX_RECORDS: i64 = 100;

pub struct RdsInstanceClient {
    client: RdsClient,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct RdsInstance {
    pub identifier: String,
    pub instance_class: Option<String>,
    pub engine: Option<String>,
    pub status: Option<String>,
    pub multi_az: Option<bool>,
    pub availability_zone: Option<String>,
    pub storage_type: Option<String>,
    pub allocated_storage_gb: Option<i64>,
}

impl RdsInstance {
    fn from_db_instance(db: DBInstance) -> Result<Self, ReportError> {
        Ok(RdsInstance {
            identifier: db.db_instance_identifier.ok_or(ReportError::NoneValue)?,
            instance_class: db.db_instance_class,
            engine: db.engine,
            status: db.db_instance_status,
            multi_az: db.multi_az,
            availability_zone: db.availability_zone,
            storage_type: db.storage_type,
            allocated_storage_gb: db.allocated_storage,
        })
    }
}

#[async_trait]
impl Describe for RdsInstanceClient {
    type Resource = RdsInstance;

    async fn describe_all(&self) -> Result<Vec<RdsInstance>, ReportError> {
        info!("Fetching RDS instance details");
        let mut db_instances = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let message = DescribeDBInstancesMessage {
                max_records: Some(MAX_RECORDS),
                marker: marker.take(),
                ..DescribeDBInstancesMessage::default()
            };
            let result = self.client.describe_db_instances(message).await?;

            for db in result.db_instances.unwrap_or_default() {
                db_instances.push(RdsInstance::from_db_instance(db)?);
            }
            match result.marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => break,
            }
        }
        info!(count = db_instances.len(), "Found RDS instances");
        Ok(db_instances)
    }
}

impl RdsInstanceClient {
    pub fn new_with_client(client: RdsClient) -> Self {
        RdsInstanceClient { client }
    }
}
