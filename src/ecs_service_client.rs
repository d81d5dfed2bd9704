use crate::error::ReportError;
use crate::inventory::Describe;
use async_trait::async_trait;
use rusoto_ecs::{
    DescribeServicesRequest, Ecs, EcsClient, ListClustersRequest, ListServicesRequest, Service,
};
use tracing::{debug, info};

/// `DescribeServices` accepts at most ten services per call.
const DESCRIBE_BATCH_SIZE: usize = 10;
const DEFAULT_LAUNCH_TYPE: &str = "EC2";

pub struct EcsServiceClient {
    client: EcsClient,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct EcsService {
    pub cluster: String,
    pub service_name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub launch_type: String,
    pub desired_count: i64,
    pub running_count: i64,
    pub task_definition: Option<String>,
}

impl EcsService {
    fn from_service(cluster: &str, service: Service) -> Result<Self, ReportError> {
        Ok(EcsService {
            cluster: cluster.to_string(),
            service_name: service.service_name.ok_or(ReportError::NoneValue)?,
            arn: service.service_arn,
            status: service.status,
            launch_type: service
                .launch_type
                .unwrap_or_else(|| DEFAULT_LAUNCH_TYPE.to_string()),
            desired_count: service.desired_count.unwrap_or(0),
            running_count: service.running_count.unwrap_or(0),
            task_definition: service.task_definition,
        })
    }
}

pub fn cluster_name(cluster_arn: &str) -> &str {
    cluster_arn.rsplit('/').next().unwrap_or(cluster_arn)
}

#[async_trait]
impl Describe for EcsServiceClient {
    type Resource = EcsService;

    async fn describe_all(&self) -> Result<Vec<EcsService>, ReportError> {
        info!("Fetching ECS service details");
        let mut services = Vec::new();
        for cluster_arn in self.list_cluster_arns().await? {
            let cluster = cluster_name(&cluster_arn).to_string();
            let service_arns = self.list_service_arns(&cluster_arn).await?;
            debug!(cluster = %cluster, count = service_arns.len(), "listed ECS services");

            for batch in service_arns.chunks(DESCRIBE_BATCH_SIZE) {
                let result = self
                    .client
                    .describe_services(DescribeServicesRequest {
                        cluster: Some(cluster_arn.clone()),
                        services: batch.to_vec(),
                        ..DescribeServicesRequest::default()
                    })
                    .await?;
                for service in result.services.unwrap_or_default() {
                    services.push(EcsService::from_service(&cluster, service)?);
                }
            }
        }
        info!(count = services.len(), "Found ECS services");
        Ok(services)
    }
}

impl EcsServiceClient {
    pub fn new_with_client(client: EcsClient) -> Self {
        EcsServiceClient { client }
    }

    async fn list_cluster_arns(&self) -> Result<Vec<String>, ReportError> {
        let mut cluster_arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let result = self
                .client
                .list_clusters(ListClustersRequest {
                    next_token: next_token.take(),
                    ..ListClustersRequest::default()
                })
                .await?;
            cluster_arns.extend(result.cluster_arns.unwrap_or_default());
            match result.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(cluster_arns)
    }

    async fn list_service_arns(&self, cluster_arn: &str) -> Result<Vec<String>, ReportError> {
        let mut service_arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let result = self
                .client
                .list_services(ListServicesRequest {
                    cluster: Some(cluster_arn.to_string()),
                    next_token: next_token.take(),
                    ..ListServicesRequest::default()
                })
                .await?;
            service_arns.extend(result.service_arns.unwrap_or_default());
            match result.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(service_arns)
    }
}
