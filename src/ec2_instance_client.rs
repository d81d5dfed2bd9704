use crate::error::ReportError;
use crate::inventory::Describe;
use async_trait::async_trait;
use rusoto_ec2::{
    DescribeAddressesRequest, DescribeInstanceStatusRequest, DescribeInstancesRequest, Ec2,
    Ec2Client, Filter, Instance, InstanceStatus,
};
use std::collections::HashMap;
use tracing::info;

const MAX_RESULTS: i64 = 100;
const LISTED_STATES: [&str; 2] = ["running", "stopped"];
const STATUS_OK: &str = "ok";
const CHECKS_PASSED: &str = "2/2 checks passed";
const NOT_AVAILABLE: &str = "N/A";
const WINDOWS_PLATFORM: &str = "windows";

pub struct Ec2InstanceClient {
    client: Ec2Client,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Ec2Instance {
    pub name: String,
    pub instance_id: String,
    pub state: Option<String>,
    pub instance_type: Option<String>,
    pub status_check: String,
    pub availability_zone: Option<String>,
    pub public_dns_name: Option<String>,
    pub public_ip_address: Option<String>,
    pub elastic_ip: Option<String>,
    pub ipv6_addresses: Vec<String>,
    pub monitoring: Option<String>,
    pub security_groups: Vec<String>,
    pub key_name: Option<String>,
    pub launch_time: Option<String>,
    pub platform_details: Option<String>,
    pub private_dns_name: Option<String>,
}

impl Ec2Instance {
    fn from_instance(
        instance: Instance,
        statuses: &HashMap<String, String>,
        elastic_ips: &HashMap<String, String>,
    ) -> Result<Self, ReportError> {
        let instance_id = instance.instance_id.ok_or(ReportError::NoneValue)?;
        let name = instance
            .tags
            .unwrap_or_default()
            .into_iter()
            .find(|tag| tag.key.as_deref() == Some("Name"))
            .and_then(|tag| tag.value)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let ipv6_addresses = instance
            .network_interfaces
            .unwrap_or_default()
            .into_iter()
            .flat_map(|interface| interface.ipv_6_addresses.unwrap_or_default())
            .filter_map(|address| address.ipv_6_address)
            .collect();
        let security_groups = instance
            .security_groups
            .unwrap_or_default()
            .into_iter()
            .filter_map(|group| group.group_name)
            .collect();

        Ok(Ec2Instance {
            name,
            status_check: statuses
                .get(&instance_id)
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            elastic_ip: elastic_ips.get(&instance_id).cloned(),
            state: instance.state.and_then(|state| state.name),
            instance_type: instance.instance_type,
            availability_zone: instance
                .placement
                .and_then(|placement| placement.availability_zone),
            public_dns_name: instance.public_dns_name,
            public_ip_address: instance.public_ip_address,
            ipv6_addresses,
            monitoring: instance.monitoring.and_then(|monitoring| monitoring.state),
            security_groups,
            key_name: instance.key_name,
            launch_time: instance.launch_time,
            platform_details: platform_details(instance.platform.as_deref()),
            private_dns_name: instance.private_dns_name,
            instance_id,
        })
    }
}

/// Only Windows instances report a platform; everything else is left to the default.
fn platform_details(platform: Option<&str>) -> Option<String> {
    match platform {
        Some(WINDOWS_PLATFORM) => Some("Windows".to_string()),
        _ => None,
    }
}

fn status_check(status: &InstanceStatus) -> String {
    let is_ok = |summary: &Option<rusoto_ec2::InstanceStatusSummary>| {
        summary
            .as_ref()
            .and_then(|summary| summary.status.as_deref())
            == Some(STATUS_OK)
    };
    if is_ok(&status.system_status) && is_ok(&status.instance_status) {
        CHECKS_PASSED.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

#[async_trait]
impl Describe for Ec2InstanceClient {
    type Resource = Ec2Instance;

    async fn describe_all(&self) -> Result<Vec<Ec2Instance>, ReportError> {
        info!("Fetching EC2 instance details");
        let statuses = self.describe_status_checks().await?;
        let elastic_ips = self.describe_elastic_ips().await?;

        let mut machine_instances = Vec::<Ec2Instance>::new();
        for instance in self.describe_all_instances().await? {
            machine_instances.push(Ec2Instance::from_instance(
                instance,
                &statuses,
                &elastic_ips,
            )?);
        }
        info!(count = machine_instances.len(), "Found EC2 instances");
        Ok(machine_instances)
    }
}

impl Ec2InstanceClient {
    pub fn new_with_client(client: Ec2Client) -> Self {
        Ec2InstanceClient { client }
    }

    /// Running and stopped instances across every page.
    async fn describe_all_instances(&self) -> Result<Vec<Instance>, ReportError> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let request = DescribeInstancesRequest {
                max_results: Some(MAX_RESULTS),
                filters: Some(vec![Filter {
                    name: Some("instance-state-name".to_string()),
                    values: Some(LISTED_STATES.iter().map(|state| state.to_string()).collect()),
                }]),
                next_token: next_token.take(),
                ..DescribeInstancesRequest::default()
            };
            let result = self.client.describe_instances(request).await?;

            for reservation in result.reservations.unwrap_or_default() {
                instances.extend(reservation.instances.unwrap_or_default());
            }
            match result.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(instances)
    }

    /// Instance id to status check text.
    async fn describe_status_checks(&self) -> Result<HashMap<String, String>, ReportError> {
        let mut statuses = HashMap::new();
        let mut next_token: Option<String> = None;
        loop {
            let request = DescribeInstanceStatusRequest {
                include_all_instances: Some(true),
                max_results: Some(MAX_RESULTS),
                next_token: next_token.take(),
                ..DescribeInstanceStatusRequest::default()
            };
            let result = self.client.describe_instance_status(request).await?;

            for status in result.instance_statuses.unwrap_or_default() {
                if let Some(instance_id) = status.instance_id.clone() {
                    statuses.insert(instance_id, status_check(&status));
                }
            }
            match result.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(statuses)
    }

    /// Instance id to associated Elastic IP.
    async fn describe_elastic_ips(&self) -> Result<HashMap<String, String>, ReportError> {
        let result = self
            .client
            .describe_addresses(DescribeAddressesRequest::default())
            .await?;
        Ok(result
            .addresses
            .unwrap_or_default()
            .into_iter()
            .filter_map(|address| Some((address.instance_id?, address.public_ip?)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::ec2_instance_client::{
        platform_details, status_check, Ec2Instance, Ec2InstanceClient,
    };
    use rusoto_core::signature::{SignedRequest, SignedRequestPayload};
    use rusoto_ec2::{Ec2Client, Instance, InstanceStatus, InstanceStatusSummary, Tag};
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader,
        MultipleMockRequestDispatcher, ReadMockResponse,
    };
    use std::collections::HashMap;

    fn mock_client(file_name: &str) -> Ec2InstanceClient {
        let mock = Ec2Client::new_with(
            MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
                "test_resources/valid",
                file_name,
            )),
            MockCredentialsProvider,
            Default::default(),
        );
        Ec2InstanceClient::new_with_client(mock)
    }

    fn summary(status: &str) -> Option<InstanceStatusSummary> {
        Some(InstanceStatusSummary {
            status: Some(status.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_describe_all_instances() {
        let client = mock_client("describe_instances.xml");
        let result = client.describe_all_instances().await.unwrap();

        assert_eq!(result.len(), 1);
        let instance = Ec2Instance::from_instance(
            result.into_iter().next().unwrap(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(instance.instance_id, "i-1234567890abcdef0");
        assert_eq!(instance.name, "web-1");
        assert_eq!(instance.state.as_deref(), Some("running"));
        assert_eq!(instance.instance_type.as_deref(), Some("t2.micro"));
        assert_eq!(instance.availability_zone.as_deref(), Some("us-west-2a"));
        assert_eq!(instance.public_ip_address.as_deref(), Some("54.194.252.215"));
        assert_eq!(instance.security_groups, vec!["my-security-group"]);
        assert_eq!(instance.key_name.as_deref(), Some("my-key-pair"));
        assert_eq!(instance.monitoring.as_deref(), Some("disabled"));
        assert_eq!(instance.status_check, "N/A");
    }

    fn request_body(request: &SignedRequest) -> String {
        match &request.payload {
            Some(SignedRequestPayload::Buffer(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => String::new(),
        }
    }

    fn page(file_name: &str) -> MockRequestDispatcher {
        MockRequestDispatcher::default().with_body(&*MockResponseReader::read_response(
            "test_resources/paged",
            file_name,
        ))
    }

    #[tokio::test]
    async fn test_describe_all_instances_across_pages() {
        let mock = Ec2Client::new_with(
            MultipleMockRequestDispatcher::new(vec![
                page("describe_instances_1.xml").with_request_checker(|request| {
                    assert!(!request_body(request).contains("NextToken"));
                }),
                page("describe_instances_2.xml").with_request_checker(|request| {
                    assert!(request_body(request).contains("NextToken=page-2"));
                }),
            ]),
            MockCredentialsProvider,
            Default::default(),
        );

        let client = Ec2InstanceClient::new_with_client(mock);
        let result: Vec<Ec2Instance> = client
            .describe_all_instances()
            .await
            .unwrap()
            .into_iter()
            .map(|instance| {
                Ec2Instance::from_instance(instance, &HashMap::new(), &HashMap::new()).unwrap()
            })
            .collect();

        let names: Vec<&str> = result.iter().map(|instance| instance.name.as_str()).collect();
        assert_eq!(names, ["api-1", "build-win"]);
        assert_eq!(result[0].platform_details, None);
        assert_eq!(result[1].state.as_deref(), Some("stopped"));
        assert_eq!(result[1].platform_details.as_deref(), Some("Windows"));
    }

    #[tokio::test]
    async fn test_describe_status_checks() {
        let client = mock_client("describe_instance_status.xml");
        let result = client.describe_status_checks().await.unwrap();

        assert_eq!(
            result.get("i-1234567890abcdef0").map(String::as_str),
            Some("2/2 checks passed")
        );
        assert_eq!(
            result.get("i-0598c7d356eba48d7").map(String::as_str),
            Some("N/A")
        );
    }

    #[tokio::test]
    async fn test_describe_elastic_ips() {
        let client = mock_client("describe_addresses.xml");
        let result = client.describe_elastic_ips().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result.get("i-1234567890abcdef0").map(String::as_str),
            Some("203.0.113.25")
        );
    }

    #[test]
    fn test_status_check() {
        let passed = InstanceStatus {
            system_status: summary("ok"),
            instance_status: summary("ok"),
            ..Default::default()
        };
        let impaired = InstanceStatus {
            system_status: summary("ok"),
            instance_status: summary("impaired"),
            ..Default::default()
        };

        assert_eq!(status_check(&passed), "2/2 checks passed");
        assert_eq!(status_check(&impaired), "N/A");
        assert_eq!(status_check(&InstanceStatus::default()), "N/A");
    }

    #[test]
    fn test_from_instance_joins_lookups() {
        let instance = Instance {
            instance_id: Some("i-0abc".to_string()),
            tags: Some(vec![Tag {
                key: Some("Env".to_string()),
                value: Some("prod".to_string()),
            }]),
            public_dns_name: Some("".to_string()),
            ..Default::default()
        };
        let statuses: HashMap<String, String> =
            vec![("i-0abc".to_string(), "2/2 checks passed".to_string())]
                .into_iter()
                .collect();
        let elastic_ips: HashMap<String, String> =
            vec![("i-0abc".to_string(), "198.51.100.7".to_string())]
                .into_iter()
                .collect();

        let result = Ec2Instance::from_instance(instance, &statuses, &elastic_ips).unwrap();

        assert_eq!(result.name, "N/A");
        assert_eq!(result.status_check, "2/2 checks passed");
        assert_eq!(result.elastic_ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(result.public_dns_name.as_deref(), Some(""));
        assert_eq!(result.platform_details, None);
    }

    #[test]
    fn test_platform_details() {
        let instance = Instance {
            instance_id: Some("i-0win".to_string()),
            platform: Some("windows".to_string()),
            ..Default::default()
        };

        let result =
            Ec2Instance::from_instance(instance, &HashMap::new(), &HashMap::new()).unwrap();

        assert_eq!(result.platform_details.as_deref(), Some("Windows"));
        assert_eq!(platform_details(None), None);
        assert_eq!(platform_details(Some("linux")), None);
    }

    #[test]
    fn test_from_instance_requires_id() {
        let result =
            Ec2Instance::from_instance(Instance::default(), &HashMap::new(), &HashMap::new());

        assert!(result.is_err());
    }
}
