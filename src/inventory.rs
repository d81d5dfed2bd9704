use crate::error::ReportError;
use async_trait::async_trait;

/// Lists every resource of one kind, following pagination to the end.
#[async_trait]
pub trait Describe {
    type Resource: Send;

    async fn describe_all(&self) -> Result<Vec<Self::Resource>, ReportError>;
}
