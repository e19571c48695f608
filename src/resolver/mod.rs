//! SRV resolvers.

use crate::{order::order_srv_records, SrvName, SrvRecord};
use async_trait::async_trait;

#[cfg(feature = "hickory")]
mod hickory;

/// Represents the ability to act as a SRV resolver.
#[async_trait]
pub trait SrvResolver: Send + Sync {
    /// SRV record representation produced by the resolver.
    type Record: SrvRecord + Send;

    /// Errors encountered during SRV resolution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gets the records corresponding to a srv name without sorting by priority
    /// or shuffling based on weight.
    async fn get_srv_records_unordered(
        &self,
        srv: &SrvName,
    ) -> Result<Vec<Self::Record>, Self::Error>;

    /// Gets the records corresponding to a srv name, sorting by priority and
    /// shuffling based on weight.
    async fn get_srv_records(&self, srv: &SrvName) -> Result<Vec<Self::Record>, Self::Error> {
        let records = self.get_srv_records_unordered(srv).await?;
        Ok(order_srv_records(records, &mut rand::rng()))
    }
}
