use anyhow::Result;
use async_trait::async_trait;

use crate::series::Sample;

/// 貝萊德
pub mod blackrock;

/// Anything that can observe today's unit value of the tracked fund.
#[async_trait]
pub trait QuotationSource {
    /// Produces one sample; a failure means nothing was observed.
    async fn fetch(&self) -> Result<Sample>;
}
