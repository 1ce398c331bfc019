use std::fmt::Debug;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Lifecycle trait for components owned by the [`Application`](crate::kernel::Application).
///
/// Components are initialized and started in registration order and
/// stopped in reverse.
#[async_trait]
pub trait KernelComponent: Send + Sync + Debug {
    fn name(&self) -> &'static str;
    async fn initialize(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}
