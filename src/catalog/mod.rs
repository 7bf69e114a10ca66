//! Remote tool catalog: discovery, authorization, and execution.
//!
//! The engine talks to the catalog through [`ToolCatalog`]; the decision
//! channel only needs [`AuthorizationWaiter`]. [`ArcadeClient`] implements
//! both over HTTP.

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::interrupt::AuthorizationHandle;

mod arcade;
mod types;

pub use arcade::ArcadeClient;
pub use types::{
    qualified_tool_name, AuthorizationResponse, AuthorizationStatus,
    CatalogTool, ToolOutput, ToolQuery,
};

#[async_trait]
pub trait ToolCatalog: Send + Sync {
    /// Fetch tool definitions in function-calling format.
    async fn discover(&self, query: &ToolQuery) -> Result<Vec<CatalogTool>, CatalogError>;

    /// Ask whether `user_id` may run `tool_name`, starting a consent flow
    /// when they may not yet.
    async fn authorize(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> Result<AuthorizationResponse, CatalogError>;

    async fn execute(
        &self,
        tool_name: &str,
        input: &serde_json::Value,
        user_id: &str,
    ) -> Result<ToolOutput, CatalogError>;
}

/// Blocks until an out-of-band consent flow finishes.
#[async_trait]
pub trait AuthorizationWaiter: Send + Sync {
    /// Resolves on completion. Denial is `AuthorizationFailed`, an unknown
    /// or timed-out handle is `AuthorizationExpired`.
    async fn wait_for_completion(&self, handle: &AuthorizationHandle) -> Result<(), CatalogError>;
}
