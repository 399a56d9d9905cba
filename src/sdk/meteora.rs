//! JSON-RPC backed [`PoolSdk`] for Meteora dynamic AMM and DLMM pools.

use async_trait::async_trait;

use super::dlmm::DlmmPair;
use super::dynamic_amm::DynamicAmmPool;
use super::rpc::RpcConnection;
use super::{AmmPool, ChainConnection, DlmmPool, PoolSdk, SdkError};
use crate::domain::Pubkey;

/// Builds [`RpcConnection`]s and loads pools through them.
///
/// Stateless: every [`PoolSdk::connect`] call yields an independent
/// connection owned by the calling request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcPoolSdk;

impl RpcPoolSdk {
    /// Creates the collaborator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PoolSdk for RpcPoolSdk {
    fn connect(&self, node_url: &str) -> Result<Box<dyn ChainConnection>, SdkError> {
        Ok(Box::new(RpcConnection::new(node_url)?))
    }
}

#[async_trait]
impl ChainConnection for RpcConnection {
    async fn load_amm_pool(&self, pool: &Pubkey) -> Result<Box<dyn AmmPool>, SdkError> {
        let loaded = DynamicAmmPool::load(self.clone(), *pool).await?;
        Ok(Box::new(loaded))
    }

    async fn load_dlmm_pool(&self, pool: &Pubkey) -> Result<Box<dyn DlmmPool>, SdkError> {
        let loaded = DlmmPair::load(self.clone(), *pool).await?;
        Ok(Box::new(loaded))
    }
}
