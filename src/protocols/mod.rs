use std::sync::Arc;

use async_trait::async_trait;

use crate::{aggregate::Aprs, config::AppConfig};

pub mod celo_rpc;
pub mod moola;
pub mod stcelo;

/// A named upstream that yields APRs for one or more token addresses.
#[async_trait]
pub trait AprSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> anyhow::Result<Aprs>;
}

/// Ordered set of sources, built once at startup.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn AprSource>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Arc<dyn AprSource>>) -> Self {
        Self { sources }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AprSource>> {
        self.sources.iter().find(|s| s.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn all(&self) -> &[Arc<dyn AprSource>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

pub fn default_sources(cfg: &AppConfig, http: reqwest::Client) -> SourceRegistry {
    let rpc = celo_rpc::CeloRpc::new(http.clone(), &cfg.celo_rpc_url);
    SourceRegistry::new(vec![
        Arc::new(moola::Moola::new(http, &cfg.moola_api_url)),
        Arc::new(stcelo::StakedCelo::new(rpc)),
    ])
}
