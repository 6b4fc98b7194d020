use async_trait::async_trait;
use serde::Deserialize;

use super::AprSource;
use crate::aggregate::Aprs;

pub const MOOLA_API_URL: &str = "https://v2-srv-data-frm-smrt-cntract.herokuapp.com/get/getReserveData";

/// Moola reserve currency → wrapped (aToken) address.
const WRAPPED_TOKENS: [(&str, &str); 4] = [
    ("Celo", "0x544f0db9374270d166571d29e33794da5dce797f"),
    ("cUSD", "0xedc78ab91559cc7ee14b847fd5d9aa52bcc3d722"),
    ("cEUR", "0x950ffeace45c3b92f2306f2f66711be23d857d28"),
    ("cREAL", "0x386dcfdda9ceacb7a3a3264e421169ef3bbc0217"),
];

#[derive(Debug, Deserialize)]
pub struct ReserveData {
    pub currency: String,
    #[serde(default)]
    pub apy: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReserveDataResponse {
    pub data: Vec<ReserveData>,
}

pub struct Moola {
    http: reqwest::Client,
    api_url: String,
}

impl Moola {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self { http, api_url: api_url.to_string() }
    }
}

/// Picks the apy of the first record for each wrapped currency.
pub fn select_aprs(reserves: &[ReserveData]) -> Aprs {
    WRAPPED_TOKENS
        .iter()
        .filter_map(|(currency, token)| {
            reserves
                .iter()
                .find(|r| r.currency == *currency)
                .and_then(|r| r.apy)
                .map(|apy| (token.to_string(), apy))
        })
        .collect()
}

#[async_trait]
impl AprSource for Moola {
    fn name(&self) -> &str {
        "moola"
    }

    async fn fetch(&self) -> anyhow::Result<Aprs> {
        let res = self.http.get(&self.api_url).send().await?.error_for_status()?;
        let body: ReserveDataResponse = res.json().await?;
        Ok(select_aprs(&body.data))
    }
}
