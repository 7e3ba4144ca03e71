//! reqwest-backed [`LocationClient`] for the two public geographic APIs.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{LocationClient, PostOffice, StateEntry};

const COUNTRIES_BASE: &str = "https://countriesnow.space/api/v0.1";
const PINCODE_BASE: &str = "https://api.postalpincode.in";

/// HTTP client translating provider responses into the uniform contract.
pub struct HttpLocationClient {
    http: reqwest::Client,
    countries_base: String,
    pincode_base: String,
}

impl HttpLocationClient {
    /// Client pointed at the public provider endpoints.
    pub fn new() -> Self {
        Self::with_base_urls(COUNTRIES_BASE, PINCODE_BASE)
    }

    /// Client pointed at alternate base URLs (test servers, mirrors).
    pub fn with_base_urls(
        countries_base: impl Into<String>,
        pincode_base: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            countries_base: countries_base.into(),
            pincode_base: pincode_base.into(),
        }
    }

    async fn fetch_states(&self, country: &str) -> Result<Vec<StateEntry>, reqwest::Error> {
        let body = self
            .http
            .post(format!("{}/countries/states", self.countries_base))
            .json(&json!({ "country": country }))
            .send()
            .await?
            .bytes()
            .await?;
        Ok(decode_states(&body))
    }

    async fn fetch_districts(
        &self,
        country: &str,
        state: &str,
    ) -> Result<Vec<String>, reqwest::Error> {
        let body = self
            .http
            .post(format!("{}/countries/state/cities", self.countries_base))
            .json(&json!({ "country": country, "state": state }))
            .send()
            .await?
            .bytes()
            .await?;
        Ok(decode_districts(&body))
    }

    async fn fetch_post_offices(
        &self,
        district: &str,
    ) -> Result<Vec<PostOffice>, reqwest::Error> {
        let Some(url) = self.post_office_url(district) else {
            return Ok(Vec::new());
        };
        let body = self.http.get(url).send().await?.bytes().await?;
        Ok(decode_post_offices(&body))
    }

    fn post_office_url(&self, district: &str) -> Option<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.pincode_base).ok()?;
        url.path_segments_mut()
            .ok()?
            .push("postoffice")
            .push(district);
        Some(url)
    }
}

impl Default for HttpLocationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationClient for HttpLocationClient {
    async fn list_states(&self, country: &str) -> Vec<StateEntry> {
        self.fetch_states(country).await.unwrap_or_default()
    }

    async fn list_districts(&self, country: &str, state: &str) -> Vec<String> {
        self.fetch_districts(country, state).await.unwrap_or_default()
    }

    async fn list_post_offices(&self, district: &str) -> Vec<PostOffice> {
        self.fetch_post_offices(district).await.unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct StatesEnvelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    data: Option<StatesData>,
}

#[derive(Deserialize)]
struct StatesData {
    #[serde(default)]
    states: Vec<StateEntry>,
}

#[derive(Deserialize)]
struct DistrictsEnvelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    data: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct PincodeBatch {
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "PostOffice", default)]
    post_office: Option<Vec<PostOffice>>,
}

fn decode_states(body: &[u8]) -> Vec<StateEntry> {
    match serde_json::from_slice::<StatesEnvelope>(body) {
        Ok(env) if !env.error => env.data.map(|d| d.states).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn decode_districts(body: &[u8]) -> Vec<String> {
    match serde_json::from_slice::<DistrictsEnvelope>(body) {
        Ok(env) if !env.error => env.data.unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn decode_post_offices(body: &[u8]) -> Vec<PostOffice> {
    let Ok(mut batches) = serde_json::from_slice::<Vec<PincodeBatch>>(body) else {
        return Vec::new();
    };
    if batches.is_empty() {
        return Vec::new();
    }
    let first = batches.remove(0);
    if first.status != "Success" {
        return Vec::new();
    }
    first.post_office.unwrap_or_default()
}
