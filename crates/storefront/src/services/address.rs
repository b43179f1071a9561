//! Client for the public Vietnamese administrative-unit API.
//!
//! Three REST endpoints keyed by province code / district code, consumed
//! read-only. The data is near-static, so responses are cached with `moka`
//! (1 hour TTL). Name lists are sorted with a diacritic-insensitive key so
//! `Ha Noi` and `Hà Nội` collate together.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::AddressApiConfig;

/// One administrative unit: a province, district, or ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUnit {
    pub code: String,
    pub name: String,
}

/// Errors from the address data source.
#[derive(Debug, Error)]
pub enum AddressError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Lookup seam for the province -> district -> ward hierarchy.
///
/// The production implementation is [`AddressClient`]; tests drive the
/// cascade with an in-memory fake.
pub trait ProvinceDirectory {
    /// All provinces.
    fn provinces(&self) -> impl Future<Output = Result<Vec<AdminUnit>, AddressError>> + Send;

    /// Districts of a province.
    fn districts(
        &self,
        province_code: &str,
    ) -> impl Future<Output = Result<Vec<AdminUnit>, AddressError>> + Send;

    /// Wards of a district.
    fn wards(
        &self,
        district_code: &str,
    ) -> impl Future<Output = Result<Vec<AdminUnit>, AddressError>> + Send;
}

// Wire types: the public API uses numeric codes.

#[derive(Debug, Deserialize)]
struct UnitPayload {
    code: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProvinceDetail {
    #[serde(default)]
    districts: Vec<UnitPayload>,
}

#[derive(Debug, Deserialize)]
struct DistrictDetail {
    #[serde(default)]
    wards: Vec<UnitPayload>,
}

impl From<UnitPayload> for AdminUnit {
    fn from(raw: UnitPayload) -> Self {
        Self {
            code: raw.code.to_string(),
            name: raw.name,
        }
    }
}

/// Client for the administrative-unit REST API.
#[derive(Clone)]
pub struct AddressClient {
    inner: Arc<AddressClientInner>,
}

struct AddressClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Arc<Vec<AdminUnit>>>,
}

impl AddressClient {
    /// Create a new address API client.
    #[must_use]
    pub fn new(config: &AddressApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1024)
            .time_to_live(Duration::from_secs(3600)) // 1 hour
            .build();

        Self {
            inner: Arc::new(AddressClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AddressError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AddressError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AddressError::Parse(e.to_string()))
    }

    async fn cached_units<F>(&self, cache_key: &str, fetch: F) -> Result<Vec<AdminUnit>, AddressError>
    where
        F: AsyncFnOnce() -> Result<Vec<AdminUnit>, AddressError>,
    {
        if let Some(units) = self.inner.cache.get(cache_key).await {
            debug!(key = %cache_key, "Cache hit for address units");
            return Ok(units.as_ref().clone());
        }

        let mut units = fetch().await?;
        sort_by_name(&mut units);

        self.inner
            .cache
            .insert(cache_key.to_string(), Arc::new(units.clone()))
            .await;

        Ok(units)
    }
}

impl ProvinceDirectory for AddressClient {
    #[instrument(skip(self))]
    async fn provinces(&self) -> Result<Vec<AdminUnit>, AddressError> {
        self.cached_units("provinces", async || {
            let url = format!("{}/p/", self.inner.base_url);
            let raw: Vec<UnitPayload> = self.get_json(&url).await?;
            Ok(raw.into_iter().map(AdminUnit::from).collect())
        })
        .await
    }

    #[instrument(skip(self), fields(province = %province_code))]
    async fn districts(&self, province_code: &str) -> Result<Vec<AdminUnit>, AddressError> {
        let cache_key = format!("districts:{province_code}");
        self.cached_units(&cache_key, async || {
            let url = format!("{}/p/{province_code}?depth=2", self.inner.base_url);
            let detail: ProvinceDetail = self.get_json(&url).await?;
            Ok(detail.districts.into_iter().map(AdminUnit::from).collect())
        })
        .await
    }

    #[instrument(skip(self), fields(district = %district_code))]
    async fn wards(&self, district_code: &str) -> Result<Vec<AdminUnit>, AddressError> {
        let cache_key = format!("wards:{district_code}");
        self.cached_units(&cache_key, async || {
            let url = format!("{}/d/{district_code}?depth=2", self.inner.base_url);
            let detail: DistrictDetail = self.get_json(&url).await?;
            Ok(detail.wards.into_iter().map(AdminUnit::from).collect())
        })
        .await
    }
}

// =============================================================================
// Collation
// =============================================================================

/// Sort units by name with a case- and diacritic-insensitive key.
pub fn sort_by_name(units: &mut [AdminUnit]) {
    units.sort_by_cached_key(|u| collation_key(&u.name));
}

/// Lowercase and strip Vietnamese diacritics for comparison purposes.
///
/// An approximation of full Vietnamese collation: `đ` folds into `d` instead
/// of sorting between `d` and `e`, which is close enough for option lists.
fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_vietnamese)
        .collect()
}

#[allow(clippy::match_same_arms)]
const fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit(code: &str, name: &str) -> AdminUnit {
        AdminUnit {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_sort_ignores_diacritics_and_case() {
        let mut units = vec![
            unit("3", "Đà Nẵng"),
            unit("1", "an giang"),
            unit("2", "Bắc Ninh"),
            unit("4", "Cần Thơ"),
        ];
        sort_by_name(&mut units);

        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["an giang", "Bắc Ninh", "Cần Thơ", "Đà Nẵng"]);
    }

    #[test]
    fn test_collation_key_folds_vietnamese() {
        assert_eq!(collation_key("Hà Nội"), "ha noi");
        assert_eq!(collation_key("Thừa Thiên Huế"), "thua thien hue");
        assert_eq!(collation_key("Đắk Lắk"), "dak lak");
    }

    #[test]
    fn test_wire_payload_stringifies_codes() {
        let raw: UnitPayload =
            serde_json::from_str("{\"code\": 268, \"name\": \"Thành phố Thái Nguyên\"}").unwrap();
        let converted = AdminUnit::from(raw);
        assert_eq!(converted.code, "268");
        assert_eq!(converted.name, "Thành phố Thái Nguyên");
    }
}
