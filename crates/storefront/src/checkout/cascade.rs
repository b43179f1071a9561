//! Dependent province -> district -> ward selection.
//!
//! Each level is independently idle, loading, ready, or failed. Strict
//! parent-to-child invalidation: changing a parent selection always resets
//! the child lists and selections, so a ward can never outlive the district
//! it belongs to. A failed fetch records a user-facing message and leaves
//! the children in their reset state; there is no automatic retry.

use crate::services::address::{AddressError, AdminUnit, ProvinceDirectory, sort_by_name};

/// Load state of one cascade level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LevelState {
    #[default]
    Idle,
    Loading,
    Ready(Vec<AdminUnit>),
    Failed(String),
}

impl LevelState {
    /// Options to render for this level; empty unless ready.
    #[must_use]
    pub fn options(&self) -> &[AdminUnit] {
        match self {
            Self::Ready(units) => units,
            _ => &[],
        }
    }

    /// User-facing error message when the fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Build from a directory fetch: sorted options on success, a
    /// user-facing message on failure.
    #[must_use]
    pub fn from_fetch(result: Result<Vec<AdminUnit>, AddressError>) -> Self {
        match result {
            Ok(mut units) => {
                sort_by_name(&mut units);
                Self::Ready(units)
            }
            Err(e) => Self::Failed(fetch_failure_message(&e)),
        }
    }
}

/// The three-level dependent address selection.
#[derive(Debug, Clone, Default)]
pub struct AddressCascade {
    provinces: LevelState,
    districts: LevelState,
    wards: LevelState,
    selected_province: Option<String>,
    selected_district: Option<String>,
    selected_ward: Option<String>,
}

impl AddressCascade {
    /// Load the province list. Runs unconditionally when the checkout
    /// screen is built.
    pub async fn load_provinces<D: ProvinceDirectory>(&mut self, directory: &D) {
        self.provinces = LevelState::Loading;
        let result = directory.provinces().await;
        if let Err(e) = &result {
            tracing::warn!("Failed to load provinces: {e}");
        }
        self.provinces = LevelState::from_fetch(result);
    }

    /// Select a province and load its districts.
    ///
    /// The ward list and ward selection are cleared unconditionally, even if
    /// the new district list were to contain a same-named ward; there is no
    /// identity preservation across parent changes. An empty code resets the
    /// child levels without a request.
    pub async fn select_province<D: ProvinceDirectory>(&mut self, code: &str, directory: &D) {
        self.selected_district = None;
        self.selected_ward = None;
        self.wards = LevelState::Idle;

        if code.is_empty() {
            self.selected_province = None;
            self.districts = LevelState::Idle;
            return;
        }

        self.selected_province = Some(code.to_string());
        self.districts = LevelState::Loading;
        let result = directory.districts(code).await;
        if let Err(e) = &result {
            tracing::warn!(province = %code, "Failed to load districts: {e}");
        }
        self.districts = LevelState::from_fetch(result);
    }

    /// Select a district and load its wards.
    ///
    /// An empty code short-circuits the ward level to empty without a request.
    pub async fn select_district<D: ProvinceDirectory>(&mut self, code: &str, directory: &D) {
        self.selected_ward = None;

        if code.is_empty() {
            self.selected_district = None;
            self.wards = LevelState::Idle;
            return;
        }

        self.selected_district = Some(code.to_string());
        self.wards = LevelState::Loading;
        let result = directory.wards(code).await;
        if let Err(e) = &result {
            tracing::warn!(district = %code, "Failed to load wards: {e}");
        }
        self.wards = LevelState::from_fetch(result);
    }

    /// Select a ward. Purely local; wards have no children to invalidate.
    pub fn select_ward(&mut self, code: &str) {
        self.selected_ward = if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        };
    }

    /// Whether all three levels have a selection.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.selected_province.is_some()
            && self.selected_district.is_some()
            && self.selected_ward.is_some()
    }

    #[must_use]
    pub const fn provinces(&self) -> &LevelState {
        &self.provinces
    }

    #[must_use]
    pub const fn districts(&self) -> &LevelState {
        &self.districts
    }

    #[must_use]
    pub const fn wards(&self) -> &LevelState {
        &self.wards
    }

    #[must_use]
    pub fn selected_province(&self) -> Option<&str> {
        self.selected_province.as_deref()
    }

    #[must_use]
    pub fn selected_district(&self) -> Option<&str> {
        self.selected_district.as_deref()
    }

    #[must_use]
    pub fn selected_ward(&self) -> Option<&str> {
        self.selected_ward.as_deref()
    }
}

fn fetch_failure_message(_e: &AddressError) -> String {
    // Transient, retry-capable message; details go to the log, not the user.
    "Không tải được dữ liệu địa chỉ, vui lòng thử lại.".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// In-memory directory: province "01" has districts "001" (wards
    /// "00101", "00102") and "002"; province "02" has district "021".
    struct FakeDirectory {
        fail: bool,
    }

    fn unit(code: &str, name: &str) -> AdminUnit {
        AdminUnit {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    impl ProvinceDirectory for FakeDirectory {
        async fn provinces(&self) -> Result<Vec<AdminUnit>, AddressError> {
            if self.fail {
                return Err(AddressError::Parse("boom".to_string()));
            }
            Ok(vec![unit("01", "Hà Nội"), unit("02", "Đà Nẵng")])
        }

        async fn districts(&self, province_code: &str) -> Result<Vec<AdminUnit>, AddressError> {
            if self.fail {
                return Err(AddressError::Parse("boom".to_string()));
            }
            Ok(match province_code {
                "01" => vec![unit("001", "Ba Đình"), unit("002", "Hoàn Kiếm")],
                "02" => vec![unit("021", "Hải Châu")],
                _ => vec![],
            })
        }

        async fn wards(&self, district_code: &str) -> Result<Vec<AdminUnit>, AddressError> {
            if self.fail {
                return Err(AddressError::Parse("boom".to_string()));
            }
            Ok(match district_code {
                "001" => vec![unit("00101", "Phúc Xá"), unit("00102", "Trúc Bạch")],
                _ => vec![],
            })
        }
    }

    #[tokio::test]
    async fn test_provinces_load_and_sort() {
        let dir = FakeDirectory { fail: false };
        let mut cascade = AddressCascade::default();
        cascade.load_provinces(&dir).await;

        let names: Vec<&str> = cascade
            .provinces()
            .options()
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["Đà Nẵng", "Hà Nội"]);
    }

    #[tokio::test]
    async fn test_select_province_loads_districts() {
        let dir = FakeDirectory { fail: false };
        let mut cascade = AddressCascade::default();
        cascade.select_province("01", &dir).await;

        assert_eq!(cascade.selected_province(), Some("01"));
        assert_eq!(cascade.districts().options().len(), 2);
        assert_eq!(cascade.wards().options().len(), 0);
    }

    #[tokio::test]
    async fn test_province_change_resets_district_and_ward() {
        let dir = FakeDirectory { fail: false };
        let mut cascade = AddressCascade::default();
        cascade.select_province("01", &dir).await;
        cascade.select_district("001", &dir).await;
        cascade.select_ward("00101");
        assert!(cascade.is_complete());

        cascade.select_province("02", &dir).await;

        assert_eq!(cascade.selected_province(), Some("02"));
        assert_eq!(cascade.selected_district(), None);
        assert_eq!(cascade.selected_ward(), None);
        assert_eq!(cascade.wards().options().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_district_short_circuits_wards() {
        let dir = FakeDirectory { fail: false };
        let mut cascade = AddressCascade::default();
        cascade.select_province("01", &dir).await;
        cascade.select_district("001", &dir).await;
        assert_eq!(cascade.wards().options().len(), 2);

        cascade.select_district("", &dir).await;

        assert_eq!(cascade.selected_district(), None);
        assert_eq!(cascade.selected_ward(), None);
        assert_eq!(*cascade.wards(), LevelState::Idle);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_level_failed() {
        let dir = FakeDirectory { fail: true };
        let mut cascade = AddressCascade::default();
        cascade.select_province("01", &dir).await;

        assert!(cascade.districts().error().is_some());
        assert_eq!(cascade.districts().options().len(), 0);
        assert_eq!(*cascade.wards(), LevelState::Idle);
    }

    #[tokio::test]
    async fn test_is_complete_requires_all_three() {
        let dir = FakeDirectory { fail: false };
        let mut cascade = AddressCascade::default();
        assert!(!cascade.is_complete());

        cascade.select_province("01", &dir).await;
        cascade.select_district("001", &dir).await;
        assert!(!cascade.is_complete());

        cascade.select_ward("00101");
        assert!(cascade.is_complete());
    }
}
