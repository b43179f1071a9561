//! Submission gate for the checkout form.
//!
//! All failures are field-level: they render inline next to the offending
//! input and block submission. No request leaves the process while the
//! error map is non-empty.

use serde::Deserialize;

use booknest_core::{Email, Phone};

use crate::models::checkout::{PaymentMethod, ShippingMethod};

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub ward: String,
    /// Absent until the address is complete (the radios are hidden).
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub coupon: String,
    /// Checkbox: present when an invoice is requested.
    #[serde(default)]
    pub invoice_requested: Option<String>,
    #[serde(default)]
    pub invoice_email: String,
}

impl CheckoutForm {
    /// Whether the shopper asked for an invoice.
    #[must_use]
    pub const fn wants_invoice(&self) -> bool {
        self.invoice_requested.is_some()
    }

    /// Template helper: express shipping selected.
    #[must_use]
    pub fn is_express(&self) -> bool {
        self.shipping_method == ShippingMethod::Express
    }

    /// Template helper: VNPay payment selected.
    #[must_use]
    pub fn is_vnpay(&self) -> bool {
        self.payment_method == PaymentMethod::Vnpay
    }
}

impl Default for CheckoutForm {
    /// The pristine checkout form: standard shipping, cash on delivery.
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            street: String::new(),
            province: String::new(),
            district: String::new(),
            ward: String::new(),
            shipping_method: ShippingMethod::Standard,
            payment_method: PaymentMethod::Cod,
            coupon: String::new(),
            invoice_requested: None,
            invoice_email: String::new(),
        }
    }
}

/// Per-field validation messages, rendered inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub invoice_email: Option<String>,
}

impl FieldErrors {
    /// True when no field has a message.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.street.is_none()
            && self.province.is_none()
            && self.district.is_none()
            && self.ward.is_none()
            && self.invoice_email.is_none()
    }
}

/// Validated contact and address fields, ready for order assembly.
#[derive(Debug, Clone)]
pub struct ValidContact {
    pub full_name: String,
    pub email: Email,
    pub phone: Phone,
    pub street: String,
    pub invoice_email: Option<Email>,
}

/// Validate the form. Address codes are only checked for presence here; the
/// submit flow resolves them against the directory and rejects codes the
/// current parent does not contain.
///
/// # Errors
///
/// Returns the per-field message map when any gate fails.
pub fn validate(form: &CheckoutForm) -> Result<ValidContact, FieldErrors> {
    let mut errors = FieldErrors::default();

    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        errors.full_name = Some("Vui lòng nhập họ tên.".to_string());
    }

    let email = match Email::parse(form.email.trim()) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.email = Some("Email không hợp lệ.".to_string());
            None
        }
    };

    let phone = match Phone::parse(&form.phone) {
        Ok(phone) => Some(phone),
        Err(_) => {
            errors.phone = Some("Số điện thoại phải có 9-11 chữ số.".to_string());
            None
        }
    };

    let street = form.street.trim();
    if street.is_empty() {
        errors.street = Some("Vui lòng nhập địa chỉ.".to_string());
    }

    if form.province.trim().is_empty() {
        errors.province = Some("Vui lòng chọn tỉnh/thành phố.".to_string());
    }
    if form.district.trim().is_empty() {
        errors.district = Some("Vui lòng chọn quận/huyện.".to_string());
    }
    if form.ward.trim().is_empty() {
        errors.ward = Some("Vui lòng chọn phường/xã.".to_string());
    }

    let invoice_email = if form.wants_invoice() {
        match Email::parse(form.invoice_email.trim()) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.invoice_email = Some("Email hóa đơn không hợp lệ.".to_string());
                None
            }
        }
    } else {
        None
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // The error map is empty, so every parsed field is present.
    match (email, phone) {
        (Some(email), Some(phone)) => Ok(ValidContact {
            full_name: full_name.to_string(),
            email,
            phone,
            street: street.to_string(),
            invoice_email,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Nguyễn Văn An".to_string(),
            email: "an@example.com".to_string(),
            phone: "0987654321".to_string(),
            street: "12 Phố Huế".to_string(),
            province: "01".to_string(),
            district: "001".to_string(),
            ward: "00101".to_string(),
            shipping_method: ShippingMethod::Standard,
            payment_method: PaymentMethod::Cod,
            coupon: String::new(),
            invoice_requested: None,
            invoice_email: String::new(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let contact = validate(&valid_form()).unwrap();
        assert_eq!(contact.full_name, "Nguyễn Văn An");
        assert_eq!(contact.phone.as_str(), "0987654321");
        assert!(contact.invoice_email.is_none());
    }

    #[test]
    fn test_missing_name_blocks() {
        let mut form = valid_form();
        form.full_name = "   ".to_string();
        let errors = validate(&form).unwrap_err();
        assert!(errors.full_name.is_some());
    }

    #[test]
    fn test_bad_email_blocks() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        let errors = validate(&form).unwrap_err();
        assert!(errors.email.is_some());
    }

    #[test]
    fn test_phone_digit_range() {
        let mut form = valid_form();
        form.phone = "12345".to_string();
        assert!(validate(&form).unwrap_err().phone.is_some());

        form.phone = "098765432".to_string(); // 9 digits
        assert!(validate(&form).is_ok());

        form.phone = "123456789012".to_string(); // 12 digits
        assert!(validate(&form).unwrap_err().phone.is_some());
    }

    #[test]
    fn test_missing_cascade_levels_block() {
        let mut form = valid_form();
        form.ward = String::new();
        let errors = validate(&form).unwrap_err();
        assert!(errors.ward.is_some());
        assert!(errors.province.is_none());
    }

    #[test]
    fn test_invoice_email_only_checked_when_requested() {
        let mut form = valid_form();
        form.invoice_email = "garbage".to_string();
        // Not requested: the bad value is ignored.
        assert!(validate(&form).is_ok());

        form.invoice_requested = Some("1".to_string());
        let errors = validate(&form).unwrap_err();
        assert!(errors.invoice_email.is_some());

        form.invoice_email = "billing@example.com".to_string();
        let contact = validate(&form).unwrap();
        assert_eq!(
            contact.invoice_email.unwrap().as_str(),
            "billing@example.com"
        );
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let errors = validate(&CheckoutForm::default()).unwrap_err();
        assert!(errors.full_name.is_some());
        assert!(errors.email.is_some());
        assert!(errors.phone.is_some());
        assert!(errors.street.is_some());
        assert!(errors.province.is_some());
        assert!(errors.district.is_some());
        assert!(errors.ward.is_some());
    }
}
