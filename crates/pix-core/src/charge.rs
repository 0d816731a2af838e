//! # Charge Types
//!
//! Request and result types for a PIX charge.

use crate::plan::CheckoutPlan;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static EXTERNAL_ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate an external id that is unique for the lifetime of the process.
///
/// Format: `pix-<unix millis>-<sequence>`.
pub fn new_external_id() -> String {
    let seq = EXTERNAL_ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("pix-{}-{}", Utc::now().timestamp_millis(), seq)
}

/// Payment method requested from the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Pix,
}

/// Buyer identification sent along with the charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub name: String,
    pub email: String,
    /// CPF/CNPJ, optional for the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl Buyer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            document: None,
        }
    }

    /// Builder: set the buyer document
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

/// A charge to be created at the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Caller-generated id, used for later status lookups
    pub external_id: String,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// Amount in centavos
    pub amount: i64,

    pub buyer: Buyer,
}

impl ChargeRequest {
    pub fn new(external_id: impl Into<String>, amount: i64, buyer: Buyer) -> Self {
        Self {
            external_id: external_id.into(),
            payment_method: PaymentMethod::Pix,
            amount,
            buyer,
        }
    }

    /// Build the request a checkout plan describes
    pub fn for_plan(plan: &CheckoutPlan, external_id: impl Into<String>) -> Self {
        Self::new(external_id, plan.amount, plan.buyer.clone())
    }

    /// JSON body as sent to the gateway
    pub fn to_body(&self) -> Value {
        // Strings, integers and a unit enum: serialization cannot fail
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Charge status as reported by the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Approved,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChargeStatus {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => ChargeStatus::Pending,
            "paid" => ChargeStatus::Paid,
            "approved" => ChargeStatus::Approved,
            "failed" => ChargeStatus::Failed,
            _ => ChargeStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Pending => "pending",
            ChargeStatus::Paid => "paid",
            ChargeStatus::Approved => "approved",
            ChargeStatus::Failed => "failed",
            ChargeStatus::Unknown => "unknown",
        }
    }

    /// `paid` and `approved` both end the session
    pub fn is_settled(&self) -> bool {
        matches!(self, ChargeStatus::Paid | ChargeStatus::Approved)
    }
}

impl std::fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// QR code image reference returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum QrImage {
    /// Hosted image
    Url(String),
    /// Raw base64-encoded PNG
    Base64Png(String),
}

impl QrImage {
    /// Value usable directly as an image `src`
    pub fn as_src(&self) -> String {
        match self {
            QrImage::Url(url) => url.clone(),
            QrImage::Base64Png(data) => format!("data:image/png;base64,{}", data),
        }
    }
}

/// Copy-paste code plus QR image for a charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPayment {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qrcode_image: Option<QrImage>,
}

/// Gateway answer for a charge creation or status lookup.
///
/// `raw` keeps the body exactly as the gateway sent it so the proxies can pass
/// it through; `status` and `pix` are the fields the session controller reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeResult {
    pub status: ChargeStatus,
    pub pix: Option<PixPayment>,
    pub raw: Value,
}

impl ChargeResult {
    /// Parse a gateway body.
    ///
    /// Accepts both `{ "data": { "status", "pix": { "code", "qrcode_base64" } } }`
    /// and the flat `{ "status", "pix_code", "qr_code_url" }` shape.
    pub fn from_body(raw: Value) -> Self {
        let obj = match raw.get("data") {
            Some(data) if data.is_object() => data,
            _ => &raw,
        };

        let status = obj
            .get("status")
            .and_then(|v| v.as_str())
            .map(ChargeStatus::parse)
            .unwrap_or_default();

        let pix = parse_nested_pix(obj).or_else(|| parse_flat_pix(obj));

        Self { status, pix, raw }
    }

    /// Give back the untouched gateway body
    pub fn into_body(self) -> Value {
        self.raw
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

fn non_empty_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn parse_nested_pix(obj: &Value) -> Option<PixPayment> {
    let pix = obj.get("pix")?;
    let code = non_empty_str(pix, "code")?.to_string();

    let qrcode_image = non_empty_str(pix, "qrcode_base64")
        .map(|s| QrImage::Base64Png(s.to_string()))
        .or_else(|| non_empty_str(pix, "qrcode_url").map(|s| QrImage::Url(s.to_string())))
        .or_else(|| non_empty_str(pix, "qrcode").map(|s| QrImage::Url(s.to_string())));

    Some(PixPayment { code, qrcode_image })
}

fn parse_flat_pix(obj: &Value) -> Option<PixPayment> {
    let code = non_empty_str(obj, "pix_code")?.to_string();

    let qrcode_image = non_empty_str(obj, "qr_code_url")
        .map(|s| QrImage::Url(s.to_string()))
        .or_else(|| non_empty_str(obj, "qr_code_base64").map(|s| QrImage::Base64Png(s.to_string())));

    Some(PixPayment { code, qrcode_image })
}
