//! # Checkout Plans
//!
//! Each checkout page used to hardcode its own amount, buyer and headline.
//! A `CheckoutPlan` captures those values so one session controller serves
//! every page. Plans are loaded from `config/plans.toml`.

use crate::charge::Buyer;
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// Amount, placeholder buyer and display label for one checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPlan {
    /// Unique plan identifier (e.g., "plano2")
    pub id: String,

    /// Headline shown above the QR code (e.g., "Plano 2 - R$39,87")
    pub label: String,

    /// Amount in centavos
    pub amount: i64,

    pub buyer: Buyer,

    /// Whether this plan can be checked out
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl CheckoutPlan {
    /// Create a plan with the default placeholder buyer
    pub fn new(id: impl Into<String>, label: impl Into<String>, amount: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            amount,
            buyer: Buyer::new("Cliente", "cliente@email.com").with_document("00000000000"),
            active: true,
        }
    }

    /// Builder: set the buyer
    pub fn with_buyer(mut self, buyer: Buyer) -> Self {
        self.buyer = buyer;
        self
    }

    /// Amount formatted for display
    pub fn display_amount(&self) -> String {
        format_brl(self.amount)
    }
}

/// Format centavos as Brazilian reais, e.g. `3987` -> `R$ 39,87`
pub fn format_brl(centavos: i64) -> String {
    let sign = if centavos < 0 { "-" } else { "" };
    let abs = centavos.unsigned_abs();
    let reais = (abs / 100).to_string();

    // Thousands separator is '.'
    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, abs % 100)
}

/// Catalog of checkout plans
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanCatalog {
    #[serde(default)]
    pub plans: Vec<CheckoutPlan>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self { plans: Vec::new() }
    }

    /// The plans the original pages shipped with
    pub fn builtin() -> Self {
        Self::new()
            .with_plan(
                CheckoutPlan::new("plano1", "Plano 1 - R$39,87", 3987)
                    .with_buyer(Buyer::new("Cliente Automático", "cliente@example.com")),
            )
            .with_plan(CheckoutPlan::new("plano2", "Plano 2 - R$39,87", 3987))
            .with_plan(CheckoutPlan::new("plano4", "Plano 4 - R$27,89", 2789))
    }

    /// Parse a catalog from TOML (`[[plans]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self, GatewayError> {
        let catalog: PlanCatalog = toml::from_str(content)
            .map_err(|e| GatewayError::Configuration(format!("invalid plan catalog: {}", e)))?;

        if let Some(plan) = catalog.plans.iter().find(|p| p.amount <= 0) {
            return Err(GatewayError::Configuration(format!(
                "plan {} must have a positive amount",
                plan.id
            )));
        }

        Ok(catalog)
    }

    /// Load from a TOML file, falling back to the built-in plans when the file is absent
    pub fn load_or_builtin(path: &str) -> Result<Self, GatewayError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::builtin()),
            Err(e) => Err(GatewayError::Configuration(format!(
                "failed to read {}: {}",
                path, e
            ))),
        }
    }

    /// Builder: add a plan
    pub fn with_plan(mut self, plan: CheckoutPlan) -> Self {
        self.plans.push(plan);
        self
    }

    /// Get an active plan by ID
    pub fn get(&self, plan_id: &str) -> Option<&CheckoutPlan> {
        self.plans.iter().find(|p| p.id == plan_id && p.active)
    }

    /// List all active plans
    pub fn active_plans(&self) -> impl Iterator<Item = &CheckoutPlan> {
        self.plans.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
