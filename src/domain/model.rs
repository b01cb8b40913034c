use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 合約快照，隨每筆訂閱一起送入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub contract_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub external_code: Option<String>,
    #[serde(default)]
    pub pricing_family: Option<String>,
}

impl Contract {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contract_number: None,
            status: Some(status.into()),
            term_months: None,
            start_date: None,
            end_date: None,
            external_code: None,
            pricing_family: None,
        }
    }

    fn sort_key(
        &self,
    ) -> (
        &str,
        &Option<String>,
        &Option<String>,
        &Option<NaiveDate>,
        &Option<NaiveDate>,
        &Option<u32>,
        &Option<String>,
        &Option<String>,
    ) {
        (
            &self.id,
            &self.contract_number,
            &self.status,
            &self.start_date,
            &self.end_date,
            &self.term_months,
            &self.external_code,
            &self.pricing_family,
        )
    }
}

// Published contracts are ordered by identifier. The remaining fields only
// break ties so the order stays total and consistent with `Eq`.
impl Ord for Contract {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Contract {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub simplified_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub contract: Option<Contract>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub required_by_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub net_mrr: Option<Decimal>,
    #[serde(default)]
    pub practice_name: Option<String>,
    #[serde(default)]
    pub provider_license_type: Option<String>,
}

impl Subscription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contract: None,
            product: None,
            required_by_id: None,
            quantity: None,
            net_mrr: None,
            practice_name: None,
            provider_license_type: None,
        }
    }

    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn with_product(mut self, name: impl Into<String>) -> Self {
        self.product = Some(Product {
            name: Some(name.into()),
            is_active: true,
            simplified_name: None,
        });
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.required_by_id = Some(parent_id.into());
        self
    }

    pub fn with_net_mrr(mut self, mrr: Decimal) -> Self {
        self.net_mrr = Some(mrr);
        self
    }

    /// 產品名稱，缺值視為空字串
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("")
    }

    /// 淨 MRR，缺值視為 0
    pub fn net_mrr_or_zero(&self) -> Decimal {
        self.net_mrr.unwrap_or(Decimal::ZERO)
    }

    pub fn contract_id(&self) -> Option<&str> {
        self.contract.as_ref().map(|c| c.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Parent,
    Child,
    Orphan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub kind: LineKind,
    pub record_url: Option<String>,
    #[serde(flatten)]
    pub subscription: Subscription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract: Contract,
    pub total_mrr: Decimal,
    pub lines: Vec<ReportLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Warning,
    Error,
}

/// 給呈現層的提示訊息，例如資料來源失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMessage {
    pub severity: MessageSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupReport {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    pub base_url: Option<String>,
    pub contracts: Vec<ContractSummary>,
    pub total_mrr: Decimal,
    pub messages: Vec<ProfileMessage>,
}

impl RollupReport {
    pub fn subscription_count(&self) -> usize {
        self.contracts.iter().map(|c| c.lines.len()).sum()
    }
}
