use crate::core::rollup::SubscriptionRollup;
use crate::domain::model::{ContractSummary, LineKind, ProfileMessage, ReportLine, RollupReport};
use crate::utils::error::{Result, RollupError};
use chrono::Utc;

/// 將排序好的結果轉成輸出用的報表，合約依排序後的順序排列
pub fn build_report(
    name: &str,
    rollup: &SubscriptionRollup,
    base_url: Option<&str>,
    messages: Vec<ProfileMessage>,
) -> RollupReport {
    let base_url = base_url.map(|u| u.trim_end_matches('/').to_string());

    let contracts = rollup
        .sorted_contracts()
        .iter()
        .filter_map(|contract| rollup.bucket(&contract.id))
        .map(|bucket| ContractSummary {
            contract: bucket.contract().clone(),
            total_mrr: bucket.total_mrr(),
            lines: bucket
                .lines()
                .map(|(kind, sub)| ReportLine {
                    kind,
                    record_url: base_url.as_ref().map(|base| format!("{}/{}", base, sub.id)),
                    subscription: sub.clone(),
                })
                .collect(),
        })
        .collect();

    RollupReport {
        name: name.to_string(),
        generated_at: Utc::now(),
        base_url,
        contracts,
        total_mrr: rollup.total_mrr(),
        messages,
    }
}

pub fn render_json(report: &RollupReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_subscriptions_csv(report: &RollupReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "contract_id",
        "contract_number",
        "subscription_id",
        "kind",
        "required_by_id",
        "product_name",
        "quantity",
        "net_mrr",
        "record_url",
    ])?;

    for summary in &report.contracts {
        for line in &summary.lines {
            let sub = &line.subscription;
            let kind = match line.kind {
                LineKind::Parent => "parent",
                LineKind::Child => "child",
                LineKind::Orphan => "orphan",
            };
            writer.write_record([
                summary.contract.id.clone(),
                summary.contract.contract_number.clone().unwrap_or_default(),
                sub.id.clone(),
                kind.to_string(),
                sub.required_by_id.clone().unwrap_or_default(),
                sub.product_name().to_string(),
                sub.quantity.map(|q| q.to_string()).unwrap_or_default(),
                sub.net_mrr_or_zero().to_string(),
                line.record_url.clone().unwrap_or_default(),
            ])?;
        }
    }

    finish_csv(writer)
}

pub fn render_contracts_csv(report: &RollupReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "contract_id",
        "contract_number",
        "status",
        "start_date",
        "end_date",
        "term_months",
        "external_code",
        "subscriptions",
        "total_mrr",
    ])?;

    for summary in &report.contracts {
        let c = &summary.contract;
        writer.write_record([
            c.id.clone(),
            c.contract_number.clone().unwrap_or_default(),
            c.status.clone().unwrap_or_default(),
            c.start_date.map(|d| d.to_string()).unwrap_or_default(),
            c.end_date.map(|d| d.to_string()).unwrap_or_default(),
            c.term_months.map(|t| t.to_string()).unwrap_or_default(),
            c.external_code.clone().unwrap_or_default(),
            summary.lines.len().to_string(),
            summary.total_mrr.to_string(),
        ])?;
    }

    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RollupError::InvalidInput {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}
