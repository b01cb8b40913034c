use crate::domain::model::{Contract, Subscription};
use crate::utils::error::{Result, RollupError};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_QUALIFYING_STATUSES: [&str; 3] = ["Suspended", "Pending Activation", "Activated"];

/// 合約狀態過濾條件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    statuses: HashSet<String>,
}

impl StatusFilter {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }

    /// 合約存在、狀態存在且屬於允許集合才保留
    pub fn qualifies(&self, subscription: &Subscription) -> bool {
        subscription
            .contract
            .as_ref()
            .and_then(|c| c.status.as_deref())
            .is_some_and(|status| self.statuses.contains(status))
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::new(DEFAULT_QUALIFYING_STATUSES)
    }
}

pub fn filter_qualifying<'a>(
    records: &'a [Subscription],
    filter: &StatusFilter,
) -> Vec<&'a Subscription> {
    records
        .iter()
        .filter(|sub| {
            let keep = filter.qualifies(sub);
            if !keep {
                tracing::debug!(
                    "Skipping subscription {} (contract status: {:?})",
                    sub.id,
                    sub.contract.as_ref().and_then(|c| c.status.as_deref())
                );
            }
            keep
        })
        .collect()
}

/// 單一合約的未排序分組，成員保留輸入順序
#[derive(Debug, Clone)]
pub struct ContractGroup<'a> {
    pub contract: Contract,
    pub members: Vec<&'a Subscription>,
    pub total_mrr: Decimal,
}

impl ContractGroup<'_> {
    pub fn contract_id(&self) -> &str {
        &self.contract.id
    }
}

/// 依合約分組並累計 MRR。分組順序為首次出現順序，
/// 同一合約的代表快照以第一筆為準，之後的快照一律忽略。
/// MRR 合計超出 `Decimal` 範圍時回傳 `InvalidInput`。
pub fn group_by_contract<'a, I>(records: I) -> Result<Vec<ContractGroup<'a>>>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut groups: Vec<ContractGroup<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for sub in records {
        let Some(contract) = sub.contract.as_ref() else {
            tracing::debug!("Subscription {} has no contract, not grouped", sub.id);
            continue;
        };

        let slot = *index.entry(contract.id.as_str()).or_insert_with(|| {
            groups.push(ContractGroup {
                contract: contract.clone(),
                members: Vec::new(),
                total_mrr: Decimal::ZERO,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if group.contract != *contract {
            tracing::debug!(
                "Contract {} seen again with a different snapshot on subscription {}, keeping the first",
                contract.id,
                sub.id
            );
        }
        group.members.push(sub);
        group.total_mrr = group
            .total_mrr
            .checked_add(sub.net_mrr_or_zero())
            .ok_or_else(|| RollupError::InvalidInput {
                message: format!(
                    "MRR total overflow for contract {} at subscription {}",
                    contract.id, sub.id
                ),
            })?;
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: &str, contract: &str, status: &str) -> Subscription {
        Subscription::new(id).with_contract(Contract::new(contract, status))
    }

    #[test]
    fn test_default_filter_statuses() {
        let filter = StatusFilter::default();
        assert!(filter.qualifies(&sub("a", "c1", "Activated")));
        assert!(filter.qualifies(&sub("a", "c1", "Suspended")));
        assert!(filter.qualifies(&sub("a", "c1", "Pending Activation")));
        assert!(!filter.qualifies(&sub("a", "c1", "Expired")));
        assert!(!filter.qualifies(&sub("a", "c1", "activated")));
    }

    #[test]
    fn test_missing_contract_or_status_is_dropped() {
        let filter = StatusFilter::default();
        let mut no_status = sub("b", "c1", "Activated");
        if let Some(c) = no_status.contract.as_mut() {
            c.status = None;
        }
        let records = vec![Subscription::new("a"), no_status, sub("c", "c1", "Activated")];

        let kept = filter_qualifying(&records, &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "c");
    }

    #[test]
    fn test_custom_filter() {
        let filter = StatusFilter::new(["Draft"]);
        assert!(filter.qualifies(&sub("a", "c1", "Draft")));
        assert!(!filter.qualifies(&sub("a", "c1", "Activated")));
    }

    #[test]
    fn test_group_preserves_first_seen_order_and_members() {
        let records = vec![
            sub("a", "c2", "Activated"),
            sub("b", "c1", "Activated"),
            sub("c", "c2", "Activated"),
        ];

        let groups = group_by_contract(&records).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].contract_id(), "c2");
        assert_eq!(groups[1].contract_id(), "c1");

        let ids: Vec<&str> = groups[0].members.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_first_contract_snapshot_wins() {
        let mut second = Contract::new("c1", "Suspended");
        second.contract_number = Some("0002".to_string());
        let records = vec![
            sub("a", "c1", "Activated"),
            Subscription::new("b").with_contract(second),
        ];

        let groups = group_by_contract(&records).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].contract.status.as_deref(), Some("Activated"));
        assert!(groups[0].contract.contract_number.is_none());
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_mrr_accumulates_with_missing_as_zero() {
        let records = vec![
            sub("a", "c1", "Activated").with_net_mrr(Decimal::new(25, 1)),
            sub("b", "c1", "Activated"),
            sub("c", "c1", "Activated").with_net_mrr(Decimal::new(30, 1)),
        ];

        let groups = group_by_contract(&records).unwrap();
        assert_eq!(groups[0].total_mrr, Decimal::new(55, 1));
    }

    #[test]
    fn test_mrr_overflow_is_invalid_input() {
        let records = vec![
            sub("a", "c1", "Activated").with_net_mrr(Decimal::MAX),
            sub("b", "c1", "Activated").with_net_mrr(Decimal::ONE),
        ];

        let err = group_by_contract(&records).unwrap_err();
        match err {
            RollupError::InvalidInput { message } => {
                assert!(message.contains("overflow for contract c1"));
                assert!(message.contains("subscription b"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_mrr_near_limit_without_overflow() {
        let records = vec![
            sub("a", "c1", "Activated").with_net_mrr(Decimal::MAX),
            sub("b", "c1", "Activated").with_net_mrr(-Decimal::ONE),
            sub("c", "c1", "Activated").with_net_mrr(Decimal::ONE),
        ];

        let groups = group_by_contract(&records).unwrap();
        assert_eq!(groups[0].total_mrr, Decimal::MAX);
    }
}
