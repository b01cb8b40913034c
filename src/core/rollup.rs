use crate::core::grouping::{filter_qualifying, group_by_contract, StatusFilter};
use crate::core::ordering::order_bucket;
use crate::domain::model::{Contract, LineKind, Subscription};
use crate::utils::error::{Result, RollupError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 單一合約排序後的訂閱與 MRR 合計
#[derive(Debug, Clone, PartialEq)]
pub struct ContractBucket {
    contract: Contract,
    subscriptions: Vec<Subscription>,
    kinds: Vec<LineKind>,
    total_mrr: Decimal,
}

impl ContractBucket {
    pub fn contract_id(&self) -> &str {
        &self.contract.id
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineKind, &Subscription)> {
        self.kinds.iter().copied().zip(self.subscriptions.iter())
    }

    pub fn total_mrr(&self) -> Decimal {
        self.total_mrr
    }
}

/// 依合約分組、排序並累計 MRR 的結果。建立後唯讀。
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRollup {
    buckets: Vec<ContractBucket>,
    index: HashMap<String, usize>,
    sorted_contracts: Vec<Contract>,
    total_mrr: Decimal,
}

impl SubscriptionRollup {
    /// 單一合約或全體 MRR 合計溢位時回傳 `InvalidInput`
    pub fn build(records: &[Subscription], filter: &StatusFilter) -> Result<Self> {
        let qualifying = filter_qualifying(records, filter);
        tracing::debug!(
            "{} of {} subscriptions belong to qualifying contracts",
            qualifying.len(),
            records.len()
        );

        let buckets: Vec<ContractBucket> = group_by_contract(qualifying)?
            .into_iter()
            .map(|group| {
                let ordered = order_bucket(&group.members);
                let (kinds, subscriptions): (Vec<LineKind>, Vec<Subscription>) = ordered
                    .into_iter()
                    .map(|line| (line.kind, line.subscription.clone()))
                    .unzip();

                ContractBucket {
                    contract: group.contract,
                    subscriptions,
                    kinds,
                    total_mrr: group.total_mrr,
                }
            })
            .collect();

        let index = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| (bucket.contract_id().to_string(), i))
            .collect();

        let mut sorted_contracts: Vec<Contract> =
            buckets.iter().map(|b| b.contract.clone()).collect();
        sorted_contracts.sort();

        let total_mrr = buckets.iter().try_fold(Decimal::ZERO, |acc, b| {
            acc.checked_add(b.total_mrr)
                .ok_or_else(|| RollupError::InvalidInput {
                    message: format!("MRR total overflow across contracts at {}", b.contract_id()),
                })
        })?;

        tracing::info!(
            "📊 Rolled up {} subscriptions into {} contracts",
            buckets.iter().map(|b| b.subscriptions.len()).sum::<usize>(),
            buckets.len()
        );

        Ok(Self {
            buckets,
            index,
            sorted_contracts,
            total_mrr,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// 依首次出現順序
    pub fn buckets(&self) -> &[ContractBucket] {
        &self.buckets
    }

    pub fn bucket(&self, contract_id: &str) -> Option<&ContractBucket> {
        self.index.get(contract_id).map(|&i| &self.buckets[i])
    }

    pub fn subscriptions_for(&self, contract_id: &str) -> Option<&[Subscription]> {
        self.bucket(contract_id).map(ContractBucket::subscriptions)
    }

    pub fn mrr_for(&self, contract_id: &str) -> Option<Decimal> {
        self.bucket(contract_id).map(ContractBucket::total_mrr)
    }

    pub fn grouped_subscriptions(&self) -> HashMap<&str, &[Subscription]> {
        self.buckets
            .iter()
            .map(|b| (b.contract_id(), b.subscriptions()))
            .collect()
    }

    pub fn mrr_by_contract(&self) -> HashMap<&str, Decimal> {
        self.buckets
            .iter()
            .map(|b| (b.contract_id(), b.total_mrr))
            .collect()
    }

    pub fn sorted_contracts(&self) -> &[Contract] {
        &self.sorted_contracts
    }

    pub fn total_mrr(&self) -> Decimal {
        self.total_mrr
    }
}

impl Default for SubscriptionRollup {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            index: HashMap::new(),
            sorted_contracts: Vec::new(),
            total_mrr: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activated(id: &str) -> Contract {
        Contract::new(id, "Activated")
    }

    #[test]
    fn test_build_publishes_three_views() {
        let records = vec![
            Subscription::new("s1")
                .with_contract(activated("c2"))
                .with_product("Zeta")
                .with_net_mrr(Decimal::new(100, 0)),
            Subscription::new("s2")
                .with_contract(activated("c1"))
                .with_product("Alpha")
                .with_net_mrr(Decimal::new(50, 0)),
            Subscription::new("s3")
                .with_contract(activated("c2"))
                .with_product("Alpha"),
        ];

        let rollup = SubscriptionRollup::build(&records, &StatusFilter::default()).unwrap();

        let grouped = rollup.grouped_subscriptions();
        assert_eq!(grouped.len(), 2);
        let c2: Vec<&str> = grouped["c2"].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(c2, vec!["s3", "s1"]);

        let mrr = rollup.mrr_by_contract();
        assert_eq!(mrr["c2"], Decimal::new(100, 0));
        assert_eq!(mrr["c1"], Decimal::new(50, 0));

        let ids: Vec<&str> = rollup.sorted_contracts().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        assert_eq!(rollup.buckets()[0].contract_id(), "c2");
        assert_eq!(rollup.total_mrr(), Decimal::new(150, 0));
    }

    #[test]
    fn test_unknown_contract_lookups() {
        let rollup = SubscriptionRollup::default();
        assert!(rollup.is_empty());
        assert!(rollup.subscriptions_for("nope").is_none());
        assert!(rollup.mrr_for("nope").is_none());
        assert!(rollup.sorted_contracts().is_empty());
    }

    #[test]
    fn test_lines_carry_kinds() {
        let records = vec![
            Subscription::new("p").with_contract(activated("c1")).with_product("Core"),
            Subscription::new("c")
                .with_contract(activated("c1"))
                .with_product("Add-on")
                .with_parent("p"),
        ];

        let rollup = SubscriptionRollup::build(&records, &StatusFilter::default()).unwrap();
        let kinds: Vec<LineKind> = rollup.buckets()[0].lines().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![LineKind::Parent, LineKind::Child]);
    }

    #[test]
    fn test_overflow_across_contracts_is_rejected() {
        let records = vec![
            Subscription::new("a")
                .with_contract(activated("c1"))
                .with_net_mrr(Decimal::MAX),
            Subscription::new("b")
                .with_contract(activated("c2"))
                .with_net_mrr(Decimal::MAX),
        ];

        let err = SubscriptionRollup::build(&records, &StatusFilter::default()).unwrap_err();
        assert!(matches!(err, RollupError::InvalidInput { .. }));
    }

    #[test]
    fn test_overflow_on_disqualified_contract_is_ignored() {
        let records = vec![
            Subscription::new("a")
                .with_contract(activated("c1"))
                .with_net_mrr(Decimal::ONE),
            Subscription::new("b")
                .with_contract(Contract::new("c2", "Expired"))
                .with_net_mrr(Decimal::MAX),
            Subscription::new("c")
                .with_contract(Contract::new("c2", "Expired"))
                .with_net_mrr(Decimal::MAX),
        ];

        let rollup = SubscriptionRollup::build(&records, &StatusFilter::default()).unwrap();
        assert_eq!(rollup.total_mrr(), Decimal::ONE);
    }
}
