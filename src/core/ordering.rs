use crate::domain::model::{LineKind, Subscription};
use std::collections::{HashMap, HashSet};

/// 合約內的父子拆分，以成員在分組中的位置表示
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub parents: Vec<usize>,
    pub children: HashMap<&'a str, Vec<usize>>,
}

pub fn partition<'a>(members: &[&'a Subscription]) -> Partition<'a> {
    let mut result = Partition::default();

    for (position, sub) in members.iter().enumerate() {
        match sub.required_by_id.as_deref() {
            None => result.parents.push(position),
            Some(parent_id) => result.children.entry(parent_id).or_default().push(position),
        }
    }

    result
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedLine<'a> {
    pub subscription: &'a Subscription,
    pub kind: LineKind,
}

fn sort_by_product_name(positions: &mut [usize], members: &[&Subscription]) {
    // sort_by is stable: equal names keep their input order
    positions.sort_by(|a, b| members[*a].product_name().cmp(members[*b].product_name()));
}

/// 排序單一合約的訂閱：父項依產品名稱排序，每個父項後面接著它的子項，
/// 最後以原始順序補上走訪不到的項目（例如父項不在此合約內的子項）。
pub fn order_bucket<'a>(members: &[&'a Subscription]) -> Vec<OrderedLine<'a>> {
    let Partition {
        mut parents,
        mut children,
    } = partition(members);

    sort_by_product_name(&mut parents, members);
    for child_positions in children.values_mut() {
        sort_by_product_name(child_positions, members);
    }

    let mut emitted: HashSet<usize> = HashSet::with_capacity(members.len());
    let mut ordered = Vec::with_capacity(members.len());

    for parent in parents {
        if !emitted.insert(parent) {
            continue;
        }
        ordered.push(OrderedLine {
            subscription: members[parent],
            kind: LineKind::Parent,
        });

        if let Some(child_positions) = children.get(members[parent].id.as_str()) {
            for &child in child_positions {
                if emitted.insert(child) {
                    ordered.push(OrderedLine {
                        subscription: members[child],
                        kind: LineKind::Child,
                    });
                }
            }
        }
    }

    for (position, sub) in members.iter().enumerate() {
        if emitted.insert(position) {
            tracing::debug!(
                "Subscription {} requires {:?} which is not a parent in this contract",
                sub.id,
                sub.required_by_id
            );
            ordered.push(OrderedLine {
                subscription: *sub,
                kind: LineKind::Orphan,
            });
        }
    }

    ordered
}
