//! Immutable working set of records with a content-derived identity.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::record::{Position, ShopRecord};

/// Hex SHA-256 over every rendered field of every record, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetId(String);

impl DatasetId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is plenty for logs.
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// A normalized record set. Cheap to clone; records are shared.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    records: Arc<[ShopRecord]>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<ShopRecord>) -> Self {
        let id = fingerprint(&records);
        Self {
            id,
            records: records.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    #[must_use]
    pub fn records(&self) -> &[ShopRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.records.iter().map(|r| r.position)
    }

    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let mut by_province = BTreeMap::new();
        let mut checked_in = 0;
        for record in self.records.iter() {
            *by_province.entry(record.province.clone()).or_insert(0) += 1;
            if record.checked_in {
                checked_in += 1;
            }
        }

        DatasetSummary {
            total: self.records.len(),
            checked_in,
            pending: self.records.len() - checked_in,
            by_province,
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub checked_in: usize,
    pub pending: usize,
    pub by_province: BTreeMap<String, usize>,
}

fn fingerprint(records: &[ShopRecord]) -> DatasetId {
    let mut hasher = Sha256::new();
    for record in records {
        for part in [
            record.id.as_str(),
            record.name.as_str(),
            record.address.as_str(),
            record.province.as_str(),
            record.sales_representative.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(record.position.lat().to_bits().to_le_bytes());
        hasher.update(record.position.lng().to_bits().to_le_bytes());
        hasher.update([u8::from(record.checked_in), 0x1e]);
    }
    DatasetId(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, checked_in: bool, province: &str) -> ShopRecord {
        ShopRecord {
            id: id.to_string(),
            name: format!("Shop {id}"),
            province: province.to_string(),
            sales_representative: "-".to_string(),
            position: Position::try_new(8.0, 99.0).expect("valid"),
            checked_in,
            checkin_timestamp: None,
            distance_meters: None,
            remark: None,
            address: format!("{province}, ไทย"),
        }
    }

    #[test]
    fn identical_records_share_identity() {
        let a = Dataset::new(vec![record("S1", true, "Krabi")]);
        let b = Dataset::new(vec![record("S1", true, "Krabi")]);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn visit_status_change_changes_identity() {
        let a = Dataset::new(vec![record("S1", false, "Krabi")]);
        let b = Dataset::new(vec![record("S1", true, "Krabi")]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn order_changes_identity() {
        let a = Dataset::new(vec![record("S1", false, "Krabi"), record("S2", false, "Trang")]);
        let b = Dataset::new(vec![record("S2", false, "Trang"), record("S1", false, "Krabi")]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn summary_counts_status_and_province() {
        let ds = Dataset::new(vec![
            record("S1", true, "Krabi"),
            record("S2", false, "Krabi"),
            record("S3", false, "Trang"),
        ]);
        let summary = ds.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.by_province.get("Krabi"), Some(&2));
        assert_eq!(summary.by_province.get("Trang"), Some(&1));
    }

    #[test]
    fn empty_dataset_has_stable_id() {
        assert_eq!(Dataset::default().id(), Dataset::new(vec![]).id());
        assert!(Dataset::default().is_empty());
    }
}
