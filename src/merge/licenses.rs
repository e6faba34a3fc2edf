//! License de-duplication across documents.

use std::collections::HashMap;

use super::alloc::IdAllocator;
use crate::coco::{License, LicenseId};

/// Licenses merged by `(name, url)`; the first copy seen is the one kept.
#[derive(Debug, Default)]
pub struct LicenseTable {
    licenses: Vec<License>,
    by_key: HashMap<(String, String), LicenseId>,
}

impl LicenseTable {
    /// Adds one document's licenses and returns its license id remap.
    pub fn absorb(
        &mut self,
        licenses: &[License],
        alloc: &mut IdAllocator,
    ) -> HashMap<LicenseId, LicenseId> {
        let mut map = HashMap::with_capacity(licenses.len());
        for license in licenses {
            let (name, url) = license.dedup_key();
            let key = (name.to_string(), url.to_string());
            let id = match self.by_key.get(&key) {
                Some(&id) => id,
                None => {
                    let id = alloc.next_license();
                    let mut kept = license.clone();
                    kept.id = id;
                    self.licenses.push(kept);
                    self.by_key.insert(key, id);
                    id
                }
            };
            map.insert(license.id, id);
        }
        map
    }

    pub fn into_licenses(self) -> Vec<License> {
        self.licenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_and_first_copy_wins() {
        let mut alloc = IdAllocator::new();
        let mut table = LicenseTable::default();

        let mut first = License::new(10u64, "CC BY").with_url("https://cc/by");
        first
            .extra
            .insert("note".into(), serde_json::Value::from("first"));
        let a = table.absorb(&[first, License::new(11u64, "CC0")], &mut alloc);

        let mut second = License::new(3u64, "CC BY").with_url("https://cc/by");
        second
            .extra
            .insert("note".into(), serde_json::Value::from("second"));
        let b = table.absorb(&[second, License::new(4u64, "CC BY")], &mut alloc);

        assert_eq!(a[&LicenseId(10)], LicenseId(1));
        assert_eq!(a[&LicenseId(11)], LicenseId(2));
        assert_eq!(b[&LicenseId(3)], LicenseId(1));
        assert_eq!(b[&LicenseId(4)], LicenseId(3));

        let merged = table.into_licenses();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].extra["note"], "first");
    }
}
