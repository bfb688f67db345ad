use crate::record::{Record, Table};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// Widget label that stands for "every available option".
pub const SELECT_ALL: &str = "[Select all]";

/// A user's choice in one of the two multi-select filters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Subset(BTreeSet<String>),
}

impl Selection {
    /// Build a selection from raw widget labels.
    ///
    /// An empty list, or any list that contains [`SELECT_ALL`], means `All`.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut subset = BTreeSet::new();
        for label in labels {
            let label = label.into();
            if label == SELECT_ALL {
                return Selection::All;
            }
            subset.insert(label);
        }

        if subset.is_empty() {
            Selection::All
        } else {
            Selection::Subset(subset)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Whether `label` was picked explicitly.
    pub fn contains(&self, label: &str) -> bool {
        match self {
            Selection::All => false,
            Selection::Subset(subset) => subset.contains(label),
        }
    }

    /// Concrete label set, never wider than `available`.
    fn resolve(&self, available: &[String]) -> BTreeSet<String> {
        match self {
            Selection::All => available.iter().cloned().collect(),
            Selection::Subset(subset) => available
                .iter()
                .filter(|label| subset.contains(*label))
                .cloned()
                .collect(),
        }
    }
}

/// Both selections resolved against the table.
///
/// `vendors` is always a subset of `available_vendors`, which in turn only
/// holds vendors of records whose category is in `objects`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFilter {
    pub objects: BTreeSet<String>,
    pub available_vendors: Vec<String>,
    pub vendors: BTreeSet<String>,
}

/// Records of the table that satisfy both selections, in table order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.iter().map(|record| record.amount).sum()
    }
}

impl<'a> FromIterator<&'a Record> for FilteredView<'a> {
    fn from_iter<T: IntoIterator<Item = &'a Record>>(iter: T) -> Self {
        FilteredView {
            records: iter.into_iter().collect(),
        }
    }
}

/// Resolves the dependent object category → vendor filters over one table.
#[derive(Clone, Copy, Debug)]
pub struct FilterEngine<'a> {
    table: &'a Table,
}

impl<'a> FilterEngine<'a> {
    pub fn new(table: &'a Table) -> Self {
        FilterEngine { table }
    }

    /// Distinct, sorted category labels across the full table.
    pub fn available_object_categories(&self) -> Vec<String> {
        self.table
            .iter()
            .filter_map(Record::category_label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn set_object_selection(&self, selected: &Selection) -> BTreeSet<String> {
        selected.resolve(&self.available_object_categories())
    }

    /// Distinct, sorted vendors among records whose category is in `objects`.
    pub fn available_vendors(&self, objects: &BTreeSet<String>) -> Vec<String> {
        self.table
            .iter()
            .filter(|record| in_set(objects, record.category_label()))
            .map(|record| record.vendor.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn set_vendor_selection(
        &self,
        selected: &Selection,
        available_vendors: &[String],
    ) -> BTreeSet<String> {
        selected.resolve(available_vendors)
    }

    pub fn apply(
        &self,
        objects: &BTreeSet<String>,
        vendors: &BTreeSet<String>,
    ) -> FilteredView<'a> {
        self.table
            .iter()
            .filter(|record| {
                in_set(objects, record.category_label()) && vendors.contains(&record.vendor)
            })
            .collect()
    }

    /// Resolve both selections in dependency order: objects first, then the
    /// vendors still offered for those objects.
    pub fn resolve(&self, objects: &Selection, vendors: &Selection) -> ResolvedFilter {
        let objects = self.set_object_selection(objects);
        let available_vendors = self.available_vendors(&objects);
        let vendors = self.set_vendor_selection(vendors, &available_vendors);

        ResolvedFilter {
            objects,
            available_vendors,
            vendors,
        }
    }

    pub fn filter(&self, resolved: &ResolvedFilter) -> FilteredView<'a> {
        self.apply(&resolved.objects, &resolved.vendors)
    }
}

fn in_set(set: &BTreeSet<String>, label: Option<&str>) -> bool {
    label.is_some_and(|label| set.contains(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(month: u32, amount: i64, vendor: &str, category: Option<&str>) -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(2024, month, 10).unwrap(),
            Decimal::from(amount),
            vendor,
            category.map(str::to_string),
        )
    }

    fn scenario() -> Table {
        Table::new(vec![
            record(1, 100, "VendorA", Some("Cat1")),
            record(2, 200, "VendorB", Some("Cat2")),
            record(2, 50, "VendorA", Some("Cat1")),
        ])
    }

    fn wide() -> Table {
        Table::new(vec![
            record(1, 10, "Delta", Some("Obras civiles")),
            record(1, 20, "Alpha", Some("Ingeniería")),
            record(2, 30, "Bravo", Some("Obras civiles")),
            record(3, 40, "Alpha", Some("Montaje")),
            record(3, 50, "Charlie", None),
            record(4, 60, "Echo", Some("Ingeniería")),
        ])
    }

    fn set(labels: &[&str]) -> BTreeSet<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn empty_or_sentinel_labels_mean_all() {
        assert_eq!(Selection::from_labels(Vec::<String>::new()), Selection::All);
        assert_eq!(Selection::from_labels([SELECT_ALL]), Selection::All);
        assert_eq!(Selection::from_labels(["Cat1", SELECT_ALL]), Selection::All);
        assert_eq!(
            Selection::from_labels(["Cat2", "Cat1", "Cat2"]),
            Selection::Subset(set(&["Cat1", "Cat2"]))
        );
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let table = wide();
        let engine = FilterEngine::new(&table);
        assert_eq!(
            engine.available_object_categories(),
            vec!["Ingeniería", "Montaje", "Obras civiles"]
        );
    }

    #[test]
    fn narrowing_objects_narrows_vendors() {
        let table = scenario();
        let engine = FilterEngine::new(&table);

        let objects = engine.set_object_selection(&Selection::from_labels(["Cat2"]));
        assert_eq!(objects, set(&["Cat2"]));
        let vendors = engine.available_vendors(&objects);
        assert_eq!(vendors, vec!["VendorB"]);

        let chosen = engine.set_vendor_selection(&Selection::All, &vendors);
        let view = engine.apply(&objects, &chosen);
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].amount, Decimal::from(200));
        assert_eq!(view.records()[0].vendor, "VendorB");
    }

    #[test]
    fn available_vendors_are_monotone_in_the_object_set() {
        let table = wide();
        let engine = FilterEngine::new(&table);
        let all = engine.set_object_selection(&Selection::All);
        let all_vendors: BTreeSet<_> = engine.available_vendors(&all).into_iter().collect();

        for category in engine.available_object_categories() {
            let narrow = set(&[category.as_str()]);
            let narrow_vendors: BTreeSet<_> =
                engine.available_vendors(&narrow).into_iter().collect();
            assert!(narrow_vendors.is_subset(&all_vendors));

            let expected: BTreeSet<String> = table
                .iter()
                .filter(|r| r.category.as_deref() == Some(category.as_str()))
                .map(|r| r.vendor.clone())
                .collect();
            assert_eq!(narrow_vendors, expected);
        }
    }

    #[test]
    fn uncategorized_records_never_match() {
        let table = wide();
        let engine = FilterEngine::new(&table);
        let resolved = engine.resolve(&Selection::All, &Selection::All);

        assert!(!resolved.available_vendors.contains(&"Charlie".to_string()));
        let view = engine.filter(&resolved);
        assert_eq!(view.len(), 5);
        assert!(view.iter().all(|r| r.category.is_some()));
    }

    #[test]
    fn select_all_equals_every_option_selected() {
        let table = wide();
        let engine = FilterEngine::new(&table);

        let shortcut = engine.resolve(&Selection::All, &Selection::All);
        let categories = engine.available_object_categories();
        let explicit_objects = Selection::from_labels(categories.clone());
        let vendors = engine.available_vendors(&engine.set_object_selection(&explicit_objects));
        let explicit = engine.resolve(&explicit_objects, &Selection::from_labels(vendors));

        assert_eq!(shortcut, explicit);
        assert_eq!(engine.filter(&shortcut), engine.filter(&explicit));
    }

    #[test]
    fn stale_vendor_choices_are_dropped_when_objects_narrow() {
        let table = scenario();
        let engine = FilterEngine::new(&table);

        let resolved = engine.resolve(
            &Selection::from_labels(["Cat2"]),
            &Selection::from_labels(["VendorA", "VendorB"]),
        );
        assert_eq!(resolved.vendors, set(&["VendorB"]));

        let resolved = engine.resolve(
            &Selection::from_labels(["Cat2"]),
            &Selection::from_labels(["VendorA"]),
        );
        assert!(resolved.vendors.is_empty());
        assert!(engine.filter(&resolved).is_empty());
    }

    #[test]
    fn unknown_objects_give_an_empty_state() {
        let table = scenario();
        let engine = FilterEngine::new(&table);
        let resolved = engine.resolve(&Selection::from_labels(["Nope"]), &Selection::All);

        assert!(resolved.objects.is_empty());
        assert!(resolved.available_vendors.is_empty());
        assert!(resolved.vendors.is_empty());
        let view = engine.filter(&resolved);
        assert!(view.is_empty());
        assert_eq!(view.total(), Decimal::ZERO);
    }

    #[test]
    fn view_keeps_table_order() {
        let table = wide();
        let engine = FilterEngine::new(&table);
        let resolved = engine.resolve(
            &Selection::from_labels(["Ingeniería", "Obras civiles"]),
            &Selection::All,
        );
        let vendors: Vec<&str> = engine
            .filter(&resolved)
            .iter()
            .map(|r| r.vendor.as_str())
            .collect();
        assert_eq!(vendors, vec!["Delta", "Alpha", "Bravo", "Echo"]);
    }
}
