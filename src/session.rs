use crate::aggregate::{
    self, CumulativeTotal, GroupTotal, PeriodTotal, TOP_CATEGORIES, TOP_RECORDS, TOP_VENDORS,
};
use crate::error::LoadError;
use crate::filter::{FilterEngine, FilteredView, ResolvedFilter, Selection};
use crate::metrics::Kpis;
use crate::record::{Record, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw widget labels of one filter interaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub vendors: Vec<String>,
}

impl FilterRequest {
    pub fn object_selection(&self) -> Selection {
        Selection::from_labels(self.objects.iter().cloned())
    }

    pub fn vendor_selection(&self) -> Selection {
        Selection::from_labels(self.vendors.iter().cloned())
    }
}

/// Everything one render pass shows, computed from the current filters.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub filter: ResolvedFilter,
    pub total: Decimal,
    pub monthly: Vec<PeriodTotal>,
    pub cumulative: Vec<CumulativeTotal>,
    pub category_totals: Vec<GroupTotal>,
    pub top_vendors: Vec<GroupTotal>,
    pub top_categories: Vec<GroupTotal>,
    pub top_records: Vec<&'a Record>,
    pub records: Vec<&'a Record>,
}

/// The loaded ledger and its project-wide KPIs.
///
/// Built once at startup and shared read-only; every filter request derives
/// its own view from it.
#[derive(Clone, Debug)]
pub struct Session {
    table: Table,
    kpis: Kpis,
}

impl Session {
    /// Fails when amounts are too large to total: every aggregate of any
    /// filtered subset must stay within the `Decimal` range.
    pub fn new(table: Table, budget: Decimal) -> Result<Self, LoadError> {
        table.magnitude().ok_or(LoadError::AmountOverflow)?;
        let kpis = Kpis::compute(&table, budget).ok_or(LoadError::AmountOverflow)?;
        Ok(Session { table, kpis })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    pub fn engine(&self) -> FilterEngine<'_> {
        FilterEngine::new(&self.table)
    }

    pub fn resolve(&self, request: &FilterRequest) -> ResolvedFilter {
        self.engine()
            .resolve(&request.object_selection(), &request.vendor_selection())
    }

    /// The resolved selections and the records they keep.
    pub fn filtered(&self, request: &FilterRequest) -> (ResolvedFilter, FilteredView<'_>) {
        let resolved = self.resolve(request);
        let view = self.engine().filter(&resolved);
        (resolved, view)
    }

    pub fn view(&self, request: &FilterRequest) -> DashboardView<'_> {
        let (filter, view) = self.filtered(request);

        let monthly = aggregate::monthly_totals(&view);
        let cumulative = aggregate::cumulative_totals(&monthly);
        let category_totals = aggregate::category_totals(&view);
        let top_categories = aggregate::top_categories(&category_totals, TOP_CATEGORIES);

        DashboardView {
            total: view.total(),
            top_vendors: aggregate::top_vendors(&view, TOP_VENDORS),
            top_records: aggregate::top_records(&view, TOP_RECORDS),
            records: view.records().to_vec(),
            filter,
            monthly,
            cumulative,
            category_totals,
            top_categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn session() -> Session {
        let record = |m: u32, amount: i64, vendor: &str, category: &str| {
            Record::new(
                NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                Decimal::from(amount),
                vendor,
                Some(category.to_string()),
            )
        };
        Session::new(
            Table::new(vec![
                record(1, 100, "VendorA", "Cat1"),
                record(2, 200, "VendorB", "Cat2"),
                record(2, 50, "VendorA", "Cat1"),
            ]),
            Decimal::from(1000),
        )
        .unwrap()
    }

    #[test]
    fn amounts_that_cancel_out_but_overflow_a_subset_are_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let large = Decimal::MAX - Decimal::from(10);
        let table = Table::new(vec![
            Record::new(date, large, "VendorA", Some("Cat1".into())),
            Record::new(date, -large, "VendorB", Some("Cat2".into())),
            Record::new(date, Decimal::from(20), "VendorA", Some("Cat1".into())),
        ]);
        assert!(Kpis::compute(&table, Decimal::from(1000)).is_some());
        assert!(matches!(
            Session::new(table, Decimal::from(1000)),
            Err(LoadError::AmountOverflow)
        ));
    }

    #[test]
    fn kpis_ignore_the_filter() {
        let session = session();
        let request = FilterRequest {
            objects: vec!["Cat2".into()],
            vendors: vec![],
        };
        let view = session.view(&request);

        assert_eq!(view.total, Decimal::from(200));
        assert_eq!(session.kpis().executed, Decimal::from(350));
        assert_eq!(session.kpis().balance, Decimal::from(650));
    }

    #[test]
    fn narrowed_view_matches_scenario() {
        let session = session();
        let request = FilterRequest {
            objects: vec!["Cat2".into()],
            vendors: vec!["[Select all]".into()],
        };
        let view = session.view(&request);

        assert_eq!(view.filter.available_vendors, vec!["VendorB"]);
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].vendor, "VendorB");
        assert_eq!(view.monthly.len(), 1);
        assert_eq!(view.cumulative[0].cumulative, Decimal::from(200));
    }

    #[test]
    fn default_request_shows_everything() {
        let session = session();
        let view = session.view(&FilterRequest::default());

        assert_eq!(view.records.len(), 3);
        assert_eq!(view.total, session.kpis().executed);
        assert_eq!(view.top_vendors[0].label, "VendorB");
        assert_eq!(view.top_records[0].amount, Decimal::from(200));
    }

    #[test]
    fn view_serializes_for_the_api() {
        let session = session();
        let view = session.view(&FilterRequest::default());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["monthly"][1]["period"], "2024-02");
        assert_eq!(json["monthly"][1]["total"], "250");
        assert_eq!(json["category_totals"][0]["label"], "Cat2");
        assert_eq!(json["records"].as_array().unwrap().len(), 3);
    }
}
