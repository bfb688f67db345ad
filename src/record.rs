use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Year-month grouping key derived from a record's document date.
///
/// Ordering is chronological and matches the lexicographic order of the
/// `YYYY-MM` rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One expense line of the project ledger.
///
/// Date, amount and vendor are always present; rows lacking any of them never
/// make it past the loader. The object category may be missing, in which case
/// the record still counts toward the executed total but never matches a
/// category selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub period: Period,
    pub amount: Decimal,
    pub vendor: String,
    pub category: Option<String>,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        vendor: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        Record {
            date,
            period: Period::of(date),
            amount,
            vendor: vendor.into(),
            category,
        }
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// The loaded ledger. Built once per session and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sum of absolute amounts, `None` if it leaves the `Decimal` range.
    ///
    /// Bounds every total taken over any subset of the records.
    pub fn magnitude(&self) -> Option<Decimal> {
        self.iter()
            .try_fold(Decimal::ZERO, |acc, record| acc.checked_add(record.amount.abs()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Table::new(iter.into_iter().collect())
    }
}

/// Header names of the four columns the dashboard reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub date: String,
    pub amount: String,
    pub vendor: String,
    pub category: String,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            date: "Fecha de documento".to_string(),
            amount: "Val/Mon.so.CO".to_string(),
            vendor: "Proveedor".to_string(),
            category: "Denominación del objeto".to_string(),
        }
    }
}

impl Schema {
    /// Column headers in export order: date, category, amount, vendor.
    pub fn export_headers(&self) -> [&str; 4] {
        [&self.date, &self.category, &self.amount, &self.vendor]
    }
}
