//! Column/value lists for INSERT, UPDATE and UPSERT.

use crate::expr::Operand;

/// An ordered list of `column => value` pairs.
///
/// ```ignore
/// let row = Record::new().set("email", "john@example.com").set("vote", 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Operand)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an earlier value for the same column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Operand>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Operand> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn fields(&self) -> &[(String, Operand)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Values in the order of `columns`; missing columns bind NULL.
    pub fn values_for(&self, columns: &[String]) -> Vec<Operand> {
        columns
            .iter()
            .map(|c| self.get(c).cloned().unwrap_or_else(|| Operand::from(None::<i64>)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Operand>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Record::new(), |record, (k, v)| record.set(k, v))
    }
}

/// Split records into a shared column list (taken from the first record)
/// and one value row per record.
pub fn rows_of(records: &[Record]) -> (Vec<String>, Vec<Vec<Operand>>) {
    let Some(first) = records.first() else {
        return (Vec::new(), Vec::new());
    };
    let columns = first.columns();
    let rows = records.iter().map(|r| r.values_for(&columns)).collect();
    (columns, rows)
}

/// What an UPSERT does to a row that already exists.
#[derive(Debug, Clone)]
pub enum UpsertUpdate {
    /// Overwrite these columns with the incoming values
    Columns(Vec<String>),
    /// Assign explicit values
    Values(Record),
}

impl UpsertUpdate {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UpsertUpdate::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            UpsertUpdate::Columns(c) => c.is_empty(),
            UpsertUpdate::Values(r) => r.is_empty(),
        }
    }
}
