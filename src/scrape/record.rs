use indexmap::IndexMap;

/// Placeholder for a field whose value could not be found
pub const SENTINEL: &str = "N/A";

/// One scraped project: every column is always present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    values: IndexMap<String, String>,
}

impl ProjectRecord {
    /// A record with every column set to [`SENTINEL`]
    pub fn blank<S: AsRef<str>>(columns: &[S]) -> Self {
        let values = columns
            .iter()
            .map(|column| (column.as_ref().to_string(), SENTINEL.to_string()))
            .collect();
        Self { values }
    }

    /// Overwrite a column's value
    ///
    /// Returns `false` and leaves the record untouched if `field` is not a column.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Whether `field` still holds the sentinel
    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field) == Some(SENTINEL)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Records in scrape order, sharing one column layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<String>,
    records: Vec<ProjectRecord>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, records: Vec::new() }
    }

    /// Append a record; records are never modified afterwards
    pub fn push(&mut self, record: ProjectRecord) {
        debug_assert!(record.columns().eq(self.columns.iter().map(String::as_str)));
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
