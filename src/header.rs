//! Column catalog (dataset header).
//!
//! Maps column names to their current row position, type coercer and optional label
//! encoder. Positions are compacted whenever columns are removed, so only the name is a
//! stable identity.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::coercion::{parse_type, Coercer, TypeSpec};
use crate::encoding::LabelEncoder;
use crate::error::{DatasetError, DatasetResult};

/// A named, typed slot present at the same position in every row.
#[derive(Clone)]
pub struct Column {
    name: String,
    index: usize,
    spec: TypeSpec,
    coercer: Coercer,
    encoder: Option<LabelEncoder>,
}

impl Column {
    fn new(name: String, index: usize, spec: TypeSpec, should_encode: bool) -> Self {
        let coercer = parse_type(&spec);
        Self {
            name,
            index,
            spec,
            coercer,
            encoder: should_encode.then(LabelEncoder::new),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current position in each row. Changes when earlier columns are removed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared type.
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Label encoder, if the column is encoded.
    pub fn encoder(&self) -> Option<&LabelEncoder> {
        self.encoder.as_ref()
    }

    pub(crate) fn encoder_mut(&mut self) -> Option<&mut LabelEncoder> {
        self.encoder.as_mut()
    }

    /// Returns the encoder, registering an empty one first if needed.
    pub(crate) fn ensure_encoder(&mut self) -> &mut LabelEncoder {
        self.encoder.get_or_insert_with(LabelEncoder::new)
    }

    pub(crate) fn set_spec(&mut self, spec: TypeSpec) {
        self.coercer = parse_type(&spec);
        self.spec = spec;
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("spec", &self.spec)
            .field("encoded_values", &self.encoder.as_ref().map(LabelEncoder::len))
            .finish()
    }
}

/// Ordered bijection between column names and row positions.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
}

impl ColumnCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from header cells.
    ///
    /// `types` overrides the spec of named columns (others use [`TypeSpec::Identity`]) and
    /// `encoders` lists the columns that get a fresh [`LabelEncoder`]. Every name in
    /// either must be one of `names`.
    pub fn parse_from_array<S: AsRef<str>>(
        names: &[S],
        types: &HashMap<String, TypeSpec>,
        encoders: &[String],
    ) -> DatasetResult<Self> {
        let mut catalog = Self::new();
        for name in names {
            let name = name.as_ref();
            let spec = types.get(name).cloned().unwrap_or_default();
            let should_encode = encoders.iter().any(|e| e == name);
            catalog.add_column(name, spec, should_encode)?;
        }

        for name in types.keys().chain(encoders.iter()) {
            if !catalog.positions.contains_key(name) {
                return Err(DatasetError::ColumnNotFound { name: name.clone() });
            }
        }
        Ok(catalog)
    }

    /// Append a column and return its index.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        spec: TypeSpec,
        should_encode: bool,
    ) -> DatasetResult<usize> {
        let name = name.into();
        if self.positions.contains_key(&name) {
            return Err(DatasetError::DuplicateColumn { name });
        }
        let index = self.columns.len();
        self.positions.insert(name.clone(), index);
        self.columns.push(Column::new(name, index, spec, should_encode));
        Ok(index)
    }

    /// Remove columns by name and compact the survivors to `0..len`.
    ///
    /// Returns the removed indices as they were before compaction, in the order given.
    /// Rows must be filtered by this same index set. Nothing is removed if any name is
    /// unknown.
    pub fn remove_columns<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<Vec<usize>> {
        let mut removed = Vec::with_capacity(names.len());
        for idx in self.resolve(names)? {
            if !removed.contains(&idx) {
                removed.push(idx);
            }
        }

        let drop: HashSet<usize> = removed.iter().copied().collect();
        let old = std::mem::take(&mut self.columns);
        self.columns = old
            .into_iter()
            .filter(|c| !drop.contains(&c.index))
            .collect();
        self.reindex();
        Ok(removed)
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.index = i;
            self.positions.insert(column.name.clone(), i);
        }
    }

    /// Column by name.
    pub fn get_column_by_key(&self, name: &str) -> Option<&Column> {
        self.positions.get(name).map(|&i| &self.columns[i])
    }

    /// Column by index.
    pub fn get_column_by_index(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Like [`Self::get_column_by_key`], failing with [`DatasetError::ColumnNotFound`].
    pub fn require(&self, name: &str) -> DatasetResult<&Column> {
        self.get_column_by_key(name)
            .ok_or_else(|| DatasetError::ColumnNotFound { name: name.to_string() })
    }

    pub(crate) fn require_mut(&mut self, name: &str) -> DatasetResult<&mut Column> {
        match self.positions.get(name) {
            Some(&i) => Ok(&mut self.columns[i]),
            None => Err(DatasetError::ColumnNotFound { name: name.to_string() }),
        }
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    /// Index of a named column.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Name of the column at `index`.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    /// Resolve names to indices, failing on the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> DatasetResult<Vec<usize>> {
        names
            .iter()
            .map(|n| self.require(n.as_ref()).map(Column::index))
            .collect()
    }

    /// Replace the type spec (and coercer) of a column.
    pub fn set_type(&mut self, name: &str, spec: TypeSpec) -> DatasetResult<()> {
        self.require_mut(name)?.set_spec(spec);
        Ok(())
    }

    /// Column names in index order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
