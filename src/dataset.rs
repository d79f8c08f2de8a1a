//! The in-memory table: a [`ColumnCatalog`] plus a row store aligned with it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;

use crate::coercion::{parse_type, Coercer, TypeSpec};
use crate::encoding::LabelEncoder;
use crate::error::{DatasetError, DatasetResult};
use crate::header::{Column, ColumnCatalog};
use crate::ingestion::csv::read_records;
use crate::ingestion::TableOptions;
use crate::processing::filter::filter_rows_by;
use crate::processing::grouping::{group_rows, GroupNode, GroupPredicate, ValuePredicate};
use crate::processing::sort::{sort_rows, SortOrder};
use crate::types::{Row, Value};

/// Rows shown at each end of the [`fmt::Display`] preview.
const PREVIEW_ROWS: usize = 5;

/// In-memory tabular dataset.
///
/// Every row has exactly [`ColumnCatalog::len`] cells, in column index order. Operations
/// that add or remove columns update the catalog and every row together.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    header: ColumnCatalog,
    rows: Vec<Row>,
}

impl DataSet {
    /// Build a dataset from an existing catalog and typed rows.
    pub fn new(header: ColumnCatalog, rows: Vec<Row>) -> DatasetResult<Self> {
        let width = header.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(DatasetError::LengthMismatch {
                expected: width,
                found: bad.len(),
            });
        }
        Ok(Self { header, rows })
    }

    /// Parse comma-separated text.
    ///
    /// The first non-blank line is the header. Data rows are windowed by
    /// [`TableOptions::slice`], must match the header width, lose their
    /// [`TableOptions::excluded`] cells, then are coerced and label-encoded column by column.
    ///
    /// ```rust
    /// use rust_tabular_dataset::coercion::TypeSpec;
    /// use rust_tabular_dataset::dataset::DataSet;
    /// use rust_tabular_dataset::ingestion::TableOptions;
    /// use rust_tabular_dataset::types::Value;
    ///
    /// let opts = TableOptions::new().with_type("a", TypeSpec::Number).with_encoder("b");
    /// let ds = DataSet::parse("a,b\n1,x\n2,y\n1,x\n", &opts).unwrap();
    ///
    /// assert_eq!(ds.columns(), vec!["a", "b"]);
    /// assert_eq!(ds.get_column("b").unwrap(), vec![Value::Number(0.0), Value::Number(1.0), Value::Number(0.0)]);
    /// ```
    pub fn parse(text: &str, options: &TableOptions) -> DatasetResult<Self> {
        let mut records = read_records(text)?.into_iter();
        let head = records.next().ok_or_else(|| DatasetError::Format {
            line: 1,
            message: "no header row".to_string(),
        })?;

        let mut header =
            ColumnCatalog::parse_from_array(&head.cells, &options.types, &options.encoders)?;

        let mut data: Vec<_> = records.collect();
        if let Some(window) = options.slice {
            data = window.apply(data);
        }

        let width = header.len();
        if let Some(bad) = data.iter().find(|r| r.cells.len() != width) {
            return Err(DatasetError::Format {
                line: bad.line,
                message: format!("expected {width} cells, found {}", bad.cells.len()),
            });
        }

        let dropped: HashSet<usize> = header.remove_columns(&options.excluded)?.into_iter().collect();

        let mut ds = Self {
            header,
            rows: Vec::with_capacity(data.len()),
        };
        for record in data {
            let cells: Vec<String> = record
                .cells
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !dropped.contains(i))
                .map(|(_, cell)| cell)
                .collect();
            let row = ds.ingest_row(cells, ds.rows.len())?;
            ds.rows.push(row);
        }

        tracing::debug!(
            rows = ds.rows.len(),
            columns = ds.header.len(),
            excluded = dropped.len(),
            "parsed dataset"
        );
        Ok(ds)
    }

    /// Coerce (and encode) additional raw rows and append them.
    ///
    /// Rows must have the current header width. Nothing is appended if any row fails.
    pub fn parse_rows(&mut self, raw_rows: Vec<Vec<String>>) -> DatasetResult<()> {
        let width = self.header.len();
        if let Some((i, bad)) = raw_rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DatasetError::Format {
                line: i + 1,
                message: format!("expected {width} cells, found {}", bad.len()),
            });
        }

        let start = self.rows.len();
        let snapshot = self.header.clone();
        let mut parsed = Vec::with_capacity(raw_rows.len());
        for (offset, cells) in raw_rows.into_iter().enumerate() {
            match self.ingest_row(cells, start + offset) {
                Ok(row) => parsed.push(row),
                Err(e) => {
                    // encoders may have learned values from the rows already parsed
                    self.header = snapshot;
                    return Err(e);
                }
            }
        }
        self.rows.extend(parsed);
        Ok(())
    }

    /// Read a local file. See [`crate::ingestion::load_from_path`].
    pub fn from_path(path: impl AsRef<Path>, options: &TableOptions) -> DatasetResult<Self> {
        crate::ingestion::load_from_path(path, options)
    }

    /// Fetch `url` and parse the body. See [`crate::ingestion::load`].
    #[cfg(feature = "http")]
    pub async fn load(url: impl reqwest::IntoUrl, options: &TableOptions) -> DatasetResult<Self> {
        crate::ingestion::load(url, options).await
    }

    /// Send a prepared request and parse the body. See [`crate::ingestion::load_request`].
    #[cfg(feature = "http")]
    pub async fn load_request(
        request: reqwest::RequestBuilder,
        options: &TableOptions,
    ) -> DatasetResult<Self> {
        crate::ingestion::load_request(request, options).await
    }

    fn ingest_row(&mut self, cells: Vec<String>, row: usize) -> DatasetResult<Row> {
        if cells.len() != self.header.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.header.len(),
                found: cells.len(),
            });
        }
        self.header
            .columns_mut()
            .zip(cells)
            .map(|(column, raw)| coerce_and_encode(column, &Value::Utf8(raw), row))
            .collect()
    }

    /// The column catalog.
    pub fn header(&self) -> &ColumnCatalog {
        &self.header
    }

    /// Rows in storage order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the dataset, keeping its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Column names in index order.
    pub fn columns(&self) -> Vec<&str> {
        self.header.column_names()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn index_of(&self, name: &str) -> DatasetResult<usize> {
        self.header.require(name).map(Column::index)
    }

    /// All values of one column, in row order.
    pub fn get_column(&self, name: &str) -> DatasetResult<Vec<Value>> {
        let idx = self.index_of(name)?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Change a column's type and re-coerce its current values.
    ///
    /// The column is left untouched if any value fails to coerce.
    pub fn set_type(&mut self, name: &str, spec: TypeSpec) -> DatasetResult<()> {
        let idx = self.index_of(name)?;
        let coercer = parse_type(&spec);
        let values = coerce_all(&coercer, name, self.rows.iter().map(|r| &r[idx]))?;

        self.header.set_type(name, spec)?;
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    /// [`Self::set_type`] for several columns.
    ///
    /// Every column is coerced before any is written, so a failure leaves the dataset as it was.
    pub fn set_types(&mut self, types: &HashMap<String, TypeSpec>) -> DatasetResult<()> {
        let mut staged = Vec::with_capacity(types.len());
        for (name, spec) in types {
            let idx = self.index_of(name)?;
            let coercer = parse_type(spec);
            let values = coerce_all(&coercer, name, self.rows.iter().map(|r| &r[idx]))?;
            staged.push((name, spec.clone(), idx, values));
        }

        for (name, spec, idx, values) in staged {
            self.header.set_type(name, spec)?;
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
        }
        Ok(())
    }

    /// Append a column holding `values` (one per row) and return its index.
    ///
    /// Values pass through the column's coercer, then its encoder when `should_encode`.
    pub fn add_column(
        &mut self,
        name: &str,
        spec: TypeSpec,
        values: Vec<Value>,
        should_encode: bool,
    ) -> DatasetResult<usize> {
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        if self.header.get_column_by_key(name).is_some() {
            return Err(DatasetError::DuplicateColumn { name: name.to_string() });
        }

        let mut values = coerce_all(&parse_type(&spec), name, values.iter())?;
        let idx = self.header.add_column(name, spec, should_encode)?;
        if let Some(encoder) = self.header.column_at_mut(idx).and_then(Column::encoder_mut) {
            encode_in_place(encoder, values.iter_mut());
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(idx)
    }

    /// Remove columns from the header and every row.
    ///
    /// Returns the removed indices as they were before removal. Unknown names fail before
    /// anything changes.
    pub fn remove_columns<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<Vec<usize>> {
        let removed = self.header.remove_columns(names)?;
        let dropped: HashSet<usize> = removed.iter().copied().collect();
        for row in &mut self.rows {
            let mut idx = 0;
            row.retain(|_| {
                let keep = !dropped.contains(&idx);
                idx += 1;
                keep
            });
        }
        tracing::debug!(removed = ?removed, remaining = self.header.len(), "removed columns");
        Ok(removed)
    }

    /// Async form of [`Self::remove_columns`]; resolves to `true` once done.
    pub async fn remove_columns_async<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<bool> {
        self.remove_columns(names).map(|_| true)
    }

    /// Replace a column's values with their label codes, creating its encoder if needed.
    ///
    /// An already-encoded column gets its codes encoded again.
    pub fn encode_column(&mut self, name: &str) -> DatasetResult<()> {
        let column = self.header.require_mut(name)?;
        let idx = column.index();
        let encoder = column.ensure_encoder();
        encode_in_place(encoder, self.rows.iter_mut().map(|r| &mut r[idx]));
        tracing::debug!(column = name, labels = encoder.len(), "encoded column");
        Ok(())
    }

    /// [`Self::encode_column`] for several columns. Unknown names fail before any change.
    pub fn encode_columns<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<()> {
        self.header.resolve(names)?;
        for name in names {
            self.encode_column(name.as_ref())?;
        }
        Ok(())
    }

    /// Replace a column's codes with the values they stand for.
    ///
    /// The encoder is kept, so encoding again reproduces the same codes.
    pub fn decode_column(&mut self, name: &str) -> DatasetResult<()> {
        self.decode_columns(&[name])
    }

    /// [`Self::decode_column`] for several columns.
    ///
    /// Every column is decoded before any is written, so a failure leaves the dataset as it was.
    pub fn decode_columns<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<()> {
        let mut staged = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self.header.require(name)?;
            let encoder = encoder_of(column)?;
            let idx = column.index();
            let decoded = self
                .rows
                .iter()
                .map(|r| decode_value(name, encoder, &r[idx]))
                .collect::<DatasetResult<Vec<Value>>>()?;
            staged.push((idx, decoded));
        }

        for (idx, decoded) in staged {
            for (row, value) in self.rows.iter_mut().zip(decoded) {
                row[idx] = value;
            }
        }
        Ok(())
    }

    /// Code for `value` in an encoded column, learning the value if it is new.
    pub fn encode_cell(&mut self, name: &str, value: &Value) -> DatasetResult<usize> {
        let column = self.header.require_mut(name)?;
        let encoder = column.encoder_mut().ok_or_else(|| DatasetError::NotEncoded {
            column: name.to_string(),
        })?;
        Ok(encoder.get_encoded(value))
    }

    /// [`Self::encode_cell`] for several values.
    pub fn encode_cells(&mut self, name: &str, values: &[Value]) -> DatasetResult<Vec<usize>> {
        values.iter().map(|v| self.encode_cell(name, v)).collect()
    }

    /// Value behind `code` in an encoded column.
    pub fn decode_cell(&self, name: &str, code: usize) -> DatasetResult<Value> {
        let encoder = encoder_of(self.header.require(name)?)?;
        encoder.get_decoded(code).cloned()
    }

    /// [`Self::decode_cell`] for several codes.
    pub fn decode_cells(&self, name: &str, codes: &[usize]) -> DatasetResult<Vec<Value>> {
        codes.iter().map(|&c| self.decode_cell(name, c)).collect()
    }

    /// For each column in `keys`, the indices of rows whose cell is `value`.
    ///
    /// Cells compare with [`Value::same_value`], so `NaN` matches `NaN` and `-0` does not
    /// match `0`. The map is keyed by column name: a key listed twice yields one entry,
    /// at its first position.
    pub fn count<S: AsRef<str>>(
        &self,
        value: &Value,
        keys: &[S],
    ) -> DatasetResult<IndexMap<String, Vec<usize>>> {
        let indexes = self.header.resolve(keys)?;
        let mut out = IndexMap::with_capacity(keys.len());
        for (key, idx) in keys.iter().zip(indexes) {
            if out.contains_key(key.as_ref()) {
                continue;
            }
            let hits = self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r[idx].same_value(value))
                .map(|(i, _)| i)
                .collect();
            out.insert(key.as_ref().to_string(), hits);
        }
        Ok(out)
    }

    /// Async form of [`Self::count`].
    pub async fn count_async<S: AsRef<str>>(
        &self,
        value: &Value,
        keys: &[S],
    ) -> DatasetResult<IndexMap<String, Vec<usize>>> {
        self.count(value, keys)
    }

    /// Call `f` with every row and its index.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[Value], usize),
    {
        for (i, row) in self.rows.iter().enumerate() {
            f(row.as_slice(), i);
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the header.
    pub fn map<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&[Value], usize) -> Row,
    {
        Self {
            header: self.header.clone(),
            rows: self.mapped_rows(mapper),
        }
    }

    /// Like [`Self::map`], replacing the rows of this dataset.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the header.
    pub fn map_inplace<F>(&mut self, mapper: F)
    where
        F: FnMut(&[Value], usize) -> Row,
    {
        self.rows = self.mapped_rows(mapper);
    }

    fn mapped_rows<F>(&self, mut mapper: F) -> Vec<Row>
    where
        F: FnMut(&[Value], usize) -> Row,
    {
        let expected_len = self.header.len();
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let out = mapper(row.as_slice(), i);
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match header length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect()
    }

    /// Async form of [`Self::for_each`]. Runs to completion on first poll.
    pub async fn for_each_async<F>(&self, f: F)
    where
        F: FnMut(&[Value], usize),
    {
        self.for_each(f)
    }

    /// Async form of [`Self::map`]. Runs to completion on first poll.
    pub async fn map_async<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&[Value], usize) -> Row,
    {
        self.map(mapper)
    }

    /// Keep only rows matching `predicate`, in order.
    pub fn filter_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| predicate(row.as_slice()));
    }

    /// Create a new dataset containing only rows that match `predicate`.
    pub fn filtered_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            header: self.header.clone(),
            rows,
        }
    }

    /// Sort rows by one or more `(column, order)` keys. The sort is stable.
    ///
    /// ```rust
    /// use rust_tabular_dataset::dataset::DataSet;
    /// use rust_tabular_dataset::ingestion::TableOptions;
    /// use rust_tabular_dataset::processing::SortOrder;
    ///
    /// let mut ds = DataSet::parse("k,v\nb,1\na,2\nb,0\n", &TableOptions::default()).unwrap();
    /// ds.sort_by(&[("k", SortOrder::Ascending), ("v", SortOrder::parse("desc"))]).unwrap();
    /// let v: Vec<String> = ds.get_column("v").unwrap().iter().map(ToString::to_string).collect();
    /// assert_eq!(v, vec!["2", "1", "0"]);
    /// ```
    pub fn sort_by(&mut self, keys: &[(&str, SortOrder)]) -> DatasetResult<()> {
        let keys = keys
            .iter()
            .map(|(name, order)| Ok((self.index_of(name)?, order)))
            .collect::<DatasetResult<Vec<(usize, &SortOrder)>>>()?;
        sort_rows(&mut self.rows, &keys);
        Ok(())
    }

    /// Sorted copy. See [`Self::sort_by`].
    pub fn sorted_by(&self, keys: &[(&str, SortOrder)]) -> DatasetResult<Self> {
        let mut out = self.clone();
        out.sort_by(keys)?;
        Ok(out)
    }

    /// Keep rows passing every per-column predicate and every per-column bucket predicate.
    ///
    /// A single key filter without bucket filters preserves row order. Otherwise rows come
    /// back clustered by the named columns (see [`filter_rows_by`]).
    pub fn filter_by(
        &mut self,
        key_filters: &[(&str, ValuePredicate)],
        group_filters: &[(&str, GroupPredicate)],
    ) -> DatasetResult<()> {
        let keys = key_filters
            .iter()
            .map(|(name, keep)| Ok((self.index_of(name)?, &**keep)))
            .collect::<DatasetResult<Vec<(usize, &dyn Fn(&Value) -> bool)>>>()?;
        let groups = group_filters
            .iter()
            .map(|(name, keep)| Ok((self.index_of(name)?, &**keep)))
            .collect::<DatasetResult<Vec<(usize, &dyn Fn(&[Row]) -> bool)>>>()?;

        filter_rows_by(&mut self.rows, &keys, &groups);
        Ok(())
    }

    /// Filtered copy. See [`Self::filter_by`].
    pub fn filtered_by(
        &self,
        key_filters: &[(&str, ValuePredicate)],
        group_filters: &[(&str, GroupPredicate)],
    ) -> DatasetResult<Self> {
        let mut out = self.clone();
        out.filter_by(key_filters, group_filters)?;
        Ok(out)
    }

    /// Group a copy of the rows by the named columns, one tree level per key.
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> DatasetResult<GroupNode> {
        let indexes = self.header.resolve(keys)?;
        Ok(group_rows(self.rows.clone(), &indexes))
    }

    /// Emit the [`fmt::Display`] preview as a `tracing` info event.
    pub fn log(&self) {
        tracing::info!(target: "dataset", rows = self.rows.len(), "\n{self}");
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns().join(", "))?;
        let n = self.rows.len();
        if n > 2 * PREVIEW_ROWS {
            for i in 0..PREVIEW_ROWS {
                write_row(f, i, &self.rows[i])?;
            }
            writeln!(f, "...")?;
            for i in n - PREVIEW_ROWS..n {
                write_row(f, i, &self.rows[i])?;
            }
        } else {
            for (i, row) in self.rows.iter().enumerate() {
                write_row(f, i, row)?;
            }
        }
        write!(f, "({n} rows x {} columns)", self.header.len())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, i: usize, row: &Row) -> fmt::Result {
    let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
    writeln!(f, "{i}: {}", cells.join(", "))
}

fn coerce_and_encode(column: &mut Column, raw: &Value, row: usize) -> DatasetResult<Value> {
    let value = (column.coercer())(raw).map_err(|message| DatasetError::Coercion {
        row,
        column: column.name().to_string(),
        raw: raw.to_string(),
        message,
    })?;
    Ok(match column.encoder_mut() {
        Some(encoder) => Value::Number(encoder.get_encoded(&value) as f64),
        None => value,
    })
}

fn coerce_all<'a>(
    coercer: &Coercer,
    column: &str,
    values: impl Iterator<Item = &'a Value>,
) -> DatasetResult<Vec<Value>> {
    values
        .enumerate()
        .map(|(row, raw)| {
            coercer(raw).map_err(|message| DatasetError::Coercion {
                row,
                column: column.to_string(),
                raw: raw.to_string(),
                message,
            })
        })
        .collect()
}

fn encode_in_place<'a>(encoder: &mut LabelEncoder, cells: impl Iterator<Item = &'a mut Value>) {
    for cell in cells {
        *cell = Value::Number(encoder.get_encoded(cell) as f64);
    }
}

fn encoder_of(column: &Column) -> DatasetResult<&LabelEncoder> {
    column.encoder().ok_or_else(|| DatasetError::NotEncoded {
        column: column.name().to_string(),
    })
}

/// Read a cell as a label code. Codes are stored as non-negative integral numbers.
fn code_of(column: &str, cell: &Value) -> DatasetResult<usize> {
    let invalid = || DatasetError::InvalidCode {
        column: column.to_string(),
        raw: cell.to_string(),
    };
    match cell {
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
        Value::BigInt(i) => usize::try_from(*i).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn decode_value(column: &str, encoder: &LabelEncoder, cell: &Value) -> DatasetResult<Value> {
    encoder.get_decoded(code_of(column, cell)?).cloned()
}
