use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Column holding the entity key of every row.
pub const PLAYER_COLUMN: &str = "player";
/// Column holding the team of every row.
pub const TEAM_COLUMN: &str = "team";
pub const POSITION_COLUMN: &str = "position";
/// Raw ages look like `"27-141"` (years-days); only the leading number is kept.
pub const AGE_COLUMN: &str = "age";

// ---------------------------------------------------------------------------
// Value – a single cell of a player table
// ---------------------------------------------------------------------------

/// A dynamically-typed table value mirroring common Pandas dtypes.
/// Used in `BTreeSet`s downstream, so `Value` must be `Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so Value can live in a BTreeSet and floats compare totally --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

/// Truncate an age value to its leading numeric prefix.
///
/// `"27-141"` becomes `Integer(27)`, `"31.5y"` becomes `Float(31.5)` and a
/// string without a numeric prefix becomes `Null`. Numbers pass through.
pub fn coerce_age(value: &Value) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    let raw = raw.trim();
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Value::Null;
    }
    let rest = &raw[digits..];
    let fraction = rest
        .strip_prefix('.')
        .map(|r| r.bytes().take_while(u8::is_ascii_digit).count())
        .unwrap_or(0);
    if fraction > 0 {
        raw[..digits + 1 + fraction]
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Null)
    } else {
        raw[..digits]
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Columns and rows
// ---------------------------------------------------------------------------

/// Semantic type inferred for a column once the table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One player row: column name → value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub values: BTreeMap<String, Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// The entity key of this row.
    pub fn player(&self) -> Option<&str> {
        self.text(PLAYER_COLUMN)
    }
}

// ---------------------------------------------------------------------------
// Dataset – one named player table
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("table '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: &'static str },
}

/// A loaded player table with cleaned values and inferred column types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub id: String,
    /// Columns in source order.
    pub columns: Vec<Column>,
    /// Rows in source order; row indices are the tie-breaker for rankings.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from raw rows, coercing `age` and inferring column kinds.
    pub fn from_rows(
        id: impl Into<String>,
        column_names: Vec<String>,
        mut rows: Vec<Row>,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        for required in [PLAYER_COLUMN, TEAM_COLUMN] {
            if !column_names.iter().any(|c| c == required) {
                return Err(SchemaError::MissingColumn {
                    table: id,
                    column: required,
                });
            }
        }

        if column_names.iter().any(|c| c == AGE_COLUMN) {
            for row in &mut rows {
                if let Some(age) = row.values.get_mut(AGE_COLUMN) {
                    *age = coerce_age(age);
                }
            }
        }

        let columns = column_names
            .into_iter()
            .map(|name| {
                let kind = infer_kind(&rows, &name);
                Column { name, kind }
            })
            .collect();

        Ok(Dataset { id, columns, rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.column(name)
            .is_some_and(|c| c.kind == ColumnKind::Numeric)
    }

    /// Names of all numeric columns, in source order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Sorted set of distinct non-null values of a column.
    pub fn unique_values(&self, column: &str) -> BTreeSet<Value> {
        self.rows
            .iter()
            .filter_map(|r| r.get(column))
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Copy of the dataset restricted to the given row indices, in that order.
    /// Column kinds are kept as inferred on the full table.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            id: self.id.clone(),
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// First row belonging to `player`.
    pub fn find_player(&self, player: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.player() == Some(player))
    }
}

/// A column is numeric when it has at least one value and every non-null
/// value is an integer or a float.
fn infer_kind(rows: &[Row], column: &str) -> ColumnKind {
    let mut seen = false;
    for value in rows.iter().filter_map(|r| r.get(column)) {
        if value.is_null() {
            continue;
        }
        if !value.is_numeric() {
            return ColumnKind::Categorical;
        }
        seen = true;
    }
    if seen {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}
