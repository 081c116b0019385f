//! List-query filters.
//!
//! Raw query-string parameters are normalized once into a [`FilterSpec`] by
//! [`build_filter`], then rendered against a static [`ColumnMap`] into a SQL
//! tail (`WHERE … ORDER BY … LIMIT … OFFSET …`) plus an ordered table of bind
//! values. User input only ever reaches the database through bound
//! parameters; the fragment holds nothing but column names from the map,
//! operators, and `$n` placeholders.

use std::collections::{BTreeMap, HashMap};

use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use uuid::Uuid;

use crate::models::user::Role;

pub mod maps;

/// Page size used when `limit` is absent or unusable.
pub const DEFAULT_LIMIT: u32 = 5;

/// Query parameter carrying the sort direction.
pub const SORT_PARAM: &str = "createdAt";
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// Every list is ordered by creation time.
const ORDER_COLUMN: &str = "created_at";

/// Sort direction over the creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Accepts exactly `asc` or `desc`. Anything else is unset.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// How a column is compared with its filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `column = $n`
    Exact,
    /// `column LIKE 'value%'`
    Prefix,
    /// `column ILIKE '%value%'`
    Substring,
}

/// How a raw parameter is parsed before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any non-empty string.
    Text,
    /// ASCII digits only.
    Digits,
    /// Digits with an optional leading `+`, which is dropped.
    Phone,
    Uuid,
    /// `it` / `nurse`, bound as the `is_it` flag.
    Role,
}

/// One filterable column: where its value comes from and how it is matched.
#[derive(Debug, Clone, Copy)]
pub struct ColumnFilter {
    pub param: &'static str,
    pub column: &'static str,
    pub matching: MatchKind,
    pub value: ValueKind,
}

/// Fixed, per-entity table of filterable columns. Predicates render in table
/// order.
pub type ColumnMap = &'static [ColumnFilter];

/// A typed value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Uuid(Uuid),
    Bool(bool),
    Int(i64),
}

/// Normalized filter for one list query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    values: BTreeMap<&'static str, BindValue>,
    pub sort: Option<SortDirection>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl FilterSpec {
    /// Set the predicate value for `column`.
    pub fn set(&mut self, column: &'static str, value: BindValue) {
        self.values.insert(column, value);
    }

    pub fn value(&self, column: &str) -> Option<&BindValue> {
        self.values.get(column)
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn effective_sort(&self) -> SortDirection {
        self.sort.unwrap_or_default()
    }
}

/// A named entry in the rendered parameter table. `name` is the column the
/// value filters on, or `limit` / `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: &'static str,
    pub value: BindValue,
}

/// SQL tail plus its bind values; `params[i]` binds `$(i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    pub fragment: String,
    pub params: Vec<QueryParam>,
}

/// Normalize raw query parameters against `columns`. Total: values that do
/// not parse are left unset rather than rejected.
pub fn build_filter(raw: &HashMap<String, String>, columns: ColumnMap) -> FilterSpec {
    let mut spec = FilterSpec::default();

    for filter in columns {
        let Some(input) = raw.get(filter.param) else {
            continue;
        };
        if let Some(value) = parse_value(input, filter.value) {
            spec.set(filter.column, value);
        }
    }

    spec.sort = SortDirection::normalize(raw.get(SORT_PARAM).map(String::as_str));
    spec.limit = raw
        .get(LIMIT_PARAM)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0);
    spec.offset = raw
        .get(OFFSET_PARAM)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);

    spec
}

fn parse_value(input: &str, kind: ValueKind) -> Option<BindValue> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match kind {
        ValueKind::Text => Some(BindValue::Text(input.to_string())),
        ValueKind::Digits => all_digits(input).then(|| BindValue::Text(input.to_string())),
        ValueKind::Phone => {
            let digits = input.strip_prefix('+').unwrap_or(input);
            all_digits(digits).then(|| BindValue::Text(digits.to_string()))
        }
        ValueKind::Uuid => Uuid::parse_str(input).ok().map(BindValue::Uuid),
        ValueKind::Role => Role::parse_loose(input).map(|r| BindValue::Bool(r == Role::It)),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Render `spec` against `columns`. Deterministic: equal inputs give
/// byte-identical output.
pub fn render(spec: &FilterSpec, columns: ColumnMap) -> RenderedQuery {
    let mut predicates = Vec::new();
    let mut params = Vec::new();

    for filter in columns {
        let Some(value) = spec.value(filter.column) else {
            continue;
        };
        let n = params.len() + 1;
        let (predicate, bound) = match (filter.matching, value) {
            (MatchKind::Prefix, BindValue::Text(s)) => (
                format!("{} LIKE ${n}", filter.column),
                BindValue::Text(format!("{}%", escape_like(s))),
            ),
            (MatchKind::Substring, BindValue::Text(s)) => (
                format!("{} ILIKE ${n}", filter.column),
                BindValue::Text(format!("%{}%", escape_like(s))),
            ),
            _ => (format!("{} = ${n}", filter.column), value.clone()),
        };
        predicates.push(predicate);
        params.push(QueryParam {
            name: filter.column,
            value: bound,
        });
    }

    let mut fragment = String::new();
    if !predicates.is_empty() {
        fragment.push_str(" WHERE ");
        fragment.push_str(&predicates.join(" AND "));
    }

    fragment.push_str(&format!(
        " ORDER BY {ORDER_COLUMN} {}",
        spec.effective_sort().as_sql()
    ));

    params.push(QueryParam {
        name: LIMIT_PARAM,
        value: BindValue::Int(i64::from(spec.effective_limit())),
    });
    fragment.push_str(&format!(" LIMIT ${}", params.len()));

    if spec.offset > 0 {
        params.push(QueryParam {
            name: OFFSET_PARAM,
            value: BindValue::Int(i64::from(spec.offset)),
        });
        fragment.push_str(&format!(" OFFSET ${}", params.len()));
    }

    RenderedQuery { fragment, params }
}

/// Bind a rendered parameter table onto a query, in placeholder order.
pub fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[QueryParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match &param.value {
            BindValue::Text(v) => query.bind(v.clone()),
            BindValue::Uuid(v) => query.bind(*v),
            BindValue::Bool(v) => query.bind(*v),
            BindValue::Int(v) => query.bind(*v),
        };
    }
    query
}

/// Escape `LIKE` wildcards so user input only matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
