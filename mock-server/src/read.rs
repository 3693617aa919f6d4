//! A parsed GET: filters, ordering, paging and column projection.

use std::cmp::Ordering;

use serde_json::Value;

use crate::error::MockError;
use crate::filter::{cell_text, compare_text, Condition, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub descending: bool,
    pub nulls_first: bool,
}

impl OrderTerm {
    /// `col`, `col.asc`, `col.desc`, optionally `.nullsfirst` / `.nullslast`.
    /// Defaults follow PostgreSQL: NULLs sort as larger than any value.
    fn parse(term: &str) -> Result<Self, MockError> {
        let mut parts = term.trim().split('.');
        let column = parts
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| MockError::MalformedFilter(format!("order {term:?}")))?;
        let mut descending = false;
        let mut nulls = None;
        for modifier in parts {
            match modifier {
                "asc" => descending = false,
                "desc" => descending = true,
                "nullsfirst" => nulls = Some(true),
                "nullslast" => nulls = Some(false),
                other => {
                    return Err(MockError::MalformedFilter(format!("order modifier {other:?}")))
                }
            }
        }
        Ok(Self {
            column: column.to_string(),
            descending,
            nulls_first: nulls.unwrap_or(descending),
        })
    }

    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let a = a.get(&self.column).and_then(cell_text);
        let b = b.get(&self.column).and_then(cell_text);
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) if self.nulls_first => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) if self.nulls_first => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_text(&x, &y);
                if self.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ReadRequest {
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderTerm>,
    pub select: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Rows after filtering and paging, plus the pre-paging total.
#[derive(Debug)]
pub struct ReadResult {
    pub rows: Vec<Value>,
    pub offset: usize,
    pub total: usize,
}

impl ReadResult {
    /// `Content-Range` value; the total is `*` unless an exact count was asked for.
    pub fn content_range(&self, exact: bool) -> String {
        let total = if exact {
            self.total.to_string()
        } else {
            "*".to_string()
        };
        if self.rows.is_empty() {
            format!("*/{total}")
        } else {
            format!("{}-{}/{total}", self.offset, self.offset + self.rows.len() - 1)
        }
    }
}

impl ReadRequest {
    pub fn parse(params: &[(String, String)]) -> Result<Self, MockError> {
        let mut request = ReadRequest::default();
        for (key, value) in params {
            match key.as_str() {
                "select" => {
                    let columns: Vec<String> = value
                        .split(',')
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .collect();
                    if !columns.iter().any(|c| c == "*") {
                        request.select = Some(columns);
                    }
                }
                "order" => {
                    request.order = value
                        .split(',')
                        .map(OrderTerm::parse)
                        .collect::<Result<_, _>>()?;
                }
                "limit" => request.limit = Some(parse_number(key, value)?),
                "offset" => request.offset = parse_number(key, value)?,
                "or" => request.conditions.push(Condition::group(true, value)?),
                "and" => request.conditions.push(Condition::group(false, value)?),
                column => request.conditions.push(Condition::column(column, value)?),
            }
        }
        Ok(request)
    }

    pub fn execute(&self, rows: &[Row]) -> ReadResult {
        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| self.conditions.iter().all(|c| c.matches(row)))
            .collect();
        let total = matched.len();

        matched.sort_by(|a, b| {
            self.order
                .iter()
                .map(|term| term.compare(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let rows = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|row| self.project(row))
            .collect();

        ReadResult {
            rows,
            offset: self.offset,
            total,
        }
    }

    fn project(&self, row: &Row) -> Value {
        match &self.select {
            None => Value::Object(row.clone()),
            Some(columns) => Value::Object(
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect(),
            ),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, MockError> {
    value
        .parse()
        .map_err(|_| MockError::MalformedFilter(format!("{key}={value}")))
}
