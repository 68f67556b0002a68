use thiserror::Error;

use crate::database::repository::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SortError {
    #[error("Cannot sort by unknown field: {0}")]
    UnknownField(String),

    #[error("Sort direction without a field: {0}")]
    MissingField(String),
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }

    /// Parse a `sort` query value such as `id,desc` or `name,email,asc`.
    ///
    /// A trailing direction applies to every field listed before it; fields
    /// without one sort ascending.
    pub fn parse(value: &str) -> Result<Vec<SortOrder>, SortError> {
        let mut out = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match SortDirection::parse(token) {
                Some(direction) => {
                    if pending.is_empty() {
                        return Err(SortError::MissingField(token.to_string()));
                    }
                    out.extend(pending.drain(..).map(|field| SortOrder { field, direction }));
                }
                None => pending.push(token.to_string()),
            }
        }
        out.extend(pending.into_iter().map(SortOrder::asc));
        Ok(out)
    }

    /// Parse each `sort` value in turn and check every field against what
    /// `T` allows sorting on. Later values break ties left by earlier ones.
    pub fn parse_for<T: Document>(values: &[String]) -> Result<Vec<SortOrder>, SortError> {
        let mut orders = Vec::new();
        for value in values {
            orders.extend(Self::parse(value)?);
        }
        if let Some(bad) = orders.iter().find(|o| !T::SORTABLE.contains(&o.field.as_str())) {
            return Err(SortError::UnknownField(bad.field.clone()));
        }
        Ok(orders)
    }
}
