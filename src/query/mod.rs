pub mod extract;

pub use extract::ListParams;

/// Direction token of a sort descriptor. `ASC` in any casing sorts
/// ascending; any other token sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// `sort = (fieldName, direction)`; the field is validated against the
/// entity's allow-list at query-build time, not here.
#[derive(Debug, Clone)]
pub struct SortParam {
    pub field: String,
    pub direction: SortDirection,
}

impl SortParam {
    pub fn from_tokens(tokens: &[String]) -> Result<Self, String> {
        match tokens {
            [field, direction] => Ok(Self {
                field: field.clone(),
                direction: SortDirection::from_token(direction),
            }),
            _ => Err(format!(
                "sort expects exactly two values (field, direction), got {}",
                tokens.len()
            )),
        }
    }
}

/// `range = (offset, limit)`; absent means "no paging, return all"
#[derive(Debug, Clone, Copy)]
pub struct RangeParam {
    pub offset: i64,
    pub limit: i64,
}

impl RangeParam {
    pub fn from_tokens(tokens: &[String]) -> Result<Self, String> {
        let [offset, limit] = tokens else {
            return Err(format!(
                "range expects exactly two values (offset, limit), got {}",
                tokens.len()
            ));
        };
        let offset: i64 = offset
            .parse()
            .map_err(|_| format!("range offset is not an integer: '{}'", offset))?;
        let limit: i64 = limit
            .parse()
            .map_err(|_| format!("range limit is not an integer: '{}'", limit))?;
        if offset < 0 || limit < 0 {
            return Err("range values must be non-negative".to_string());
        }
        Ok(Self { offset, limit })
    }
}
