//! OData query building
//!
//! Only the subset of `$filter` the ERP services are queried with:
//! `eq`, `ge`, `le` against single-quoted string literals, combined with
//! `and` / `or`.

/// A `$filter` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(String);

impl Filter {
    /// `field eq 'value'`
    pub fn eq(field: &str, value: &str) -> Self {
        Self(format!("{field} eq {}", literal(value)))
    }

    /// `field ge 'start' and field le 'end'`
    pub fn between(field: &str, start: &str, end: &str) -> Self {
        Self(format!(
            "{field} ge {} and {field} le {}",
            literal(start),
            literal(end)
        ))
    }

    /// `field eq 'a' or field eq 'b' or ...`
    pub fn any_of<'a>(field: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let terms: Vec<String> = values
            .into_iter()
            .map(|v| format!("{field} eq {}", literal(v)))
            .collect();
        Self(terms.join(" or "))
    }

    /// Conjunction of clauses, each parenthesised
    pub fn all(clauses: impl IntoIterator<Item = Filter>) -> Self {
        let parts: Vec<String> = clauses
            .into_iter()
            .filter(|c| !c.0.is_empty())
            .map(|c| format!("({})", c.0))
            .collect();
        Self(parts.join(" and "))
    }

    /// Append one more clause to a conjunction
    pub fn and(self, clause: Filter) -> Self {
        if self.0.is_empty() {
            return Self::all([clause]);
        }
        Self(format!("{} and ({})", self.0, clause.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-quoted OData string literal; embedded quotes are doubled
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Query options for one entity-set read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    filter: Option<Filter>,
    select: Vec<String>,
    top: Option<u32>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn select<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.select = fields.into_iter().map(str::to_string).collect();
        self
    }

    /// Page-size hint; overrides the client default
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn filter_expr(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn selected(&self) -> &[String] {
        &self.select
    }

    pub fn top_hint(&self) -> Option<u32> {
        self.top
    }

    /// Query-string parameters for the first page request
    pub fn params(&self, default_top: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(filter) = &self.filter {
            params.push(("$filter", filter.to_string()));
        }
        if !self.select.is_empty() {
            params.push(("$select", self.select.join(",")));
        }
        params.push(("$format", "json".to_string()));
        params.push(("$top", self.top.unwrap_or(default_top).to_string()));
        params
    }
}
