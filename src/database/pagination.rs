use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// Query string accepted by paginated list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    #[serde(alias = "per_page", alias = "limit")]
    pub per_page: Option<u32>,
}

/// Normalized page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn from_query(query: &ListQuery, api: &ApiConfig) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size.max(1));
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { page, per_page, search }
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * (self.per_page as i64)
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    /// `ILIKE` pattern, or `None` to match everything.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        let total_pages = ((total.max(0) as f64) / (request.per_page as f64)).ceil() as u32;
        Self {
            items,
            pagination: Pagination {
                page: request.page,
                per_page: request.per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn api() -> ApiConfig {
        AppConfig::development().api
    }

    #[test]
    fn defaults_and_clamping() {
        let req = PageRequest::from_query(&ListQuery::default(), &api());
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 20);
        assert_eq!(req.offset(), 0);

        let query = ListQuery { page: Some(0), per_page: Some(10_000), search: None };
        let req = PageRequest::from_query(&query, &api());
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 200);

        let query = ListQuery { page: Some(3), per_page: Some(25), search: None };
        assert_eq!(PageRequest::from_query(&query, &api()).offset(), 50);
    }

    #[test]
    fn search_is_trimmed_and_escaped() {
        let query = ListQuery { search: Some("  50%_off ".into()), ..Default::default() };
        let req = PageRequest::from_query(&query, &api());
        assert_eq!(req.search_pattern().as_deref(), Some("%50\\%\\_off%"));

        let blank = ListQuery { search: Some("   ".into()), ..Default::default() };
        assert_eq!(PageRequest::from_query(&blank, &api()).search_pattern(), None);
    }

    #[test]
    fn query_accepts_both_spellings() {
        let q: ListQuery = serde_json::from_str(r#"{"perPage":5}"#).unwrap();
        assert_eq!(q.per_page, Some(5));
        let q: ListQuery = serde_json::from_str(r#"{"per_page":7,"page":2}"#).unwrap();
        assert_eq!(q.per_page, Some(7));
        assert_eq!(q.page, Some(2));
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest { page: 1, per_page: 20, search: None };
        let page = Paginated::new(vec![1, 2, 3], &req, 41);
        assert_eq!(page.pagination.total_pages, 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pagination"]["perPage"], 20);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}
