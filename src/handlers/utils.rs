// handlers/utils.rs - request parsing helpers shared by every handler tier

use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Permission, PermissionSet};
use crate::error::ApiError;

/// `?id=` query used by the delete endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn require(&self) -> Result<Uuid, ApiError> {
        match non_empty(&self.id) {
            Some(raw) => parse_uuid("id", raw),
            None => Err(ApiError::missing_fields(&["id"])),
        }
    }
}

pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::field(field, "Must be a valid UUID"))
}

/// Empty strings coming from admin forms count as "not provided".
pub fn optional_uuid(field: &str, raw: &Option<String>) -> Result<Option<Uuid>, ApiError> {
    non_empty(raw).map(|s| parse_uuid(field, s)).transpose()
}

pub fn uuid_list(field: &str, raw: &[String]) -> Result<Vec<Uuid>, ApiError> {
    raw.iter().map(|s| parse_uuid(field, s)).collect()
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Permission strings arriving in a request body. Unlike stored values,
/// unknown names are rejected rather than dropped.
pub fn parse_permissions(raw: &[String]) -> Result<PermissionSet, ApiError> {
    raw.iter()
        .map(|s| s.parse::<Permission>())
        .collect::<Result<PermissionSet, _>>()
        .map_err(|e| ApiError::field("permissions", e.to_string()))
}

/// Collects missing required fields so they are reported together.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: &'static str, value: &Option<String>) -> Self {
        if non_empty(value).is_none() {
            self.missing.push(field);
        }
        self
    }

    pub fn present<T>(mut self, field: &'static str, value: &Option<T>) -> Self {
        if value.is_none() {
            self.missing.push(field);
        }
        self
    }

    pub fn check(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing_fields(&self.missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_reports_every_missing_field() {
        let err = Required::new()
            .text("name", &Some("  ".to_string()))
            .text("description", &Some("Lamp".to_string()))
            .present::<u32>("price", &None)
            .check()
            .unwrap_err();

        let body = err.to_json();
        assert!(body["field_errors"].get("name").is_some());
        assert!(body["field_errors"].get("price").is_some());
        assert!(body["field_errors"].get("description").is_none());
    }

    #[test]
    fn id_query_requires_valid_uuid() {
        assert_eq!(IdQuery::default().require().unwrap_err().status_code(), 400);
        let bad = IdQuery { id: Some("42".into()) };
        assert_eq!(bad.require().unwrap_err().status_code(), 400);
        let id = Uuid::new_v4();
        let good = IdQuery { id: Some(id.to_string()) };
        assert_eq!(good.require().unwrap(), id);
    }

    #[test]
    fn blank_optional_uuid_is_none() {
        assert_eq!(optional_uuid("categoryId", &Some(String::new())).unwrap(), None);
        assert!(optional_uuid("categoryId", &Some("nope".into())).is_err());
    }

    #[test]
    fn request_permissions_reject_unknown_names() {
        let set = parse_permissions(&["manage_orders".into(), "manage_buyers".into()]).unwrap();
        assert!(set.contains(Permission::ManageOrders));
        assert!(parse_permissions(&["launch_rockets".into()]).is_err());
    }
}
