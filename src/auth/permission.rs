use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Capabilities a route family can require. Persisted as free-form strings,
/// mapped onto this closed set when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageProducts,
    ManageCategories,
    ManageAttributes,
    ManageAttributeValues,
    ManageDiscounts,
    ManageVouchers,
    ManageCoupons,
    ManageOrders,
    ManageBuyers,
    ManageLoyaltyProgram,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
        Permission::ManageProducts,
        Permission::ManageCategories,
        Permission::ManageAttributes,
        Permission::ManageAttributeValues,
        Permission::ManageDiscounts,
        Permission::ManageVouchers,
        Permission::ManageCoupons,
        Permission::ManageOrders,
        Permission::ManageBuyers,
        Permission::ManageLoyaltyProgram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageProducts => "manage_products",
            Permission::ManageCategories => "manage_categories",
            Permission::ManageAttributes => "manage_attributes",
            Permission::ManageAttributeValues => "manage_attribute_values",
            Permission::ManageDiscounts => "manage_discounts",
            Permission::ManageVouchers => "manage_vouchers",
            Permission::ManageCoupons => "manage_coupons",
            Permission::ManageOrders => "manage_orders",
            Permission::ManageBuyers => "manage_buyers",
            Permission::ManageLoyaltyProgram => "manage_loyalty_program",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPermission(pub String);

impl fmt::Display for UnknownPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown permission '{}'", self.0)
    }
}

impl std::error::Error for UnknownPermission {}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Ordered, de-duplicated set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map stored strings onto the closed vocabulary. Unknown entries are
    /// logged and dropped rather than failing the caller.
    pub fn from_stored<S: AsRef<str>>(stored: &[S]) -> Self {
        let mut set = BTreeSet::new();
        for raw in stored {
            match raw.as_ref().parse::<Permission>() {
                Ok(p) => {
                    set.insert(p);
                }
                Err(e) => tracing::warn!("Ignoring stored permission: {}", e),
            }
        }
        Self(set)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn union(mut self, other: &PermissionSet) -> Self {
        self.0.extend(other.0.iter().copied());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Permission> {
        self.iter().collect()
    }

    /// Strings as written to the persistence layer.
    pub fn to_stored(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_vocabulary_entry() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&Permission::ManageAttributeValues).unwrap();
        assert_eq!(json, "\"manage_attribute_values\"");
        let back: Permission = serde_json::from_str("\"manage_loyalty_program\"").unwrap();
        assert_eq!(back, Permission::ManageLoyaltyProgram);
    }

    #[test]
    fn from_stored_drops_typos() {
        let set = PermissionSet::from_stored(&["manage_products", "manage_prodcuts", "manage_orders"]);
        assert_eq!(set.to_vec(), vec![Permission::ManageProducts, Permission::ManageOrders]);
    }

    #[test]
    fn union_deduplicates() {
        let a = PermissionSet::from_iter([Permission::ManageProducts, Permission::ManageOrders]);
        let b = PermissionSet::from_iter([Permission::ManageOrders, Permission::ManageBuyers]);
        let merged = a.union(&b);
        assert_eq!(
            merged.to_stored(),
            vec!["manage_products", "manage_orders", "manage_buyers"]
        );
    }
}
