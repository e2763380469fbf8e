pub mod migrate;
pub mod password;
pub mod superadmin;
pub mod tenant;
