pub mod buyer;
pub mod catalog;
pub mod order;
pub mod promotion;
pub mod role;
pub mod tenant;
pub mod user;

pub use buyer::Buyer;
pub use catalog::{Attribute, AttributeValue, Category, Product};
pub use order::{Order, OrderDetail, OrderItem, OrderStatus};
pub use promotion::{Coupon, CouponRejection, CouponType, DiscountScope, GlobalDiscount};
pub use role::Role;
pub use tenant::Tenant;
pub use user::StaffUser;
