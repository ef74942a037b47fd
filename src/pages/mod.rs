//! Settings Pages

mod user_management;

pub use user_management::UserManagementPage;
