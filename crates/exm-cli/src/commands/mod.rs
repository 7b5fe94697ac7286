pub mod ai;
pub mod auth;
pub mod dispatch;
pub mod exam;
pub mod goal;
pub mod page;
pub mod question;
pub mod shared;
pub mod upload;
