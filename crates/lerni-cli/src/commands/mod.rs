pub mod concept;
pub mod dispatch;
pub mod notify;
pub mod question;
pub mod review;
pub mod shared;
pub mod today;
