pub mod borrow_request;
pub mod component;
pub mod user;
