pub mod auth;
pub mod draft;
pub mod fetch;
pub mod report;
pub mod tool;
