pub mod now;
pub mod posts;
pub mod projects;
pub mod uses;
