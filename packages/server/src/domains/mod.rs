// Business domains
pub mod accounts;
pub mod admin;
pub mod auth;
pub mod bot;
pub mod catalog;
