//! Page handlers module

pub mod account;
pub mod article;
pub mod category;
pub mod health;
pub mod home;
pub mod search;
