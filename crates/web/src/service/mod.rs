//! The core request workflows: article retrieval and comment submission

pub mod article;
pub mod comment;
