//! SeaORM entity models
//!
//! Database entities for NewsHub

mod article;
mod comment;
mod session;
mod user;

pub use article::{
    ActiveModel as ArticleActiveModel, Column as ArticleColumn, Entity as ArticleEntity,
    Model as Article,
};

pub use comment::{
    ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as CommentEntity,
    Model as Comment,
};

pub use user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, Model as User,
};

pub use session::{
    ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as SessionEntity,
    Model as SessionRow,
};
