//! Forum models

pub mod comment;
pub mod identity;
pub mod post;
pub mod topic;
pub mod user;

// Re-export for convenience
pub use comment::{Comment, CommentInput, CommentUpdate, NewComment};
pub use identity::AuthenticatedUser;
pub use post::{NewPost, Post, PostInput, PostUpdate};
pub use topic::{NewTopic, Topic, TopicInput};
pub use user::{NewUser, User, UserProfile};
