//! Domain services
//!
//! Every mutation follows the same protocol: validate, open a
//! [`common::TransactionScope`], make exactly one repository call, then commit
//! on success or roll back on failure. Reads go straight to the repository.

pub mod comments;
pub mod credentials;
pub mod error;
pub mod posts;
pub mod topics;
pub mod users;

pub use comments::{CommentService, CommentServiceImpl};
pub use credentials::{CredentialService, CredentialServiceImpl};
pub use error::ServiceError;
pub use posts::{PostService, PostServiceImpl};
pub use topics::{TopicService, TopicServiceImpl};
pub use users::{UserService, UserServiceImpl};
