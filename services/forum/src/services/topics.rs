//! Topic service

use async_trait::async_trait;
use common::{TransactionProvider, TransactionScope};
use tracing::info;
use uuid::Uuid;

use super::error::{Entity, ServiceError, ServiceResult, map_storage_error};
use crate::models::{AuthenticatedUser, NewTopic, Topic, TopicInput};
use crate::repositories::TopicRepository;
use crate::validation::{MAX_TOPIC_NAME_LENGTH, validate_required};

#[async_trait]
pub trait TopicService: Send + Sync {
    async fn list(&self) -> ServiceResult<Vec<Topic>>;

    async fn create(&self, identity: &AuthenticatedUser, input: TopicInput)
    -> ServiceResult<Topic>;

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: TopicInput,
    ) -> ServiceResult<Topic>;

    /// Delete a topic together with its posts and their comments
    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Topic>;
}

fn validate(input: &TopicInput) -> ServiceResult<()> {
    validate_required("Topic name", &input.name, Some(MAX_TOPIC_NAME_LENGTH))
        .map_err(ServiceError::Validation)
}

pub struct TopicServiceImpl<D, R> {
    db: D,
    topics: R,
}

impl<D, R> TopicServiceImpl<D, R> {
    pub fn new(db: D, topics: R) -> Self {
        Self { db, topics }
    }
}

#[async_trait]
impl<D, R> TopicService for TopicServiceImpl<D, R>
where
    D: TransactionProvider,
    R: TopicRepository<D::Tx>,
{
    async fn list(&self) -> ServiceResult<Vec<Topic>> {
        self.topics
            .list()
            .await
            .map_err(|e| map_storage_error(Entity::Topic, e))
    }

    async fn create(
        &self,
        identity: &AuthenticatedUser,
        input: TopicInput,
    ) -> ServiceResult<Topic> {
        validate(&input)?;

        let new_topic = NewTopic {
            user_id: identity.user_id,
            username: identity.username.clone(),
            name: input.name,
            description: input.description,
        };

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .topics
            .create(scope.handle(), &new_topic)
            .await
            .map_err(|e| map_storage_error(Entity::Topic, e));
        let topic = scope.finish(outcome).await?;

        info!(topic_id = %topic.id, user_id = %identity.user_id, "Topic created");
        Ok(topic)
    }

    async fn update(
        &self,
        identity: &AuthenticatedUser,
        id: Uuid,
        input: TopicInput,
    ) -> ServiceResult<Topic> {
        validate(&input)?;

        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .topics
            .update(scope.handle(), id, identity.user_id, &input)
            .await
            .map_err(|e| map_storage_error(Entity::Topic, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Topic)));
        scope.finish(outcome).await
    }

    async fn delete(&self, identity: &AuthenticatedUser, id: Uuid) -> ServiceResult<Topic> {
        let mut scope = TransactionScope::begin(&self.db).await?;
        let outcome = self
            .topics
            .delete(scope.handle(), id, identity.user_id)
            .await
            .map_err(|e| map_storage_error(Entity::Topic, e))
            .and_then(|row| row.ok_or(ServiceError::NotFound(Entity::Topic)));
        let topic = scope.finish(outcome).await?;

        info!(topic_id = %topic.id, user_id = %identity.user_id, "Topic deleted");
        Ok(topic)
    }
}
