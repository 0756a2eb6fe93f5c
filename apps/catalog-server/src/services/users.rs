//! User and friendship aggregation service.

use std::collections::BTreeSet;
use std::sync::Arc;

use catalog_store::CatalogStore;
use entities::{FriendStatus, User, UserInput, Validate};

use crate::error::{ServerError, ServerResult};

/// User operations, including the friendship state machine.
///
/// A friendship row is directed: `add_friend(a, b)` records `a -> b` only.
/// New requests are accepted immediately, so the only transitions are
/// none -> CONFIRMED on add and CONFIRMED -> none on delete.
#[derive(Debug)]
pub struct UserService<S> {
    store: Arc<S>,
}

impl<S> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore> UserService<S> {
    /// Creates a new user service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validates and stores a new user.
    ///
    /// Friendship statuses in the payload are discarded; they are only ever
    /// written through `add_friend` and `delete_friend`.
    pub async fn create_user(&self, input: UserInput) -> ServerResult<User> {
        input.validate()?;

        let mut user = input.into_user();
        user.friend_statuses.clear();

        let user = self.store.create_user(user).await?;

        tracing::info!(user_id = user.id, login = %user.login, "User created");

        Ok(user)
    }

    /// Validates and updates an existing user, keeping their friendships.
    pub async fn update_user(&self, input: UserInput) -> ServerResult<User> {
        input.validate()?;

        let id = input
            .id
            .ok_or_else(|| ServerError::InvalidRequest("user id must be specified".to_string()))?;
        let user = self.store.update_user(input.into_user()).await?;

        tracing::info!(user_id = id, "User updated");

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_user(&self, id: i64) -> ServerResult<User> {
        Ok(self.store.get_user(id).await?)
    }

    /// Lists all users.
    pub async fn list_users(&self) -> ServerResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Deletes a user.
    pub async fn delete_user(&self, id: i64) -> ServerResult<()> {
        self.store.delete_user(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Deletes every user.
    pub async fn delete_all_users(&self) -> ServerResult<()> {
        self.store.delete_all_users().await?;
        tracing::info!("All users deleted");
        Ok(())
    }

    /// Befriends `friend_id` on behalf of `id`.
    pub async fn add_friend(&self, id: i64, friend_id: i64) -> ServerResult<()> {
        check_distinct(id, friend_id)?;
        self.store.get_user(id).await?;
        self.store.get_user(friend_id).await?;

        let statuses = self.store.friend_statuses(id).await?;
        if let Some(status) = statuses.get(&friend_id) {
            return Err(ServerError::IncorrectId(match status {
                FriendStatus::Unconfirmed => {
                    format!("user {friend_id} has not yet answered the request from user {id}")
                }
                FriendStatus::Confirmed => {
                    format!("user {id} is already a friend of user {friend_id}")
                }
                FriendStatus::Rejected => {
                    format!("user {friend_id} has already rejected the request from user {id}")
                }
            }));
        }

        self.store
            .set_friend_status(id, friend_id, FriendStatus::Confirmed)
            .await?;

        tracing::info!(user_id = id, friend_id, "Friend added");

        Ok(())
    }

    /// Ends a confirmed friendship, removing both directions.
    pub async fn delete_friend(&self, id: i64, friend_id: i64) -> ServerResult<()> {
        check_distinct(id, friend_id)?;
        self.store.get_user(id).await?;
        self.store.get_user(friend_id).await?;

        let statuses = self.store.friend_statuses(id).await?;
        if statuses.get(&friend_id) != Some(&FriendStatus::Confirmed) {
            return Err(ServerError::IncorrectId(format!(
                "user {friend_id} is not a friend of user {id}"
            )));
        }

        self.store.clear_friendship(id, friend_id).await?;

        tracing::info!(user_id = id, friend_id, "Friend removed");

        Ok(())
    }

    /// Lists the users `id` has befriended.
    pub async fn friends(&self, id: i64) -> ServerResult<Vec<User>> {
        let user = self.store.get_user(id).await?;
        let friend_ids: Vec<i64> = user.confirmed_friend_ids().collect();
        if friend_ids.is_empty() {
            return Err(ServerError::IncorrectId(format!("user {id} has no friends")));
        }
        self.resolve(friend_ids).await
    }

    /// Lists users befriended by both `id` and `other_id`.
    pub async fn common_friends(&self, id: i64, other_id: i64) -> ServerResult<Vec<User>> {
        check_distinct(id, other_id)?;
        let user = self.store.get_user(id).await?;
        let other = self.store.get_user(other_id).await?;

        let mine: BTreeSet<i64> = user.confirmed_friend_ids().collect();
        let theirs: BTreeSet<i64> = other.confirmed_friend_ids().collect();
        self.resolve(mine.intersection(&theirs).copied()).await
    }

    async fn resolve(&self, ids: impl IntoIterator<Item = i64>) -> ServerResult<Vec<User>> {
        let mut users = Vec::new();
        for id in ids {
            users.push(self.store.get_user(id).await?);
        }
        Ok(users)
    }
}

fn check_distinct(id: i64, other_id: i64) -> ServerResult<()> {
    if id == other_id {
        return Err(ServerError::IncorrectId(format!(
            "user {id} cannot be paired with themselves"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use catalog_store::MemoryCatalogStore;
    use chrono::NaiveDate;

    use super::*;

    fn service() -> UserService<MemoryCatalogStore> {
        UserService::new(Arc::new(MemoryCatalogStore::new()))
    }

    fn input(login: &str) -> UserInput {
        UserInput {
            email: format!("{login}@mail.ru"),
            login: login.to_string(),
            name: Some(format!("Name of {login}")),
            birthday: NaiveDate::from_ymd_opt(1946, 8, 20),
            ..Default::default()
        }
    }

    async fn create(users: &UserService<MemoryCatalogStore>, login: &str) -> i64 {
        users.create_user(input(login)).await.unwrap().id
    }

    #[tokio::test]
    async fn test_create_and_fetch_round_trip() {
        let users = service();
        let mut payload = input("dolore");
        payload.name = None;

        let user = users.create_user(payload).await.unwrap();
        assert_eq!(user.name, "dolore");
        assert!(user.friend_statuses.is_empty());
        assert_eq!(users.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_create_ignores_supplied_friend_statuses() {
        let users = service();
        let a = create(&users, "a").await;

        let mut payload = input("b");
        payload.friends_statuses = Some([(a, FriendStatus::Rejected)].into());
        let b = users.create_user(payload).await.unwrap();

        assert!(b.friend_statuses.is_empty());
        assert!(users.get_user(b.id).await.unwrap().friend_statuses.is_empty());
        users.add_friend(b.id, a).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_with_whitespace_rejected() {
        let users = service();
        let err = users.create_user(input("dolore ullamco")).await.unwrap_err();

        assert!(matches!(err, ServerError::InvalidFields(v) if v[0].field_name == "login"));
        assert!(users.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_friend_is_directed_and_not_repeatable() {
        let users = service();
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;

        users.add_friend(a, b).await.unwrap();
        assert_eq!(
            users.get_user(a).await.unwrap().friend_statuses.get(&b),
            Some(&FriendStatus::Confirmed)
        );
        assert!(users.get_user(b).await.unwrap().friend_statuses.is_empty());

        let err = users.add_friend(a, b).await.unwrap_err();
        assert!(matches!(err, ServerError::IncorrectId(msg) if msg.contains("already a friend")));
    }

    #[tokio::test]
    async fn test_self_friendship_always_fails() {
        let users = service();

        let err = users.add_friend(5, 5).await.unwrap_err();
        assert!(matches!(err, ServerError::IncorrectId(_)));

        let a = create(&users, "a").await;
        assert!(matches!(users.add_friend(a, a).await, Err(ServerError::IncorrectId(_))));
        assert!(matches!(users.delete_friend(a, a).await, Err(ServerError::IncorrectId(_))));
        assert!(matches!(users.common_friends(a, a).await, Err(ServerError::IncorrectId(_))));
    }

    #[tokio::test]
    async fn test_existing_status_blocks_new_request() {
        let store = Arc::new(MemoryCatalogStore::new());
        let users = UserService::new(Arc::clone(&store));
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;
        store
            .set_friend_status(a, b, FriendStatus::Rejected)
            .await
            .unwrap();

        let err = users.add_friend(a, b).await.unwrap_err();
        assert!(matches!(err, ServerError::IncorrectId(msg) if msg.contains("rejected")));

        let err = users.delete_friend(a, b).await.unwrap_err();
        assert!(matches!(err, ServerError::IncorrectId(_)));
    }

    #[tokio::test]
    async fn test_delete_friend_requires_confirmed_friendship() {
        let users = service();
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;

        assert!(matches!(users.delete_friend(a, b).await, Err(ServerError::IncorrectId(_))));

        users.add_friend(a, b).await.unwrap();
        users.add_friend(b, a).await.unwrap();
        users.delete_friend(a, b).await.unwrap();

        assert!(users.get_user(a).await.unwrap().friend_statuses.is_empty());
        assert!(users.get_user(b).await.unwrap().friend_statuses.is_empty());
    }

    #[tokio::test]
    async fn test_friends_list() {
        let users = service();
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;
        let c = create(&users, "c").await;

        assert!(matches!(users.friends(a).await, Err(ServerError::IncorrectId(_))));

        users.add_friend(a, c).await.unwrap();
        users.add_friend(a, b).await.unwrap();

        let logins: Vec<String> = users
            .friends(a)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.login)
            .collect();
        assert_eq!(logins, ["b", "c"]);
    }

    #[tokio::test]
    async fn test_common_friends_is_intersection() {
        let users = service();
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;
        let common = create(&users, "common").await;
        let only_a = create(&users, "only_a").await;

        users.add_friend(a, common).await.unwrap();
        users.add_friend(a, only_a).await.unwrap();
        users.add_friend(b, common).await.unwrap();

        let shared = users.common_friends(a, b).await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, common);
        assert_eq!(shared[0].login, "common");

        let err = users.common_friends(a, 404).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_keeps_friendships() {
        let users = service();
        let a = create(&users, "a").await;
        let b = create(&users, "b").await;
        users.add_friend(a, b).await.unwrap();

        let mut payload = input("renamed");
        payload.id = Some(a);
        let updated = users.update_user(payload).await.unwrap();

        assert_eq!(updated.login, "renamed");
        assert!(updated.friend_statuses.contains_key(&b));

        let mut payload = input("ghost");
        payload.id = Some(999);
        assert!(users.update_user(payload).await.is_err());
    }
}
