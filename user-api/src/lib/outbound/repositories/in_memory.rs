use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Used when no database is configured and by the integration tests. Records
/// and the username index sit behind one lock so uniqueness checks and writes
/// happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    usernames: HashMap<Username, UserId>,
    // Insertion order, so listings are stable
    order: Vec<UserId>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if state.usernames.contains_key(&user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        state.usernames.insert(user.username.clone(), user.id);
        state.order.push(user.id);
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let state = self.state.read().await;

        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let state = self.state.read().await;

        Ok(state
            .order
            .iter()
            .filter_map(|id| state.users.get(id))
            .cloned()
            .collect())
    }

    async fn update(&self, user: User) -> Result<Option<User>, UserError> {
        let mut state = self.state.write().await;

        let Some(previous_username) = state.users.get(&user.id).map(|u| u.username.clone())
        else {
            return Ok(None);
        };

        if previous_username != user.username {
            if state.usernames.contains_key(&user.username) {
                return Err(UserError::UsernameAlreadyExists(
                    user.username.as_str().to_string(),
                ));
            }
            state.usernames.remove(&previous_username);
            state.usernames.insert(user.username.clone(), user.id);
        }

        state.users.insert(user.id, user.clone());

        Ok(Some(user))
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let mut state = self.state.write().await;

        let Some(user) = state.users.remove(id) else {
            return Ok(None);
        };

        state.usernames.remove(&user.username);
        state.order.retain(|existing| existing != id);

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::Role;

    fn user(username: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let alice = repository.create(user("alice")).await.unwrap();

        let by_id = repository.find_by_id(&alice.id).await.unwrap().unwrap();
        assert_eq!(by_id.username.as_str(), "alice");

        let by_name = repository
            .find_by_username(&alice.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, alice.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_username_keeps_first_record() {
        let repository = InMemoryUserRepository::new();
        let first = repository.create(user("alice")).await.unwrap();

        let result = repository.create(user("alice")).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));

        let stored = repository
            .find_by_username(&first.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(repository.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_in_insertion_order() {
        let repository = InMemoryUserRepository::new();
        for name in ["carol", "alice", "bob"] {
            repository.create(user(name)).await.unwrap();
        }

        let names: Vec<String> = repository
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username.to_string())
            .collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[tokio::test]
    async fn test_update_renames_and_reindexes() {
        let repository = InMemoryUserRepository::new();
        let mut alice = repository.create(user("alice")).await.unwrap();
        let old_name = alice.username.clone();

        alice.username = Username::new("alicia".to_string()).unwrap();
        let updated = repository.update(alice.clone()).await.unwrap().unwrap();
        assert_eq!(updated.username.as_str(), "alicia");

        assert!(repository
            .find_by_username(&old_name)
            .await
            .unwrap()
            .is_none());
        assert!(repository
            .find_by_username(&alice.username)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_update_to_taken_username_fails() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("alice")).await.unwrap();
        let mut bob = repository.create(user("bob")).await.unwrap();

        bob.username = Username::new("alice".to_string()).unwrap();
        let result = repository.update(bob).await;
        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let repository = InMemoryUserRepository::new();
        assert!(repository.update(user("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_user() {
        let repository = InMemoryUserRepository::new();
        let alice = repository.create(user("alice")).await.unwrap();

        let deleted = repository.delete(&alice.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, alice.id);

        assert!(repository.find_by_id(&alice.id).await.unwrap().is_none());
        assert!(repository.delete(&alice.id).await.unwrap().is_none());

        // The name is free again
        assert!(repository.create(user("alice")).await.is_ok());
    }
}
