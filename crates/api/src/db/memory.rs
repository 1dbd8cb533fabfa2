//! In-memory implementation of the store traits.
//!
//! Used by the handler tests and by `shiftwatch-api --in-memory` for local
//! development without `PostgreSQL`. Ordering and uniqueness rules mirror the
//! SQL repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use shiftwatch_core::{
    FatigueEvent, FatigueEventId, NewReading, NewSnapshot, PageRequest, TemperatureReading,
    TemperatureReadingId, UserId,
};

use super::{FatigueStore, RepositoryError, TemperatureStore, UserStore};
use crate::models::{NewUser, ProfileUpdate, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    readings: Vec<TemperatureReading>,
    events: Vec<FatigueEvent>,
    next_id: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store backing all three store traits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_id()),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            avatar: user.avatar,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != id && u.email == update.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.full_name.clone_from(&update.full_name);
        user.phone.clone_from(&update.phone);
        user.email = update.email.clone();
        if let Some(hash) = &update.password_hash {
            user.password_hash.clone_from(hash);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TemperatureStore for MemoryStore {
    async fn insert(
        &self,
        owner: UserId,
        reading: &NewReading,
        fan_engaged: bool,
        recorded_at: DateTime<Utc>,
    ) -> Result<TemperatureReading, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let created = TemperatureReading {
            id: TemperatureReadingId::new(tables.next_id()),
            recorded_at,
            temperature: reading.temperature,
            environment: reading.environment.clone(),
            owner,
            device_id: reading.device_id.clone(),
            fan_engaged,
        };
        tables.readings.push(created.clone());
        Ok(created)
    }

    async fn list(
        &self,
        owner: UserId,
        device_id: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TemperatureReading>, u64), RepositoryError> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<TemperatureReading> = tables
            .readings
            .iter()
            .filter(|r| r.owner == owner && device_id.is_none_or(|d| r.device_id == d))
            .cloned()
            .collect();
        drop(tables);

        newest_first(&mut matching, |r| (r.recorded_at, r.id.as_i32()));
        let total = matching.len() as u64;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn get(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<Option<TemperatureReading>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .readings
            .iter()
            .find(|r| r.id == id && r.owner == owner)
            .cloned())
    }

    async fn latest_for_device(
        &self,
        owner: UserId,
        device_id: &str,
    ) -> Result<Option<TemperatureReading>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .readings
            .iter()
            .filter(|r| r.owner == owner && r.device_id == device_id)
            .max_by_key(|r| (r.recorded_at, r.id))
            .cloned())
    }

    async fn delete(
        &self,
        owner: UserId,
        id: TemperatureReadingId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.readings.len();
        tables.readings.retain(|r| !(r.id == id && r.owner == owner));
        Ok(tables.readings.len() < before)
    }
}

#[async_trait]
impl FatigueStore for MemoryStore {
    async fn insert(
        &self,
        owner: UserId,
        snapshot: &NewSnapshot,
        photo_url: &str,
        storage_key: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Result<FatigueEvent, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let created = FatigueEvent {
            id: FatigueEventId::new(tables.next_id()),
            camera_id: snapshot.camera_id.clone(),
            environment: snapshot.environment.clone(),
            owner,
            recorded_at,
            photo_url: photo_url.to_owned(),
            storage_key: storage_key.map(str::to_owned),
        };
        tables.events.push(created.clone());
        Ok(created)
    }

    async fn list(&self, owner: UserId) -> Result<Vec<FatigueEvent>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut events: Vec<FatigueEvent> = tables
            .events
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        drop(tables);
        newest_first(&mut events, |e| (e.recorded_at, e.id.as_i32()));
        Ok(events)
    }

    async fn delete(
        &self,
        owner: UserId,
        id: FatigueEventId,
    ) -> Result<Option<FatigueEvent>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let position = tables
            .events
            .iter()
            .position(|e| e.id == id && e.owner == owner);
        Ok(position.map(|i| tables.events.remove(i)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use shiftwatch_core::{AvatarPreference, Email};

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Rosa Diaz".to_owned(),
            phone: "987654321".to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            avatar: AvatarPreference::Unspecified,
        }
    }

    fn reading(device: &str) -> NewReading {
        NewReading {
            environment: "Planta 1".to_owned(),
            device_id: device.to_owned(),
            temperature: Some(25.0),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create(&new_user("rosa@cistcor.com")).await.unwrap();
        let err = store.create(&new_user("rosa@cistcor.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_readings_are_owner_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let other = UserId::new(2);
        let base = Utc::now();
        for i in 0..3 {
            TemperatureStore::insert(&store, owner, &reading("A"), false, base + Duration::minutes(i))
                .await
                .unwrap();
        }
        TemperatureStore::insert(&store, other, &reading("A"), false, base)
            .await
            .unwrap();

        let (items, total) = TemperatureStore::list(&store, owner, None, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 2);
        assert!(items[0].recorded_at > items[1].recorded_at);
    }

    #[tokio::test]
    async fn test_latest_for_device() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let base = Utc::now();
        TemperatureStore::insert(&store, owner, &reading("A"), false, base)
            .await
            .unwrap();
        let newest =
            TemperatureStore::insert(&store, owner, &reading("A"), true, base + Duration::seconds(5))
                .await
                .unwrap();
        TemperatureStore::insert(&store, owner, &reading("B"), false, base + Duration::hours(1))
            .await
            .unwrap();

        let latest = store.latest_for_device(owner, "A").await.unwrap().unwrap();
        assert_eq!(latest.id, newest.id);
        assert!(store.latest_for_device(owner, "C").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fatigue_delete_returns_row_once() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let snapshot = NewSnapshot {
            camera_id: "CAM-1".to_owned(),
            environment: "Linea 3".to_owned(),
        };
        let event = FatigueStore::insert(
            &store,
            owner,
            &snapshot,
            "http://localhost/uploads/x.png",
            Some("x.png"),
            Utc::now(),
        )
        .await
        .unwrap();

        let removed = FatigueStore::delete(&store, owner, event.id).await.unwrap();
        assert_eq!(removed.unwrap().storage_key.as_deref(), Some("x.png"));
        assert!(FatigueStore::delete(&store, owner, event.id).await.unwrap().is_none());
    }
}
