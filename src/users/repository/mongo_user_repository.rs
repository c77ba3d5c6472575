use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
  bson::{self, doc, Document},
  error::{ErrorKind, WriteFailure},
  options::IndexOptions,
  Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use super::user_repository::{
  FindOneProperty, UserFilter, UserRepository, UserRepositoryError,
  Visibility,
};
use crate::shared::{pagination::PageQuery, role::Role};
use crate::users::{lifecycle::AUTHORIZABLE_ROLE, model::user::User};

const DUPLICATE_KEY: i32 = 11000;

/// Storage schema of a user. Kept apart from the domain `User` so the
/// collection layout can evolve independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
  #[serde(rename = "_id")]
  id: String,
  email: String,
  password_hash: String,
  role_id: i64,
  active: bool,
  expired_token: bool,
  #[serde(default)]
  token_version: i64,
  created_at: bson::DateTime,
  updated_at: bson::DateTime,
  deleted_at: Option<bson::DateTime>,
}

fn to_bson(time: DateTime<Utc>) -> bson::DateTime {
  bson::DateTime::from_millis(time.timestamp_millis())
}

fn from_bson(time: bson::DateTime) -> Result<DateTime<Utc>, UserRepositoryError> {
  DateTime::from_timestamp_millis(time.timestamp_millis()).ok_or_else(|| {
    UserRepositoryError::Mapping(format!("timestamp out of range: {time}"))
  })
}

impl From<&User> for UserDocument {
  fn from(user: &User) -> Self {
    Self {
      id: user.id.clone(),
      email: user.email.clone(),
      password_hash: user.password_hash.clone(),
      role_id: i64::from(user.role.id()),
      active: user.active,
      expired_token: user.expired_token,
      token_version: i64::from(user.token_version),
      created_at: to_bson(user.created_at),
      updated_at: to_bson(user.updated_at),
      deleted_at: user.deleted_at.map(to_bson),
    }
  }
}

impl TryFrom<UserDocument> for User {
  type Error = UserRepositoryError;

  fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
    let role = u32::try_from(document.role_id)
      .ok()
      .and_then(|id| Role::try_from(id).ok())
      .ok_or_else(|| {
        UserRepositoryError::Mapping(format!(
          "user {} has unknown role id {}",
          document.id, document.role_id
        ))
      })?;
    Ok(Self {
      role,
      active: document.active,
      expired_token: document.expired_token,
      token_version: u32::try_from(document.token_version).map_err(|_| {
        UserRepositoryError::Mapping(format!(
          "user {} has invalid token version {}",
          document.id, document.token_version
        ))
      })?,
      created_at: from_bson(document.created_at)?,
      updated_at: from_bson(document.updated_at)?,
      deleted_at: document.deleted_at.map(from_bson).transpose()?,
      id: document.id,
      email: document.email,
      password_hash: document.password_hash,
    })
  }
}

fn visibility_filter(visibility: Visibility) -> Document {
  match visibility {
    Visibility::ExcludeDeleted => doc! { "deleted_at": null },
    Visibility::WithDeleted => doc! {},
    Visibility::OnlyDeleted => doc! { "deleted_at": { "$ne": null } },
  }
}

fn to_query(filter: &UserFilter) -> Document {
  let mut query = visibility_filter(filter.visibility);
  if let Some(email) = &filter.email {
    query.insert("email", email.clone());
  }
  if let Some(role) = filter.role {
    query.insert("role_id", i64::from(role.id()));
  }
  if let Some(active) = filter.active {
    query.insert("active", active);
  }
  query
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
  match error.kind.as_ref() {
    ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
      write_error.code == DUPLICATE_KEY
    }
    ErrorKind::InsertMany(insert_error) => insert_error
      .write_errors
      .as_ref()
      .is_some_and(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY)),
    _ => false,
  }
}

fn map_write_error(
  error: mongodb::error::Error,
  email: &str,
) -> UserRepositoryError {
  if is_duplicate_key(&error) {
    UserRepositoryError::DuplicateEmail(email.to_string())
  } else {
    UserRepositoryError::Database(error)
  }
}

pub struct MongoUserRepository {
  users: Collection<UserDocument>,
}

impl MongoUserRepository {
  /// Connects and makes sure emails are unique at the database level.
  pub async fn connect(
    uri: &str,
    database: &str,
  ) -> Result<Self, UserRepositoryError> {
    let client = Client::with_uri_str(uri).await?;
    let users = client.database(database).collection::<UserDocument>("users");
    users
      .create_index(
        IndexModel::builder()
          .keys(doc! { "email": 1 })
          .options(IndexOptions::builder().unique(true).build())
          .build(),
      )
      .await?;
    Ok(Self { users })
  }
}

impl UserRepository for MongoUserRepository {
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
    visibility: Visibility,
  ) -> Result<Option<User>, UserRepositoryError> {
    let mut query = visibility_filter(visibility);
    match property {
      FindOneProperty::Id(id) => query.insert("_id", id),
      FindOneProperty::Email(email) => query.insert("email", email),
    };
    self
      .users
      .find_one(query)
      .await?
      .map(User::try_from)
      .transpose()
  }

  async fn find_many(
    &self,
    filter: &UserFilter,
    page: Option<&PageQuery>,
  ) -> Result<(Vec<User>, u64), UserRepositoryError> {
    let query = to_query(filter);
    let total = self.users.count_documents(query.clone()).await?;

    let find = self.users.find(query).sort(doc! { "created_at": 1 });
    let cursor = match page {
      Some(page) => {
        find
          .skip(page.offset())
          .limit(i64::try_from(page.limit).unwrap_or(i64::MAX))
          .await?
      }
      None => find.await?,
    };
    let documents: Vec<UserDocument> = cursor.try_collect().await?;
    let users = documents
      .into_iter()
      .map(User::try_from)
      .collect::<Result<Vec<_>, _>>()?;
    Ok((users, total))
  }

  async fn create(&self, user: User) -> Result<(), UserRepositoryError> {
    self
      .users
      .insert_one(UserDocument::from(&user))
      .await
      .map_err(|error| map_write_error(error, &user.email))?;
    Ok(())
  }

  async fn create_many(
    &self,
    users: Vec<User>,
  ) -> Result<(), UserRepositoryError> {
    if users.is_empty() {
      return Ok(());
    }
    for (index, user) in users.iter().enumerate() {
      if users[..index].iter().any(|earlier| earlier.email == user.email) {
        return Err(UserRepositoryError::DuplicateEmail(user.email.clone()));
      }
    }
    let emails: Vec<&str> = users.iter().map(|user| user.email.as_str()).collect();
    if let Some(existing) = self
      .users
      .find_one(doc! { "email": { "$in": emails } })
      .await?
    {
      return Err(UserRepositoryError::DuplicateEmail(existing.email));
    }

    let documents: Vec<UserDocument> =
      users.iter().map(UserDocument::from).collect();
    self
      .users
      .insert_many(documents)
      .await
      .map_err(|error| map_write_error(error, &users[0].email))?;
    Ok(())
  }

  async fn update(
    &self,
    user: &User,
    read_at: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    let result = self
      .users
      .replace_one(
        doc! {
          "_id": user.id.as_str(),
          "deleted_at": null,
          "updated_at": to_bson(read_at),
        },
        UserDocument::from(user),
      )
      .await
      .map_err(|error| map_write_error(error, &user.email))?;
    Ok(result.matched_count > 0)
  }

  async fn activate(
    &self,
    id: &str,
    password_hash: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    let result = self
      .users
      .update_one(
        doc! {
          "_id": id,
          "role_id": i64::from(AUTHORIZABLE_ROLE.id()),
          "active": false,
          "deleted_at": null,
        },
        doc! {
          "$set": {
            "active": true,
            "password_hash": password_hash,
            "updated_at": to_bson(now),
          }
        },
      )
      .await?;
    Ok(result.modified_count == 1)
  }

  async fn soft_delete(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    let result = self
      .users
      .update_one(
        doc! { "_id": id, "deleted_at": null },
        doc! { "$set": { "deleted_at": to_bson(now), "updated_at": to_bson(now) } },
      )
      .await?;
    if result.matched_count > 0 {
      return Ok(true);
    }
    Ok(self.users.count_documents(doc! { "_id": id }).await? > 0)
  }

  async fn restore(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    let result = self
      .users
      .update_one(
        doc! { "_id": id, "deleted_at": { "$ne": null } },
        doc! { "$set": { "deleted_at": null, "updated_at": to_bson(now) } },
      )
      .await?;
    Ok(result.modified_count == 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_document_mapping_keeps_deletion_state() {
    let mut user = User::new(
      String::from("someone@example.com"),
      String::from("hash"),
      Role::Employee,
      false,
    );
    user.soft_delete(Utc::now());
    user.token_version = 3;

    let document = UserDocument::from(&user);
    assert_eq!(document.role_id, 4);
    assert!(document.deleted_at.is_some());

    let mapped = User::try_from(document).unwrap();
    assert_eq!(mapped.id, user.id);
    assert_eq!(mapped.role, Role::Employee);
    assert_eq!(mapped.token_version, 3);
    assert_eq!(
      mapped.deleted_at.map(|t| t.timestamp_millis()),
      user.deleted_at.map(|t| t.timestamp_millis())
    );
  }

  #[test]
  fn test_unknown_role_fails_mapping() {
    let mut document = UserDocument::from(&User::new(
      String::from("someone@example.com"),
      String::new(),
      Role::Member,
      true,
    ));
    document.role_id = 42;
    assert!(matches!(
      User::try_from(document),
      Err(UserRepositoryError::Mapping(_))
    ));
  }

  #[test]
  fn test_filter_translation() {
    let filter = UserFilter {
      visibility: Visibility::ExcludeDeleted,
      role: Some(Role::Employee),
      active: Some(false),
      ..UserFilter::default()
    };
    assert_eq!(
      to_query(&filter),
      doc! { "deleted_at": null, "role_id": 4_i64, "active": false }
    );
  }
}
