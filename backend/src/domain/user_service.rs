//! User lookups and administration over the ERP gateway.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::criteria::Criteria;
use super::ports::{ErpGateway, PasswordHasher, UsersCommand, UsersQuery};
use super::read_after_write::ReadAfterWrite;
use super::schema::{FieldValue, LoadRequest, SALES_USERS, SaveRequest};
use super::users::{NewUser, REGISTERED_ROLE, User, UserPatch, UserStatus};
use super::Error;

const PAGE_LIMIT: u32 = 1000;

/// User service backed by an [`ErpGateway`] and a [`PasswordHasher`].
#[derive(Clone)]
pub struct UserService {
    gateway: Arc<dyn ErpGateway>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    read_after_write: ReadAfterWrite,
}

impl UserService {
    /// Build the service with the default read-after-write policy.
    pub fn new(
        gateway: Arc<dyn ErpGateway>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            hasher,
            clock,
            read_after_write: ReadAfterWrite::default(),
        }
    }

    /// Replace the read-after-write policy.
    #[must_use]
    pub fn with_read_after_write(mut self, policy: ReadAfterWrite) -> Self {
        self.read_after_write = policy;
        self
    }

    async fn load_users(&self, criteria: Option<Criteria>, limit: u32) -> Result<Vec<User>, Error> {
        let mut request = LoadRequest::new(&SALES_USERS)
            .include_presentation_fields(false)
            .limit(limit);
        if let Some(criteria) = criteria {
            request = request.filter(criteria)?;
        }
        let records = self.gateway.load(&request).await?;
        Ok(records.iter().map(User::from).collect())
    }

    async fn hash(&self, plain: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|err| Error::internal(format!("hashing task failed: {err}")))?
            .map_err(Error::from)
    }

    async fn hash_unless_hashed(&self, candidate: &str) -> Result<String, Error> {
        if self.hasher.is_hashed(candidate) {
            return Ok(candidate.to_owned());
        }
        self.hash(candidate).await
    }

    async fn find_created(&self, email: &str) -> Result<Option<User>, Error> {
        let attempts = self.read_after_write.poll_attempts();
        for attempt in 1..=attempts {
            let found = self
                .search(email)
                .await?
                .into_iter()
                .find(|user| user.email.eq_ignore_ascii_case(email));
            if found.is_some() {
                return Ok(found);
            }
            debug!(attempt, "created user not visible yet");
            if attempt < attempts {
                self.read_after_write.pause().await;
            }
        }
        Ok(None)
    }
}

fn blank_to_empty(value: Option<String>) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

#[async_trait]
impl UsersQuery for UserService {
    async fn get_all(&self) -> Result<Vec<User>, Error> {
        self.load_users(None, PAGE_LIMIT).await
    }

    async fn get_pending(&self) -> Result<Vec<User>, Error> {
        self.load_users(
            Some(Criteria::eq("STATUS", UserStatus::Pending.as_str())),
            PAGE_LIMIT,
        )
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, Error> {
        let users = self
            .load_users(Some(Criteria::eq("CODUSUARIO", id)), 1)
            .await?;
        Ok(users.into_iter().next())
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, Error> {
        let term = term.trim();
        let criteria = Criteria::Or(
            ["NOME", "EMAIL", "FUNCAO"]
                .into_iter()
                .map(|field| Criteria::ContainsIgnoreCase(field, term.to_owned()))
                .collect(),
        );
        // Rows are re-checked locally: the ERP's LIKE is the only place a
        // wildcard could slip through.
        let needle = term.to_uppercase();
        let users = self.load_users(Some(criteria), PAGE_LIMIT).await?;
        Ok(users
            .into_iter()
            .filter(|user| {
                [&user.name, &user.email, &user.role]
                    .iter()
                    .any(|value| value.to_uppercase().contains(&needle))
            })
            .collect())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let users = self
            .load_users(
                Some(Criteria::EqIgnoreCase("EMAIL", email.trim().to_owned())),
                1,
            )
            .await?;
        Ok(users.into_iter().next())
    }
}

#[async_trait]
impl UsersCommand for UserService {
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, Error> {
        if !self.search(email).await?.is_empty() {
            return Err(Error::conflict("email already registered")
                .with_details(serde_json::json!({ "field": "email" })));
        }

        let password_hash = self.hash(password).await?;
        let request = SaveRequest::insert(
            &SALES_USERS,
            vec![
                ("NOME", name.into()),
                ("EMAIL", email.into()),
                ("SENHA", password_hash.clone().into()),
                ("FUNCAO", REGISTERED_ROLE.into()),
                ("STATUS", UserStatus::Pending.as_str().into()),
            ],
        )?;
        let outcome = self.gateway.save(&request).await?;

        let id = outcome
            .primary_key
            .as_deref()
            .and_then(|key| key.trim().parse().ok())
            .unwrap_or_default();
        info!(user_id = id, "user registered");
        Ok(User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            role: REGISTERED_ROLE.to_owned(),
            status: UserStatus::Pending,
            password_hash,
            avatar: String::new(),
            cod_vendedor: None,
        })
    }

    async fn create(&self, user: NewUser) -> Result<User, Error> {
        if user.password.trim().is_empty() {
            return Err(Error::invalid_request("password is required")
                .with_details(serde_json::json!({ "field": "password" })));
        }

        let password_hash = self.hash_unless_hashed(&user.password).await?;
        let avatar = blank_to_empty(user.avatar);
        let request = SaveRequest::insert(
            &SALES_USERS,
            vec![
                ("NOME", user.name.as_str().into()),
                ("EMAIL", user.email.as_str().into()),
                ("SENHA", password_hash.as_str().into()),
                ("FUNCAO", user.role.as_str().into()),
                ("STATUS", user.status.as_str().into()),
                ("AVATAR", avatar.as_str().into()),
                ("CODVEND", user.cod_vendedor.clone().into()),
            ],
        )?;
        self.gateway.save(&request).await?;
        self.read_after_write.settle().await;

        if let Some(created) = self.find_created(&user.email).await? {
            info!(user_id = created.id, "user created");
            return Ok(created);
        }

        let placeholder_id = self.clock.utc().timestamp_millis();
        warn!(
            placeholder_id,
            "created user not found after polling; returning placeholder"
        );
        Ok(User {
            id: placeholder_id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            password_hash,
            avatar,
            cod_vendedor: user.cod_vendedor,
        })
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, Error> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;

        let status = patch.status.unwrap_or(current.status);
        let cod_vendedor = patch.cod_vendedor.unwrap_or(current.cod_vendedor);
        let mut values: Vec<(&'static str, FieldValue)> = vec![
            ("NOME", patch.name.unwrap_or(current.name).into()),
            ("EMAIL", patch.email.unwrap_or(current.email).into()),
            ("FUNCAO", patch.role.unwrap_or(current.role).into()),
            ("STATUS", status.as_str().into()),
            (
                "AVATAR",
                blank_to_empty(patch.avatar.or(Some(current.avatar))).into(),
            ),
            ("CODVEND", cod_vendedor.into()),
        ];
        if let Some(password) = patch.password.filter(|password| !password.trim().is_empty()) {
            values.push(("SENHA", self.hash_unless_hashed(&password).await?.into()));
        }

        let request = SaveRequest::update(&SALES_USERS, id.to_string(), values)?;
        self.gateway.save(&request).await?;
        self.read_after_write.settle().await;
        info!(user_id = id, status = status.as_str(), "user updated");
        self.get_by_id(id).await
    }

    async fn approve(&self, id: i64) -> Result<Option<User>, Error> {
        self.update(id, UserPatch::status(UserStatus::Active)).await
    }

    async fn block(&self, id: i64) -> Result<Option<User>, Error> {
        self.update(id, UserPatch::status(UserStatus::Blocked)).await
    }

    async fn delete(&self, id: i64) -> bool {
        let result = async {
            let request = SaveRequest::update(
                &SALES_USERS,
                id.to_string(),
                vec![("STATUS", UserStatus::Blocked.as_str().into())],
            )?;
            self.gateway.save(&request).await?;
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(user_id = id, "user blocked");
                true
            }
            Err(error) => {
                warn!(user_id = id, %error, "user delete failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
