use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::ServiceError;
use crate::auth::{generate_jwt, hash_password, validate_jwt, verify_password, Claims};
use crate::config::SecurityConfig;
use crate::database::models::user::check_email;
use crate::database::models::{check_len, check_required, InputError, NewUser, User, UserPublic};
use crate::database::store::{Store, UserStore};
use crate::types::Role;

/// POST /api/auth/register body
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_role_id")]
    pub id_rol: i32,
}

fn default_language() -> String {
    "es".to_string()
}

fn default_role_id() -> i32 {
    Role::Student.id()
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), InputError> {
        check_required("name", &self.name, 100)?;
        if let Some(country) = &self.country {
            check_len("country", country, 100)?;
        }
        check_email(&self.email)?;
        check_required("username", &self.username, 50)?;
        if self.password.chars().count() < 6 {
            return Err(InputError::Invalid {
                field: "password",
                message: "must be at least 6 characters".to_string(),
            });
        }
        check_required("language", &self.language, 10)?;
        match Role::from_id(self.id_rol) {
            Some(Role::Teacher) | Some(Role::Student) => {}
            Some(Role::Admin) => {
                return Err(InputError::Invalid {
                    field: "id_rol",
                    message: "admin accounts cannot be self-registered".to_string(),
                })
            }
            None => {
                return Err(InputError::Invalid {
                    field: "id_rol",
                    message: format!("unknown role {}", self.id_rol),
                })
            }
        }

        Ok(())
    }

    fn into_new_user(self, password_cost: u32) -> Result<NewUser, ServiceError> {
        self.validate()?;
        let password = hash_password(&self.password, password_cost)?;
        Ok(NewUser {
            name: self.name,
            country: self.country,
            email: self.email,
            username: self.username,
            password,
            language: self.language,
            id_rol: self.id_rol,
        })
    }
}

/// POST /api/auth/login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserPublic,
}

/// Registration, login and bearer-token resolution
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, ServiceError> {
        let new_user = request.into_new_user(self.security.password_cost)?;
        if self.store.user_by_username(&new_user.username).await?.is_some() {
            return Err(ServiceError::Conflict("Username already registered".to_string()));
        }
        if self.store.user_by_email(&new_user.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }
        let user = self.store.insert_user(new_user).await?;
        tracing::info!("Registered user {} ({})", user.id, user.username);
        self.issue(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
        let user = match self.store.user_by_username(&request.username).await? {
            Some(user) if verify_password(&request.password, &user.password) => user,
            _ => {
                warn!("Failed login for {}", request.username);
                return Err(ServiceError::Unauthorized("Incorrect username or password".to_string()));
            }
        };
        if !user.is_active {
            return Err(ServiceError::Forbidden("User is inactive".to_string()));
        }
        self.issue(&user)
    }

    /// Resolve a bearer token to an active user
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let claims = validate_jwt(token, &self.security).map_err(|e| {
            warn!("Rejected token: {}", e);
            ServiceError::Unauthorized("Could not validate credentials".to_string())
        })?;
        let user = self
            .store
            .user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Could not validate credentials".to_string()))?;
        if !user.is_active {
            return Err(ServiceError::Forbidden("User is inactive".to_string()));
        }
        Ok(user)
    }

    fn issue(&self, user: &User) -> Result<TokenResponse, ServiceError> {
        let claims = Claims::for_user(user, self.security.jwt_expiry_minutes);
        Ok(TokenResponse {
            access_token: generate_jwt(&claims, &self.security)?,
            token_type: "bearer",
            user: UserPublic::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::UserPatch;
    use crate::database::MemoryStore;

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AuthService::new(store.clone(), AppConfig::development().security), store)
    }

    fn register(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ana".to_string(),
            country: Some("ES".to_string()),
            email: email.to_string(),
            username: username.to_string(),
            password: "secret123".to_string(),
            language: default_language(),
            id_rol: default_role_id(),
        }
    }

    #[tokio::test]
    async fn register_then_login_then_authenticate() {
        let (service, _) = service();
        let registered = service.register(register("ana", "ana@example.com")).await.unwrap();
        assert_eq!(registered.token_type, "bearer");
        assert_eq!(registered.user.role.as_deref(), Some("student"));

        let token = service
            .login(LoginRequest { username: "ana".into(), password: "secret123".into() })
            .await
            .unwrap();
        let user = service.authenticate(&token.access_token).await.unwrap();
        assert_eq!(user.username, "ana");
    }

    #[tokio::test]
    async fn stored_passwords_are_bcrypt_hashes() {
        let (service, store) = service();
        service.register(register("ana", "ana@example.com")).await.unwrap();
        let stored = store.user_by_username("ana").await.unwrap().unwrap().password;
        assert!(stored.starts_with("$2b$04$"));
        assert!(!stored.contains("secret123"));
    }

    #[tokio::test]
    async fn taken_username_or_email_conflicts() {
        let (service, _) = service();
        service.register(register("ana", "ana@example.com")).await.unwrap();
        assert!(matches!(
            service.register(register("ana", "other@example.com")).await,
            Err(ServiceError::Conflict(m)) if m.contains("Username")
        ));
        assert!(matches!(
            service.register(register("bea", "ana@example.com")).await,
            Err(ServiceError::Conflict(m)) if m.contains("Email")
        ));
    }

    #[tokio::test]
    async fn bad_credentials_and_inactive_users_are_refused() {
        let (service, store) = service();
        let token = service.register(register("ana", "ana@example.com")).await.unwrap();
        assert!(matches!(
            service.login(LoginRequest { username: "ana".into(), password: "wrong!".into() }).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(service.authenticate("garbage").await, Err(ServiceError::Unauthorized(_))));

        store
            .update_user(token.user.id, UserPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(matches!(
            service.login(LoginRequest { username: "ana".into(), password: "secret123".into() }).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.authenticate(&token.access_token).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn registration_input_is_validated() {
        let (service, _) = service();
        let mut short = register("ana", "ana@example.com");
        short.password = "12345".to_string();
        assert!(matches!(service.register(short).await, Err(ServiceError::Input(_))));

        let mut admin = register("root", "root@example.com");
        admin.id_rol = Role::Admin.id();
        assert!(matches!(service.register(admin).await, Err(ServiceError::Input(_))));
    }
}
