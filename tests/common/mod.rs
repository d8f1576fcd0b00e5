#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use ruso_api::auth::hash_password;
use ruso_api::config::AppConfig;
use ruso_api::database::models::{NewUser, User};
use ruso_api::database::{MemoryStore, UserStore};
use ruso_api::types::Role;
use ruso_api::{router, AppState};

pub const PASSWORD: &str = "secret123";

/// A server running inside the test's runtime against a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(AppConfig::development(), store.clone()));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            client: reqwest::Client::new(),
            store,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert a user directly, bypassing registration rules (used for admins)
    pub async fn seed_user(&self, username: &str, role: Role) -> Result<User> {
        let user = self
            .store
            .insert_user(NewUser {
                name: username.to_string(),
                country: None,
                email: format!("{}@example.com", username),
                username: username.to_string(),
                password: hash_password(PASSWORD, AppConfig::development().security.password_cost)?,
                language: "es".to_string(),
                id_rol: role.id(),
            })
            .await?;
        Ok(user)
    }

    pub async fn login(&self, username: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    /// Seed a user with `role` and return a bearer token for them
    pub async fn user_token(&self, username: &str, role: Role) -> Result<(User, String)> {
        let user = self.seed_user(username, role).await?;
        let token = self.login(username).await?;
        Ok((user, token))
    }
}

pub fn full_declension(stem: &str) -> Value {
    let mut numbers = Map::new();
    for number in ["singular", "plural"] {
        let mut cases = Map::new();
        for case in ["nominative", "genitive", "dative", "accusative", "instrumental", "prepositional"] {
            cases.insert(case.to_string(), json!(format!("{}-{}", stem, case)));
        }
        numbers.insert(number.to_string(), Value::Object(cases));
    }
    Value::Object(numbers)
}

pub fn noun_body(noun: &str, translations: Value) -> Value {
    json!({
        "noun": noun,
        "gender": "masculine",
        "translations": translations,
        "declension": full_declension(noun),
    })
}

pub fn verb_body(pair_id: &str, translations: Value) -> Value {
    let persons = json!({"ya": "a", "ty": "b", "on_ona": "c", "my": "d", "vy": "e", "oni": "f"});
    json!({
        "verb_pair_id": pair_id,
        "translations": translations,
        "conjugationType": 1,
        "root": "root",
        "imperfective": {
            "infinitive": format!("{}-ipf", pair_id),
            "present_tense": persons,
            "past_tense": {"masculine": "g", "feminine": "h", "neuter": "i", "plural": "j"}
        },
        "perfective": {
            "infinitive": format!("{}-pf", pair_id),
            "future_simple": persons
        }
    })
}
