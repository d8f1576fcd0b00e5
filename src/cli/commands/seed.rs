use clap::Args;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::NewUser;
use crate::database::{schema, PgStore, StoreError, UserStore};
use crate::types::Role;

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, default_value = "admin", help = "Username of the default admin")]
    pub admin_username: String,

    #[arg(long, default_value = "admin@example.com", help = "Email of the default admin")]
    pub admin_email: String,

    #[arg(long, default_value = "admin123", help = "Password of the default admin")]
    pub admin_password: String,
}

pub async fn handle(args: SeedArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = super::connect(config).await?;
    schema::seed_roles(db.pool()).await?;
    tracing::info!("Seeded {} roles", Role::ALL.len());

    let store = PgStore::new(&db);
    let admin = NewUser {
        name: "Administrator".to_string(),
        country: None,
        email: args.admin_email,
        username: args.admin_username.clone(),
        password: hash_password(&args.admin_password, config.security.password_cost)?,
        language: "es".to_string(),
        id_rol: Role::Admin.id(),
    };

    let result = match store.user_by_username(&args.admin_username).await? {
        Some(existing) => output_success(
            &output_format,
            &format!("Roles seeded; admin '{}' already exists", existing.username),
            Some(json!({ "admin_id": existing.id, "created": false })),
        ),
        None => match store.insert_user(admin).await {
            Ok(user) => output_success(
                &output_format,
                &format!("Roles seeded; created admin '{}'", user.username),
                Some(json!({ "admin_id": user.id, "created": true })),
            ),
            Err(StoreError::Conflict(msg)) => output_error(&output_format, &msg, Some("CONFLICT")),
            Err(e) => Err(e.into()),
        },
    };

    db.close().await;
    result
}
