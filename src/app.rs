use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::models::{Entry, Noun, Verb};
use crate::database::store::{EntryStore, Store};
use crate::handlers::{protected, public};
use crate::services::{AuthService, EntryService, GroupService, QueryEngine, StudentService, UserService};

/// Shared request state. Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub entries: EntryService,
    pub groups: GroupService,
    pub users: UserService,
    pub auth: AuthService,
    pub students: StudentService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let engine = QueryEngine::new(config.filter.clone());
        Self {
            entries: EntryService::new(store.clone(), engine, config.api.clone()),
            groups: GroupService::new(store.clone()),
            users: UserService::new(store.clone()),
            auth: AuthService::new(store.clone(), config.security.clone()),
            students: StudentService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);
    let request_logging = state.config.api.enable_request_logging;

    let app = Router::new()
        .route("/", get(public::service::root))
        .route("/health", get(public::service::health))
        .merge(auth_routes())
        .merge(entry_routes())
        .merge(group_routes::<Noun>("/api/noun-groups", "nouns"))
        .merge(group_routes::<Verb>("/api/verb-groups", "verbs"))
        .merge(user_routes())
        .merge(student_routes())
        .route("/api/roles", get(public::roles::list))
        .with_state(state);

    if request_logging {
        app.layer(cors).layer(TraceLayer::new_for_http())
    } else {
        app.layer(cors)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/auth/me", get(protected::auth::me))
}

fn entry_routes() -> Router<AppState> {
    use protected::entries as write;
    use public::entries as read;

    Router::new()
        .route("/api/nouns", get(read::list::<Noun>).post(write::create_noun))
        .route(
            "/api/nouns/:id",
            get(read::show::<Noun>)
                .put(write::update_noun)
                .delete(write::delete::<Noun>),
        )
        .route("/api/verbs", get(read::list::<Verb>).post(write::create_verb))
        .route("/api/verbs/pair/:pair_id", get(read::verb_by_pair))
        .route(
            "/api/verbs/:id",
            get(read::show::<Verb>)
                .put(write::update_verb)
                .delete(write::delete::<Verb>),
        )
}

/// Group routes for one entry kind; members live under `{base}/:id/{members}/:entry_id`
fn group_routes<E>(base: &str, members: &str) -> Router<AppState>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    use protected::groups;

    Router::new()
        .route(base, get(groups::list::<E>).post(groups::create::<E>))
        .route(
            &format!("{}/:id", base),
            get(groups::show::<E>)
                .put(groups::update::<E>)
                .delete(groups::delete::<E>),
        )
        .route(
            &format!("{}/:id/{}/:entry_id", base, members),
            post(groups::add_member::<E>).delete(groups::remove_member::<E>),
        )
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/me", get(users::me).put(users::update_me))
        .route(
            "/api/users/:id",
            get(users::show).put(users::update).delete(users::delete),
        )
}

fn student_routes() -> Router<AppState> {
    use protected::students;

    Router::new()
        .route("/api/students", get(students::list))
        .route("/api/students/:id/link", post(students::link))
        .route("/api/students/:id/unlink", delete(students::unlink))
        .route("/api/students/:id/progress", get(students::progress))
}
