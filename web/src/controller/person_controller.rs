use axum::extract::{Path, Query, State};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use tower_sessions::Session;

use crate::params::person::NameParams;
use crate::response::single;
use crate::{AppState, Error};
use domain::error::Error as DomainError;
use domain::person as PersonApi;
use log::*;

/// Key of the person served by `GET /person`.
pub(crate) const FIRST_PERSON_ID: i32 = 1;

/// Session key read and initialized by `GET /person/aaa`.
pub(crate) const SESSION_CODE_KEY: &str = "code";

/// GET the first Person
#[utoipa::path(
    get,
    path = "/person",
    responses(
        (status = 200, description = "Successfully retrieved the first Person", body = domain::Person),
        (status = 404, description = "Person not found"),
        (status = 504, description = "Person lookup timed out")
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET first Person");

    let person = single::respond(
        PersonApi::find(&app_state.item_store, FIRST_PERSON_ID),
        app_state.config.stream_idle_timeout(),
    )
    .await?;

    debug!("Found Person: {person}");

    Ok(Json(person))
}

/// GET a particular Person specified by its id.
#[utoipa::path(
    get,
    path = "/person/{id}",
    params(
        ("id" = i32, Path, description = "Person id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Person", body = domain::Person),
        (status = 404, description = "Person not found"),
        (status = 504, description = "Person lookup timed out")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Person by id: {id}");

    let person = single::respond(
        PersonApi::find(&app_state.item_store, id),
        app_state.config.stream_idle_timeout(),
    )
    .await?;

    Ok(Json(person))
}

/// GET a constant greeting
#[utoipa::path(
    get,
    path = "/person/abc",
    params(NameParams),
    responses(
        (status = 200, description = "The constant greeting", body = String)
    )
)]
pub async fn abc(
    State(app_state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<impl IntoResponse, Error> {
    info!("abc called with name: {:?}", params.name);

    let greeting = single::respond(
        PersonApi::greeting(),
        app_state.config.stream_idle_timeout(),
    )
    .await?;

    Ok(Json(greeting))
}

/// GET a constant greeting, initializing the session `code` on first visit
#[utoipa::path(
    get,
    path = "/person/aaa",
    params(NameParams),
    responses(
        (status = 200, description = "The constant greeting", body = String),
        (status = 500, description = "Session store failure")
    )
)]
pub async fn aaa(
    State(app_state): State<AppState>,
    session: Session,
    Query(params): Query<NameParams>,
) -> Result<impl IntoResponse, Error> {
    let code = session_code(&session, app_state.config.default_session_code)
        .await
        .map_err(DomainError::session)?;
    info!("aaa called with name: {:?}, session code: {code}", params.name);

    let greeting = single::respond(
        PersonApi::greeting(),
        app_state.config.stream_idle_timeout(),
    )
    .await?;

    Ok(Json(greeting))
}

/// Reads the session `code`, storing `default` first when the session has none.
pub(crate) async fn session_code(
    session: &Session,
    default: i32,
) -> Result<i32, tower_sessions::session::Error> {
    if let Some(code) = session.get::<i32>(SESSION_CODE_KEY).await? {
        return Ok(code);
    }

    session.insert(SESSION_CODE_KEY, default).await?;
    Ok(default)
}

/// GET a stream of people as Server-Sent Events, one `data:` frame per Person
#[utoipa::path(
    get,
    path = "/person/sse",
    responses(
        (
            status = 200,
            description = "text/event-stream of Person JSON frames",
            body = domain::Person,
            content_type = "text/event-stream"
        )
    )
)]
pub async fn stream(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let last = app_state.config.sse_item_count;
    debug!("GET Person stream 1..={last}");

    let people = PersonApi::stream_range(&app_state.item_store, FIRST_PERSON_ID..=last);
    let events = sse::stream::event_stream(
        &app_state.stream_manager,
        "/person/sse",
        people,
        app_state.config.stream_idle_timeout(),
    )?;

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// GET every Person in the store as Server-Sent Events
#[utoipa::path(
    get,
    path = "/person/all",
    responses(
        (
            status = 200,
            description = "text/event-stream of Person JSON frames",
            body = domain::Person,
            content_type = "text/event-stream"
        )
    )
)]
pub async fn stream_all(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all People as a stream");

    let people = PersonApi::stream_all(&app_state.item_store);
    let events = sse::stream::event_stream(
        &app_state.stream_manager,
        "/person/all",
        people,
        app_state.config.stream_idle_timeout(),
    )?;

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
