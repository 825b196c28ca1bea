//! Single binary web server: competition engine behind a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, DEFAULT_BEST_OF, ADVANTAGE_SETS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use club_competition::{
    AppConfig, BestOf, CompetitionError, CompetitionId, CompetitionMode, DrawOrder, MatchFormat,
    MatchId, MemoryStore, NewParticipant, Orchestrator, ParticipantId, SetScore,
    StandingsScope, StorageError,
};
use serde::{Deserialize, Serialize};

/// Shared engine over the in-memory store. Locking is per competition inside the orchestrator.
type AppState = Data<Orchestrator<MemoryStore>>;

/// Match format used when a create request doesn't name one.
type DefaultFormat = Data<MatchFormat>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateCompetitionBody {
    name: String,
    #[serde(default)]
    best_of: Option<BestOf>,
    #[serde(default)]
    advantage_sets: Option<bool>,
}

#[derive(Deserialize)]
struct StartBody {
    mode: CompetitionMode,
    #[serde(default)]
    draw: DrawOrder,
}

#[derive(Deserialize)]
struct ResultBody {
    sets: Vec<SetScore>,
}

#[derive(Deserialize)]
struct StandingsQuery {
    group: Option<usize>,
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

/// Path segments: competition id and participant id.
#[derive(Deserialize)]
struct CompetitionParticipantPath {
    id: CompetitionId,
    participant_id: ParticipantId,
}

/// Path segment: match id (e.g. /api/matches/{match_id}/result)
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

/// JSON body on success, `{ error, detail, retryable }` with a fitting status on failure.
fn respond<T: Serialize>(result: Result<T, CompetitionError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            let body = serde_json::json!({
                "error": e.to_string(),
                "detail": &e,
                "retryable": e.is_retryable(),
            });
            let mut builder = if e.is_not_found() {
                HttpResponse::NotFound()
            } else {
                match &e {
                    CompetitionError::Storage(StorageError::Unavailable(_)) => {
                        HttpResponse::ServiceUnavailable()
                    }
                    CompetitionError::Validation(_)
                    | CompetitionError::Structure(_)
                    | CompetitionError::NotEnoughParticipants { .. }
                    | CompetitionError::DuplicateParticipantName
                    | CompetitionError::EmptyParticipantName
                    | CompetitionError::InvalidImport(_) => HttpResponse::BadRequest(),
                    _ => HttpResponse::Conflict(),
                }
            };
            builder.json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "club-competition",
    })
}

/// Create a new competition in registration (returns it with id).
#[post("/api/competitions")]
async fn api_create_competition(
    state: AppState,
    defaults: DefaultFormat,
    body: Json<CreateCompetitionBody>,
) -> HttpResponse {
    let format = MatchFormat {
        best_of: body.best_of.unwrap_or(defaults.best_of),
        advantage_sets: body.advantage_sets.unwrap_or(defaults.advantage_sets),
    };
    respond(state.create_competition(&body.name, format))
}

/// Get a competition's state (phase, groups, draw).
#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.get_state(path.id))
}

#[get("/api/competitions/{id}/participants")]
async fn api_list_participants(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.list_participants(path.id))
}

/// Register a participant (registration only).
#[post("/api/competitions/{id}/participants")]
async fn api_register_participant(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<NewParticipant>,
) -> HttpResponse {
    respond(state.register_participant(path.id, body.into_inner()))
}

/// Import participants from a `name,seed` CSV body (registration only, all or nothing).
#[post("/api/competitions/{id}/participants/import")]
async fn api_import_participants(
    state: AppState,
    path: Path<CompetitionPath>,
    body: String,
) -> HttpResponse {
    respond(state.import_participants_csv(path.id, body.as_bytes()))
}

/// Remove a participant (registration only).
#[delete("/api/competitions/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: AppState,
    path: Path<CompetitionParticipantPath>,
) -> HttpResponse {
    respond(
        state
            .remove_participant(path.id, path.participant_id)
            .and_then(|()| state.list_participants(path.id)),
    )
}

/// Start the competition (registration -> groups, knockout or round robin).
#[post("/api/competitions/{id}/start")]
async fn api_start_competition(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<StartBody>,
) -> HttpResponse {
    respond(state.start_competition_with_draw(path.id, body.mode, body.draw))
}

/// Advance to the next phase (groups -> knockout, finished knockout/round robin -> completed).
#[post("/api/competitions/{id}/advance")]
async fn api_advance_phase(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.advance_phase(path.id))
}

/// Admin override: complete the competition now.
#[post("/api/competitions/{id}/complete")]
async fn api_force_complete(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.force_complete(path.id))
}

#[get("/api/competitions/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.get_bracket(path.id).map(|bracket| {
        serde_json::json!({
            "status": bracket.status(),
            "champion": bracket.champion(),
            "bracket": bracket,
        })
    }))
}

/// Standings for one group (`?group=0`) or the whole field.
#[get("/api/competitions/{id}/standings")]
async fn api_get_standings(
    state: AppState,
    path: Path<CompetitionPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    let scope = query.group.map(StandingsScope::Group);
    respond(state.get_standings(path.id, scope))
}

#[get("/api/competitions/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    respond(state.list_matches(path.id))
}

/// Submit a match result (validated; identical resubmission is a no-op).
#[post("/api/matches/{match_id}/result")]
async fn api_submit_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    respond(state.submit_result(path.match_id, &body.sets))
}

/// Correct a recorded match result.
#[put("/api/matches/{match_id}/result")]
async fn api_edit_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    respond(state.edit_result(path.match_id, &body.sets))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (default best of {})",
        bind.0,
        bind.1,
        config.default_format.best_of.sets()
    );

    let state = Data::new(Orchestrator::new(MemoryStore::new()));
    let defaults = Data::new(config.default_format);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(defaults.clone())
            .service(api_health)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_list_participants)
            .service(api_import_participants)
            .service(api_register_participant)
            .service(api_remove_participant)
            .service(api_start_competition)
            .service(api_advance_phase)
            .service(api_force_complete)
            .service(api_get_bracket)
            .service(api_get_standings)
            .service(api_list_matches)
            .service(api_submit_result)
            .service(api_edit_result)
    })
    .bind(bind)?
    .run()
    .await
}
