//! Router and request handlers for the DocMate REST surface.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use clerk::{AuthSession, UserCreated, WebhookEvent};
use docmate_core::{
    extract_fields, format_for_display, prescription_prompt, IdentityProfile, NonEmptyText,
    ProfileFields,
};
use supabase::{NewPrescription, NewUser};

use crate::auth;
use crate::state::AppState;
use crate::types::{
    AutofillReq, AutofillRes, CreatePrescriptionReq, CreatePrescriptionRes, ErrorRes, GenerateReq,
    GenerateRes, HealthRes, MessageRes, PrescriptionRes, ProfileRes, ProtectedRes,
    RecentPrescriptionsRes, ServicesStatus, UpdateProfileReq,
};

/// How many rows the recent-prescriptions panel shows.
const RECENT_PRESCRIPTION_LIMIT: usize = 5;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        protected_route,
        generate,
        clerk_webhook,
        create_prescription,
        recent_prescriptions,
        autofill,
        get_profile,
        update_profile,
    ),
    components(schemas(
        HealthRes,
        ServicesStatus,
        ErrorRes,
        MessageRes,
        ProtectedRes,
        GenerateReq,
        GenerateRes,
        CreatePrescriptionReq,
        CreatePrescriptionRes,
        RecentPrescriptionsRes,
        PrescriptionRes,
        AutofillReq,
        AutofillRes,
        ProfileRes,
        UpdateProfileReq,
    ))
)]
struct ApiDoc;

/// Builds the complete application router over the shared state.
///
/// Session-protected routes are grouped behind the bearer middleware; the
/// rest of the surface is open.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/protected-route", get(protected_route))
        .route("/api/profile", get(get_profile).put(update_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/gemini", post(generate))
        .route("/clerk/webhook", post(clerk_webhook))
        .route("/api/prescriptions", post(create_prescription))
        .route("/api/prescriptions/recent", get(recent_prescriptions))
        .route("/api/prescriptions/autofill", post(autofill))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Reports overall status plus per-dependency readiness. The booleans
/// reflect the constructed vendor clients; no upstream call is made, so
/// this stays cheap enough for load-balancer probes.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        status: "healthy".into(),
        services: ServicesStatus {
            supabase: true,
            gemini: true,
            model: state.gemini.model().into(),
        },
    })
}

#[utoipa::path(
    get,
    path = "/api/protected-route",
    responses(
        (status = 200, description = "Session accepted", body = ProtectedRes),
        (status = 401, description = "Missing or invalid session", body = ErrorRes)
    )
)]
/// Authenticated test route
///
/// Answers with the verified user id. Exists so deployments can check the
/// session wiring end to end without touching real data.
#[axum::debug_handler]
async fn protected_route(Extension(session): Extension<AuthSession>) -> Json<ProtectedRes> {
    Json(ProtectedRes {
        message: "Access granted".into(),
        user_id: session.user_id,
    })
}

#[utoipa::path(
    post,
    path = "/api/gemini",
    request_body = GenerateReq,
    responses(
        (status = 200, description = "Generated text", body = GenerateRes),
        (status = 400, description = "Missing or empty prompt", body = ErrorRes),
        (status = 500, description = "Upstream failure", body = ErrorRes)
    )
)]
/// Generative-text proxy
///
/// Forwards the prompt to the generative-text service verbatim and returns
/// the raw reply. Upstream failures map to a stable error body; the raw
/// upstream message is included only in development configuration.
#[axum::debug_handler]
async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateReq>,
) -> Result<Json<GenerateRes>, (StatusCode, Json<ErrorRes>)> {
    if req.prompt.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorRes {
                error: "Invalid request".into(),
                details: Some("Prompt must be a non-empty string".into()),
                model: None,
            }),
        ));
    }

    tracing::info!("using generative model: {}", state.gemini.model());

    match state.gemini.generate_content(&req.prompt).await {
        Ok(result) => Ok(Json(GenerateRes {
            success: true,
            result,
        })),
        Err(e) => Err(upstream_failure(&state, e)),
    }
}

#[utoipa::path(
    post,
    path = "/clerk/webhook",
    responses(
        (status = 200, description = "User stored", body = MessageRes),
        (status = 400, description = "Unsupported event type", body = MessageRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Identity-provider event sink
///
/// Consumes `user.created` events and upserts the announced user into the
/// hosted store with approval switched off. Every other event type is
/// rejected.
#[axum::debug_handler]
async fn clerk_webhook(State(state): State<AppState>, Json(event): Json<WebhookEvent>) -> Response {
    if event.kind != clerk::USER_CREATED {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageRes {
                message: "Unsupported event type".into(),
            }),
        )
            .into_response();
    }

    let user: UserCreated = match serde_json::from_value(event.data) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("malformed user.created payload: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(MessageRes {
                    message: "Malformed user payload".into(),
                }),
            )
                .into_response();
        }
    };

    tracing::info!(user_id = %user.id, "received user.created event");

    let row = NewUser {
        id: user.id.clone(),
        email: user.primary_email().map(String::from),
        phone: user.primary_phone().map(String::from),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at_utc(),
        is_approved: false,
    };

    match state.store.upsert_user(&row).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageRes {
                message: "User stored".into(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to store user: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Failed to store user")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/prescriptions",
    request_body = CreatePrescriptionReq,
    responses(
        (status = 200, description = "Generated prescription", body = CreatePrescriptionRes),
        (status = 400, description = "Missing symptoms or history", body = ErrorRes),
        (status = 500, description = "Upstream failure", body = ErrorRes)
    )
)]
/// Generate and store a prescription draft
///
/// Builds the fixed-template instruction from symptoms and history, asks
/// the model for a draft, and persists the raw reply alongside the patient
/// details. A persistence failure does not discard the draft: the reply is
/// returned with `saved` false and nothing is rolled back or retried.
#[axum::debug_handler]
async fn create_prescription(
    State(state): State<AppState>,
    Json(req): Json<CreatePrescriptionReq>,
) -> Result<Json<CreatePrescriptionRes>, (StatusCode, Json<ErrorRes>)> {
    let (symptoms, history) = match (
        NonEmptyText::new(&req.symptoms),
        NonEmptyText::new(&req.history),
    ) {
        (Ok(symptoms), Ok(history)) => (symptoms, history),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorRes {
                    error: "Invalid request".into(),
                    details: Some("Please enter both symptoms and medical history".into()),
                    model: None,
                }),
            ));
        }
    };

    let prompt = prescription_prompt(&symptoms, &history);
    let result = state
        .gemini
        .generate_content(&prompt)
        .await
        .map_err(|e| upstream_failure(&state, e))?;

    let row = NewPrescription {
        title: req.title,
        patient_name: req.patient_name,
        age: req.age,
        gender: req.gender,
        symptoms: req.symptoms,
        history: req.history,
        ai_result: result.clone(),
    };

    let saved = match state.store.insert_prescription(&row).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("failed to save prescription: {e}");
            false
        }
    };

    Ok(Json(CreatePrescriptionRes {
        success: true,
        display: format_for_display(&result),
        result,
        saved,
    }))
}

#[utoipa::path(
    get,
    path = "/api/prescriptions/recent",
    responses(
        (status = 200, description = "Newest prescriptions", body = RecentPrescriptionsRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Recent prescriptions
///
/// The five newest stored rows, newest first. Rows carry the raw generated
/// text; callers derive the structured fields on demand via autofill.
#[axum::debug_handler]
async fn recent_prescriptions(
    State(state): State<AppState>,
) -> Result<Json<RecentPrescriptionsRes>, (StatusCode, Json<ErrorRes>)> {
    match state
        .store
        .recent_prescriptions(RECENT_PRESCRIPTION_LIMIT)
        .await
    {
        Ok(rows) => Ok(Json(RecentPrescriptionsRes {
            prescriptions: rows.into_iter().map(PrescriptionRes::from).collect(),
        })),
        Err(e) => {
            tracing::error!("failed to load prescriptions: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Failed to load prescriptions")),
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/prescriptions/autofill",
    request_body = AutofillReq,
    responses(
        (status = 200, description = "Extracted fields", body = AutofillRes),
        (status = 400, description = "Missing reply text", body = ErrorRes)
    )
)]
/// Recover structured fields from a generated reply
///
/// Extraction never fails: a section the model dropped comes back as an
/// empty string. Only a wholly absent reply is rejected.
#[axum::debug_handler]
async fn autofill(
    Json(req): Json<AutofillReq>,
) -> Result<Json<AutofillRes>, (StatusCode, Json<ErrorRes>)> {
    if req.ai_result.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorRes {
                error: "Invalid request".into(),
                details: Some("AI result is required".into()),
                model: None,
            }),
        ));
    }

    Ok(Json(AutofillRes::from(extract_fields(&req.ai_result))))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of record", body = ProfileRes),
        (status = 401, description = "Missing or invalid session", body = ErrorRes),
        (status = 500, description = "Profile store failure", body = ErrorRes)
    )
)]
/// Profile of record for the signed-in user
///
/// First visit seeds the override store from the identity-provider profile;
/// afterwards the stored fields win, even when the upstream profile changed.
/// An identity lookup failure degrades to the fixed defaults rather than
/// blocking the page.
#[axum::debug_handler]
async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<ProfileRes>, (StatusCode, Json<ErrorRes>)> {
    let identity = match state.clerk.fetch_user(&session.user_id).await {
        Ok(user) => IdentityProfile {
            full_name: user.full_name(),
            email: user.primary_email().map(String::from),
        },
        Err(e) => {
            tracing::warn!("identity lookup failed: {e}");
            IdentityProfile::default()
        }
    };

    match state.profiles.bootstrap(&session.user_id, &identity) {
        Ok(fields) => Ok(Json(ProfileRes::from(fields))),
        Err(e) => {
            tracing::error!("failed to load profile: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Failed to load profile")),
            ))
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Stored profile", body = ProfileRes),
        (status = 401, description = "Missing or invalid session", body = ErrorRes),
        (status = 500, description = "Profile store failure", body = ErrorRes)
    )
)]
/// Explicit profile update
///
/// Overwrites all three fields for the signed-in user, regardless of
/// whether the record was initialised before.
#[axum::debug_handler]
async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<UpdateProfileReq>,
) -> Result<Json<ProfileRes>, (StatusCode, Json<ErrorRes>)> {
    let fields = ProfileFields {
        full_name: req.full_name,
        email: req.email,
        specialization: req.specialization,
    };

    match state.profiles.update(&session.user_id, fields) {
        Ok(fields) => Ok(Json(ProfileRes::from(fields))),
        Err(e) => {
            tracing::error!("failed to save profile: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Failed to save profile")),
            ))
        }
    }
}

/// Maps a generative-text failure to the stable 500 body, attaching the raw
/// upstream message only in development configuration.
fn upstream_failure(state: &AppState, e: gemini::GeminiError) -> (StatusCode, Json<ErrorRes>) {
    tracing::error!("generative-text error: {e}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes {
            error: "Failed to generate content".into(),
            details: state
                .cfg
                .environment()
                .is_development()
                .then(|| e.to_string()),
            model: Some(state.gemini.model().into()),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use docmate_core::{AppConfig, Environment};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> AppState {
        let cfg = AppConfig::new(
            "sk_test_secret".into(),
            "gemini-test-key".into(),
            "gemini-1.5-flash".into(),
            "https://example.supabase.co".into(),
            "service-role".into(),
            dir.path().to_path_buf(),
            Environment::Production,
        )
        .unwrap();
        AppState::from_config(cfg)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_services_and_model() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["supabase"], true);
        assert_eq!(body["services"]["gemini"], true);
        assert_eq!(body["services"]["model"], "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request("POST", "/api/gemini", serde_json::json!({"prompt": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert_eq!(body["details"], "Prompt must be a non-empty string");
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_prompt_field() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request("POST", "/api/gemini", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_prescription_requires_symptoms_and_history() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/prescriptions",
                serde_json::json!({
                    "title": "Mr",
                    "patient_name": "John Smith",
                    "age": "25",
                    "gender": "Male",
                    "symptoms": "   ",
                    "history": "asthma"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["details"],
            "Please enter both symptoms and medical history"
        );
    }

    #[tokio::test]
    async fn test_webhook_rejects_unsupported_event_type() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request(
                "POST",
                "/clerk/webhook",
                serde_json::json!({"type": "user.updated", "data": {}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Unsupported event type");
    }

    #[tokio::test]
    async fn test_autofill_extracts_all_six_fields() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let reply = "1. Diagnosis: Type 2 Diabetes\n\
             2. Test/Surgery Suggested: HbA1c test\n\
             3. Medications: Metformin\n\
             4. Dosage and Instructions: 500mg twice daily\n\
             5. Follow-up advice: Review in 2 weeks\n\
             6. Notes/Observations: Monitor fasting sugar";
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/prescriptions/autofill",
                serde_json::json!({"ai_result": reply}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["diagnosis"], "Type 2 Diabetes");
        assert_eq!(body["testOrSurgery"], "HbA1c test");
        assert_eq!(body["medications"], "Metformin");
        assert_eq!(body["dosageInstructions"], "500mg twice daily");
        assert_eq!(body["followUpAdvice"], "Review in 2 weeks");
        assert_eq!(body["notesObservations"], "Monitor fasting sugar");
    }

    #[tokio::test]
    async fn test_autofill_rejects_missing_reply() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/prescriptions/autofill",
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_protected_route_requires_session() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/protected-route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_update_requires_session() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/profile",
                serde_json::json!({"fullName": "Dr. Asha Rao"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
