//! # API REST
//!
//! REST API for the clinic management system.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer-token authentication and per-handler role checks
//! - The JSON response envelope (`success`, `message`, resource)
//! - OpenAPI/Swagger documentation
//!
//! Domain logic lives in `clinic-core`; this crate only translates between
//! HTTP and the core services.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use clinic_core::models;
use clinic_core::{ClinicConfig, Store};

pub mod error;
pub mod extract;
pub mod routes;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<ClinicConfig>,
    pub store: Arc<Store>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::register,
        routes::auth::login,
        routes::auth::profile,
        routes::auth::update_profile,
        routes::doctors::list,
        routes::doctors::specializations,
        routes::doctors::me,
        routes::doctors::get_doctor,
        routes::doctors::available_slots,
        routes::doctors::doctor_appointments,
        routes::doctors::stats,
        routes::doctors::update_availability,
        routes::patients::list,
        routes::patients::me,
        routes::patients::get_patient,
        routes::appointments::book,
        routes::appointments::list_for_current_doctor,
        routes::appointments::list_for_current_patient,
        routes::appointments::list_by_doctor,
        routes::appointments::list_by_patient,
        routes::appointments::overview_stats,
        routes::appointments::get_appointment,
        routes::appointments::update_appointment,
        routes::appointments::update_status,
        routes::appointments::delete_appointment,
        routes::prescriptions::create,
        routes::prescriptions::list_for_current_doctor,
        routes::prescriptions::list_for_current_patient,
        routes::prescriptions::list_by_patient,
        routes::prescriptions::get_prescription,
        routes::prescriptions::update_prescription,
        routes::prescriptions::cancel_prescription,
        routes::medicines::list,
        routes::medicines::categories,
        routes::medicines::low_stock,
        routes::medicines::get_medicine,
        routes::medicines::create,
        routes::medicines::update_medicine,
        routes::medicines::deactivate,
        routes::medicines::update_stock,
        routes::messages::send,
        routes::messages::inbox,
        routes::messages::sent,
        routes::messages::unread_count,
        routes::messages::conversation,
        routes::messages::mark_all_read,
        routes::messages::mark_read,
        routes::messages::delete_message,
        routes::admin::update_user_profile,
    ),
    components(schemas(
        models::Role,
        models::PublicUser,
        models::RegisterRequest,
        models::LoginRequest,
        models::UpdateProfileRequest,
        models::Doctor,
        models::DayWindow,
        models::WeeklyAvailability,
        models::UpdateAvailabilityRequest,
        models::DoctorStats,
        models::DoctorProfile,
        models::Patient,
        models::BloodGroup,
        models::EmergencyContact,
        models::MedicalHistoryEntry,
        models::ConditionStatus,
        models::Allergy,
        models::AllergySeverity,
        models::PatientMedication,
        models::PatientProfile,
        models::RoleProfile,
        models::Appointment,
        models::AppointmentType,
        models::AppointmentStatus,
        models::CancelledBy,
        models::AppointmentDetail,
        models::AppointmentStats,
        models::BookAppointmentRequest,
        models::UpdateAppointmentRequest,
        models::StatusUpdateRequest,
        models::Prescription,
        models::PrescriptionStatus,
        models::MedicationEntry,
        models::PrescriptionDetail,
        models::NewPrescriptionRequest,
        models::UpdatePrescriptionRequest,
        models::Medicine,
        models::MedicineCategory,
        models::DosageForm,
        models::NewMedicineRequest,
        models::UpdateMedicineRequest,
        models::StockUpdateRequest,
        models::Message,
        models::MessageType,
        models::MessagePriority,
        models::MessageDetail,
        models::SendMessageRequest,
        routes::health::HealthRes,
        routes::auth::AuthRes,
        routes::auth::ProfileRes,
        routes::auth::UserRes,
        routes::doctors::DoctorListRes,
        routes::doctors::DoctorRes,
        routes::doctors::DoctorRecordRes,
        routes::doctors::SlotsRes,
        routes::doctors::SpecializationsRes,
        routes::doctors::DoctorStatsRes,
        routes::patients::PatientListRes,
        routes::patients::PatientRes,
        routes::appointments::AppointmentRes,
        routes::appointments::AppointmentListRes,
        routes::appointments::AppointmentStatsRes,
        routes::prescriptions::PrescriptionRes,
        routes::prescriptions::PrescriptionListRes,
        routes::medicines::MedicineRes,
        routes::medicines::MedicineListRes,
        routes::medicines::CategoriesRes,
        routes::medicines::LowStockRes,
        routes::messages::MessageRes,
        routes::messages::MessageListRes,
        routes::messages::UnreadCountRes,
        routes::messages::MarkAllReadRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router: every resource router under `/api`,
/// Swagger UI, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::doctors::router())
        .merge(routes::patients::router())
        .merge(routes::appointments::router())
        .merge(routes::prescriptions::router())
        .merge(routes::medicines::router())
        .merge(routes::messages::router())
        .merge(routes::admin::router());

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router(dir: &TempDir) -> Router {
        let cfg = Arc::new(
            ClinicConfig::new(dir.path().to_path_buf(), "test-secret".into(), 24).unwrap(),
        );
        let store = Arc::new(Store::open(dir.path()).unwrap());
        build_router(AppState { cfg, store })
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn register_body(email: &str, role: &str) -> Value {
        json!({
            "email": email,
            "password": "secret1",
            "firstName": "Test",
            "lastName": "User",
            "role": role,
        })
    }

    async fn register(router: &Router, email: &str, role: &str) -> Value {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                register_body(email, role),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn health_is_open() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(get_request("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn register_then_profile_round_trips_role() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let registered = register(&router, "doc@example.com", "doctor").await;
        let token = registered["token"].as_str().unwrap().to_string();
        assert_eq!(registered["user"]["role"], json!("doctor"));

        let response = router
            .oneshot(get_request("/api/auth/profile", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["role"], json!("doctor"));
        assert_eq!(body["user"]["email"], json!("doc@example.com"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_bad_request() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        register(&router, "jane@example.com", "patient").await;
        let response = router
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                None,
                register_body("jane@example.com", "patient"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn profile_without_token_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(get_request("/api/auth/profile", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let response = router
            .oneshot(get_request("/api/auth/profile", Some("not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patient_cannot_create_medicines() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let registered = register(&router, "pat@example.com", "patient").await;
        let token = registered["token"].as_str().unwrap().to_string();

        let response = router
            .oneshot(json_request(
                "POST",
                "/api/medicines",
                Some(&token),
                json!({ "name": "Aspirin", "category": "painkiller", "price": 2.5 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn double_booking_the_same_slot_fails() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let doctor = register(&router, "doc@example.com", "doctor").await;
        let doctor_token = doctor["token"].as_str().unwrap().to_string();
        let patient = register(&router, "pat@example.com", "patient").await;
        let patient_token = patient["token"].as_str().unwrap().to_string();

        let me = body_json(
            router
                .clone()
                .oneshot(get_request("/api/doctors/me", Some(&doctor_token)))
                .await
                .unwrap(),
        )
        .await;
        let doctor_id = me["doctor"]["id"].as_str().unwrap().to_string();

        let me = body_json(
            router
                .clone()
                .oneshot(get_request("/api/patients/me", Some(&patient_token)))
                .await
                .unwrap(),
        )
        .await;
        let patient_id = me["patient"]["id"].as_str().unwrap().to_string();

        let booking = json!({
            "patientId": patient_id,
            "doctorId": doctor_id,
            "appointmentDate": "2030-06-03",
            "appointmentTime": "10:00",
        });

        let first = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                Some(&patient_token),
                booking.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = router
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                Some(&patient_token),
                booking,
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body = body_json(second).await;
        assert_eq!(body["message"], json!("Time slot is already booked"));
    }

    #[tokio::test]
    async fn available_slots_require_a_date() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        let doctor = register(&router, "doc@example.com", "doctor").await;
        let doctor_token = doctor["token"].as_str().unwrap().to_string();
        let me = body_json(
            router
                .clone()
                .oneshot(get_request("/api/doctors/me", Some(&doctor_token)))
                .await
                .unwrap(),
        )
        .await;
        let doctor_id = me["doctor"]["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(get_request(
                &format!("/api/doctors/{doctor_id}/available-slots"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_envelopes_carry_pagination_counters() {
        let dir = TempDir::new().unwrap();
        let router = test_router(&dir);

        register(&router, "doc@example.com", "doctor").await;

        let response = router
            .oneshot(get_request("/api/doctors?page=1&limit=5", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], json!(1));
        assert_eq!(body["totalPages"], json!(1));
        assert_eq!(body["currentPage"], json!(1));
        assert!(body["doctors"].is_array());
    }
}
