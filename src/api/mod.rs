// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::FromRequest,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    alarms::AlarmRequest,
    auth::{require_session, AuthenticatedUser},
    devices::{DeviceClass, DeviceSnapshot, DeviceValue},
    envelope::EnvelopeBody,
    models::{
        AlarmResponse, AttendanceRequest, AttendanceResponse, BuzzerCommandRequest, CommandResponse,
        DashboardStats, DeviceStatusUpdate, DoorCommandRequest, DoorOpenLogRequest, DoorOpenLogResponse,
        FrequentAccessResponse, HealthResponse, LoginRequest, LoginResponse, LongOpenDoorsResponse,
        SealedError, ServiceInfo,
    },
    error::ApiError,
    state::AppState,
    storage::{AccessCount, AlarmRecord, Arrow, AttendanceRecord, DailyCount, DoorOpenLog, DoorOpenStats},
};

pub mod alarms;
pub mod attendance;
pub mod control;
pub mod dashboard;
pub mod devices;
pub mod health;
pub mod login;
pub mod session;
pub mod trends;

/// JSON request body whose rejections use the [`ApiError`] body shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Build the application router.
///
/// Everything except `/`, `/api/health`, the login endpoints and the docs
/// requires a session token. CORS is applied by the caller.
pub fn router(state: AppState) -> Router {
    let mut public = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/login", post(login::login));
    if state.login.allow_plain {
        public = public.route("/api/login/plain", post(login::login_plain));
    }

    let protected = Router::new()
        .route("/api/session", get(session::current_session))
        .route("/api/device/status", get(devices::device_status))
        .route("/api/device/status/{class}", post(devices::update_device_status))
        .route("/api/control/doorlock", post(control::control_doorlock))
        .route("/api/control/buzzer", post(control::control_buzzer))
        .route("/api/alarm", post(alarms::create_alarm))
        .route("/api/device/events/alarm", post(alarms::create_alarm))
        .route("/api/alarms", get(alarms::list_alarms))
        .route(
            "/api/attendance",
            get(attendance::list_attendance).post(attendance::record_attendance),
        )
        .route("/api/device/events/attendance", post(attendance::record_attendance))
        .route("/api/attendance/summary", get(attendance::attendance_summary))
        .route("/api/trends/frequent-access", get(trends::frequent_access))
        .route("/api/trends/long-open-doors", get(trends::long_open_doors))
        .route("/api/trends/door-open-log", post(trends::record_door_open))
        .route("/api/dashboard/stats", get(dashboard::dashboard_stats))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// CORS policy for the admin frontend.
///
/// `*` allows any origin; anything else is treated as a single exact origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin, "invalid CORS origin, allowing any");
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        login::login,
        login::login_plain,
        session::current_session,
        devices::device_status,
        devices::update_device_status,
        control::control_doorlock,
        control::control_buzzer,
        alarms::create_alarm,
        alarms::list_alarms,
        attendance::record_attendance,
        attendance::list_attendance,
        attendance::attendance_summary,
        trends::frequent_access,
        trends::long_open_doors,
        trends::record_door_open,
        dashboard::dashboard_stats
    ),
    components(
        schemas(
            EnvelopeBody,
            LoginRequest,
            LoginResponse,
            SealedError,
            AuthenticatedUser,
            DeviceClass,
            DeviceValue,
            DeviceSnapshot,
            DeviceStatusUpdate,
            DoorCommandRequest,
            BuzzerCommandRequest,
            CommandResponse,
            AlarmRequest,
            AlarmRecord,
            AlarmResponse,
            Arrow,
            AttendanceRequest,
            AttendanceRecord,
            AttendanceResponse,
            DailyCount,
            DoorOpenLogRequest,
            DoorOpenLog,
            DoorOpenLogResponse,
            AccessCount,
            DoorOpenStats,
            FrequentAccessResponse,
            LongOpenDoorsResponse,
            DashboardStats,
            HealthResponse,
            ServiceInfo
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness and service info"),
        (name = "Auth", description = "Operator login and sessions"),
        (name = "Devices", description = "Device status registry"),
        (name = "Control", description = "Commands published to field devices"),
        (name = "Alarms", description = "Alarm intake and history"),
        (name = "Attendance", description = "Entry and exit events"),
        (name = "Trends", description = "Access and door-open analysis"),
        (name = "Dashboard", description = "Summary counters")
    )
)]
struct ApiDoc;
