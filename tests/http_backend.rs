//! End-to-end runs of `ConversationService` over real HTTP and SSE against an
//! in-process axum server that plays the travel backend.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use travel_chat::api::ApiClient;
use travel_chat::formatter::NO_HOTELS;
use travel_chat::models::MessageRole;
use travel_chat::{
    ClientConfig, ClientError, ConversationOptions, ConversationService, HttpBackend, Phase,
    SubmitOutcome,
};

#[derive(Default)]
struct MockBackend {
    session_id: Option<&'static str>,
    statuses: Mutex<VecDeque<&'static str>>,
    /// Frames served on the question stream; `None` answers 404.
    question: Option<Vec<&'static str>>,
    submitted: Mutex<Vec<Value>>,
    status_calls: AtomicUsize,
}

async fn new_session(State(mock): State<Arc<MockBackend>>) -> Json<Value> {
    Json(match mock.session_id {
        Some(id) => json!({ "session_id": id }),
        None => json!({ "detail": "no session for you" }),
    })
}

async fn submit(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Json<Value> {
    mock.submitted.lock().unwrap().push(body);
    Json(json!({ "ok": true }))
}

async fn status(State(mock): State<Arc<MockBackend>>, Path(_id): Path<String>) -> Response {
    mock.status_calls.fetch_add(1, Ordering::SeqCst);
    match mock.statuses.lock().unwrap().pop_front() {
        Some(status) => Json(json!({ "status": status })).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn question(State(mock): State<Arc<MockBackend>>, Path(_id): Path<String>) -> Response {
    match &mock.question {
        Some(frames) => {
            let events: Vec<Result<Event, Infallible>> =
                frames.iter().map(|data| Ok(Event::default().data(*data))).collect();
            Sse::new(stream::iter(events)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn flights(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({
        "flights": [{
            "airline": "EVA Air",
            "flight_number": "BR 198",
            "departure_airport": { "name": "Taoyuan International Airport", "id": "TPE", "time": "2025-07-01 08:50" },
            "arrival_airport": { "name": "Narita International Airport", "id": "NRT", "time": "2025-07-01 13:05" },
            "duration": 195,
            "airplane": "Boeing 787",
            "travel_class": "Economy",
            "price": 12345,
            "carbon_emissions": { "this_flight": 210000 }
        }]
    }))
}

async fn hotels(Path(_id): Path<String>) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "hotel search unavailable").into_response()
}

async fn serve(mock: MockBackend) -> (ClientConfig, Arc<MockBackend>) {
    let mock = Arc::new(mock);
    let api = Router::new()
        .route("/slot/new_session", get(new_session))
        .route("/slot/collection/start", post(submit))
        .route("/slot/collection/stream/{id}", get(question))
        .route("/slot/{id}", get(status))
        .route("/flight/{id}", get(flights))
        .route("/hotel/{id}", get(hotels))
        .with_state(mock.clone());
    let app = Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        api_url: format!("http://{addr}"),
        ..ClientConfig::default()
    };
    (config, mock)
}

fn service(config: &ClientConfig) -> ConversationService<HttpBackend> {
    ConversationService::new(HttpBackend::new(config).unwrap(), ConversationOptions::from(config))
}

#[tokio::test]
async fn full_conversation_over_http() {
    let (config, mock) = serve(MockBackend {
        session_id: Some("abc"),
        statuses: Mutex::new(VecDeque::from(["incomplete", "complete"])),
        question: Some(vec!["Where ", "are you ", "flying to?", "[DONE]"]),
        ..MockBackend::default()
    })
    .await;
    let mut svc = service(&config);

    svc.start().await;
    assert_eq!(svc.state().phase, Phase::Questioning);
    assert_eq!(svc.state().transcript.len(), 1);
    assert_eq!(svc.state().transcript[0].content, "Where are you flying to?");
    assert!(!svc.state().is_loading);

    assert_eq!(svc.submit("Tokyo").await, SubmitOutcome::Accepted);

    let submitted = mock.submitted.lock().unwrap().clone();
    assert_eq!(submitted, vec![json!({ "session_id": "abc", "message": "Tokyo" })]);

    let state = svc.state();
    assert_eq!(state.phase, Phase::Done);
    assert!(state.is_complete);
    assert!(state.last_error.is_none());
    assert_eq!(state.transcript.len(), 5);
    assert_eq!(state.transcript[1].role, MessageRole::User);

    let flights = &state.transcript[3].content;
    assert!(flights.contains("### 1. EVA Air BR 198"));
    assert!(flights.contains("3h 15m"));
    assert!(flights.contains("NT$ 12,345"));
    assert!(state.transcript[4].content.contains(NO_HOTELS));
}

#[tokio::test]
async fn missing_session_id_stops_the_conversation() {
    let (config, mock) = serve(MockBackend::default()).await;
    let mut svc = service(&config);

    svc.start().await;

    let state = svc.state();
    assert_eq!(state.phase, Phase::Errored);
    assert!(!state.is_loading);
    assert!(state.last_error.as_ref().is_some_and(ClientError::is_validation));
    assert_eq!(mock.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stream_cut_before_sentinel_is_recoverable() {
    let (config, _mock) = serve(MockBackend {
        session_id: Some("abc"),
        statuses: Mutex::new(VecDeque::from(["in_progress"])),
        question: Some(vec!["Where "]),
        ..MockBackend::default()
    })
    .await;
    let mut svc = service(&config);

    svc.start().await;

    let state = svc.state();
    assert_eq!(state.transcript[0].content, "Where ");
    assert!(state.last_error.as_ref().is_some_and(ClientError::is_stream));
    assert_eq!(state.phase, Phase::Questioning);
    assert!(state.accepts_input());
}

#[tokio::test]
async fn unavailable_stream_endpoint_reports_its_status() {
    let (config, _mock) = serve(MockBackend {
        session_id: Some("abc"),
        statuses: Mutex::new(VecDeque::from(["incomplete"])),
        question: None,
        ..MockBackend::default()
    })
    .await;
    let mut svc = service(&config);

    svc.start().await;

    let state = svc.state();
    assert_eq!(state.transcript.len(), 1);
    assert!(state.transcript[0].content.is_empty());
    let error = state.last_error.as_ref().unwrap();
    assert!(error.is_stream());
    assert!(error.to_string().contains("API Error (slot question): 404"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn status_endpoint_failure_is_a_transport_error() {
    let (config, _mock) = serve(MockBackend {
        session_id: Some("abc"),
        ..MockBackend::default()
    })
    .await;
    let api = ApiClient::new(&config).unwrap();

    let err = api.slot_status("abc").await.unwrap_err();
    assert_eq!(err.to_string(), "API Error (check status): 500");
    assert!(err.is_transport());
}
