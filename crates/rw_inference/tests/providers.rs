use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use rw_core::{ArticleOutput, Error, Tone};
use rw_inference::models::{GeminiModel, OpenAIModel, VertexModel};
use rw_inference::{Config, GenerationModel, Provider};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const ARTICLE: &str = r#"{"title":"Le maire promet d'investir","lede":"La ville lance un plan.",
"hook":"« Nous investirons », a-t-il dit.",
"section1":{"intertitle":"Une annonce","paragraph":"Hier, le maire a parlé."},
"section2":{"intertitle":"La suite","paragraph":"Le budget sera voté."}}"#;

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    body: Value,
}

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<Captured>>>,
}

async fn record(
    State(mock): State<Mock>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.seen.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        headers,
        body,
    });
    (mock.status, Json(mock.reply.clone())).into_response()
}

/// Starts a stand-in provider on an ephemeral port and returns its base URL.
async fn spawn(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = Mock {
        status,
        reply,
        seen: seen.clone(),
    };
    let app = Router::new().fallback(record).with_state(mock);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

fn openai(base_url: String) -> OpenAIModel {
    let mut config =
        Config::new(Provider::OpenAI).with_base_url(Some(format!("{}/v1", base_url)));
    config.api_key = Some("sk-test".to_string());
    OpenAIModel::new(&config).unwrap()
}

#[tokio::test]
async fn test_openai_unauthorized_keeps_status_and_body() {
    let (url, _) = spawn(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided"}}),
    )
    .await;

    let err = openai(url).generate("Texte brut", None).await.unwrap_err();
    match &err {
        Error::Api {
            provider,
            status,
            status_text,
            body,
        } => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(*status, 401);
            assert_eq!(status_text, "Unauthorized");
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_openai_round_trip() {
    let fenced = format!("```json\n{}\n```", ARTICLE);
    let (url, seen) = spawn(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": fenced}}]}),
    )
    .await;

    let raw = openai(url).generate("Le maire a parlé.", Some("formel")).await.unwrap();
    let article: ArticleOutput = serde_json::from_str(&raw).unwrap();
    let expected: ArticleOutput = serde_json::from_str(ARTICLE).unwrap();
    assert_eq!(article, expected);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.headers["authorization"], "Bearer sk-test");
    assert_eq!(request.body["model"], "gpt-4o");
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert_eq!(request.body["messages"][0]["role"], "system");
    let user = request.body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains(Tone::Formel.description()));
    assert!(user.contains("Le maire a parlé."));
}

#[tokio::test]
async fn test_openai_without_choices_is_unexpected_output() {
    let (url, _) = spawn(StatusCode::OK, json!({"choices": []})).await;
    let err = openai(url).generate("Texte", None).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedOutput { .. }));
}

#[tokio::test]
async fn test_gemini_uses_api_key_header() {
    let (url, seen) = spawn(
        StatusCode::OK,
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": ARTICLE}]}}]}),
    )
    .await;

    let mut config = Config::new(Provider::Gemini).with_base_url(Some(url));
    config.api_key = Some("gemini-key".to_string());
    let model = GeminiModel::new(&config).unwrap();

    let raw = model.generate("Texte", Some("descriptif")).await.unwrap();
    assert_eq!(raw, ARTICLE);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].path, "/v1beta/models/gemini-1.5-flash:generateContent");
    assert_eq!(seen[0].headers["x-goog-api-key"], "gemini-key");
    assert_eq!(seen[0].body["generationConfig"]["responseMimeType"], "application/json");
    let text = seen[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(text.contains(Tone::Descriptif.description()));
    assert!(text.contains("Correction Orthographique Autorisée"));
}

#[tokio::test]
async fn test_vertex_prose_answer_is_rejected() {
    let (url, seen) = spawn(
        StatusCode::OK,
        json!({"candidates": [{"content": {"parts": [{"text": "Voici l'article demandé."}]}}]}),
    )
    .await;

    let mut config = Config::new(Provider::Vertex).with_base_url(Some(url));
    config.api_key = Some("ya29.token".to_string());
    config.project_id = Some("projet".to_string());
    let model = VertexModel::new(&config).unwrap();

    let err = model.generate("Texte", None).await.unwrap_err();
    match err {
        Error::UnexpectedOutput { preview, .. } => assert!(preview.starts_with("Voici")),
        other => panic!("unexpected error: {:?}", other),
    }

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].path,
        "/v1/projects/projet/locations/us-central1/publishers/google/models/gemini-1.5-pro-preview-0409:generateContent"
    );
    assert_eq!(seen[0].headers["authorization"], "Bearer ya29.token");
}

/// Answers one request with a 500 whose body stops short of its declared length.
async fn spawn_truncated() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        // Consume the whole request so closing the socket is a clean EOF.
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + len {
                    break;
                }
            }
        }
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
content-type: text/plain\r\ncontent-length: 64\r\n\r\npartial",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_unreadable_error_body_is_reported() {
    let model = openai(spawn_truncated().await);

    let err = model.generate("Texte", None).await.unwrap_err();
    match err {
        Error::Api {
            status,
            status_text,
            body,
            ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
            assert!(body.starts_with("<unreadable body: "), "body was {:?}", body);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
