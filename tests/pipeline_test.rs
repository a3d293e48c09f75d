use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use studymate_backend::{
    build_router, config::Config, database::pool::create_memory_pool, AppState,
};
use tower::ServiceExt;

const STUDY_TEXT: &str = "Photosynthesis converts light to energy. Mitosis is cell division.";

fn model_envelope() -> String {
    let generated = json!({
        "flashcards": [
            { "question": "What is photosynthesis?", "answer": "Converting light to energy" },
            { "question": "What is mitosis?", "answer": "Cell division" },
            { "question": "Q3", "answer": "A3" },
            { "question": "Q4", "answer": "A4" }
        ]
    })
    .to_string();
    json!({ "candidates": [{ "content": { "parts": [{ "text": generated }] } }] }).to_string()
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "student-1");
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn text_to_flashcards_to_quiz_to_history() {
    let mut server = mockito::Server::new_async().await;
    let model = server
        .mock("POST", "/v1beta/models/gemini:generateContent")
        .match_query(mockito::Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(mockito::Matcher::Regex(
            "Mitosis is cell division".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(model_envelope())
        .expect(1)
        .create_async()
        .await;

    let config = Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_endpoint: format!("{}/v1beta/models/gemini:generateContent", server.url()),
        generation_rps: 10,
    };
    let pool = create_memory_pool().await.expect("pool");
    let state = AppState::new(pool, &config).expect("state");
    let app = build_router(state, config.generation_rps);

    let (status, generated) = call(
        &app,
        "POST",
        "/api/flashcards/generate",
        Some(json!({ "content": STUDY_TEXT })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", generated);
    assert_eq!(generated["count"], 4);
    assert_eq!(generated["flashcards"][1]["answer"], "Cell division");
    model.assert_async().await;

    let (status, quiz) = call(
        &app,
        "POST",
        "/api/quizzes",
        Some(json!({ "flashcards": generated["flashcards"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = quiz["questions"].as_array().expect("questions").clone();
    assert_eq!(questions.len(), 4);
    for question in &questions {
        let options = question["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let mut distinct: Vec<&str> = options.iter().map(|o| o.as_str().unwrap()).collect();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 4);
    }

    let answers: Vec<i64> = questions
        .iter()
        .map(|q| q["correct_answer_index"].as_i64().unwrap())
        .collect();
    let (status, submitted) = call(
        &app,
        "POST",
        "/api/quizzes/submit",
        Some(json!({
            "source_text": STUDY_TEXT,
            "questions": questions,
            "answers": answers,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", submitted);
    assert_eq!(submitted["attempt"]["score"], 4);
    assert_eq!(submitted["attempt"]["total"], 4);
    assert_eq!(submitted["percentage"], 100);
    assert_eq!(submitted["performance"], "excellent");
    let id = submitted["id"].as_i64().unwrap();

    let (status, history) = call(&app, "GET", "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 1);
    assert_eq!(history["items"][0]["topics"], STUDY_TEXT);

    let (status, entry) = call(&app, "GET", &format!("/api/history/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["questions"].as_array().unwrap().len(), 4);
    assert!(entry["questions"]
        .as_array()
        .unwrap()
        .iter()
        .all(|q| q["is_correct"] == true));

    let (status, _) = call(&app, "DELETE", &format!("/api/history/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", &format!("/api/history/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
