mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{noun_body, verb_body, TestServer};
use ruso_api::types::Role;

async fn create(server: &TestServer, token: &str, path: &str, body: &Value) -> Result<Value> {
    let res = server.client.post(server.url(path)).bearer_auth(token).json(body).send().await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

async fn list(server: &TestServer, query: &str) -> Result<Value> {
    let res = server.client.get(server.url(&format!("/api/verbs?{}", query))).send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "list failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

fn ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn translation_filter_narrows_verbs() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;

    let amar = create(&server, &teacher, "/api/verbs", &verb_body("любить_полюбить", json!([{"es": ["amar"]}]))).await?;
    create(&server, &teacher, "/api/verbs", &verb_body("ненавидеть_возненавидеть", json!([{"es": ["odiar"]}]))).await?;
    create(&server, &teacher, "/api/verbs", &verb_body("любить_en", json!([{"en": ["love"]}]))).await?;

    let page = list(&server, "translation_lang=es&translation_text=am").await?;
    assert_eq!(ids(&page), vec![amar["id"].as_i64().unwrap_or_default()]);
    assert_eq!(page["total"], 1);
    assert_eq!(page["total_pages"], 1);

    // Only one of language and text: the filter is inactive
    let page = list(&server, "translation_lang=es").await?;
    assert_eq!(page["total"], 3);
    Ok(())
}

#[tokio::test]
async fn filtered_pages_report_the_filtered_total() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;
    for i in 0..3 {
        create(&server, &teacher, "/api/verbs", &verb_body(&format!("v{}", i), json!([{"es": ["hablar"]}]))).await?;
    }

    let page = list(&server, "page=1&per_page=1&translation_lang=es&translation_text=habl").await?;
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["per_page"], 1);

    let beyond = list(&server, "page=9&per_page=1").await?;
    assert!(ids(&beyond).is_empty());
    assert_eq!(beyond["total"], 3);

    let far = list(&server, &format!("page={}&per_page=20", i64::MAX)).await?;
    assert!(ids(&far).is_empty());
    assert_eq!(far["total"], 3);
    assert_eq!(far["total_pages"], 1);
    Ok(())
}

#[tokio::test]
async fn legacy_translation_input_is_normalized() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;

    let noun = create(
        &server,
        &teacher,
        "/api/nouns",
        &noun_body("дом", json!({"language": "es", "translation": "casa"})),
    )
    .await?;
    assert_eq!(noun["translations"], json!([{"es": ["casa"]}]));
    assert_eq!(
        noun["declension"]["singular"]["nominative"],
        json!({"word": "дом-nominative", "accent": "дом-nominative", "phonetics": ""})
    );

    let res = server
        .client
        .get(server.url("/api/nouns?translation_lang=es&translation_text=cas&gender=masculine"))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn writes_are_role_gated_and_unique() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;
    let (_, student) = server.user_token("student", Role::Student).await?;
    let body = noun_body("кот", json!([{"es": ["gato"]}]));

    let res = server.client.post(server.url("/api/nouns")).bearer_auth(&student).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.post(server.url("/api/nouns")).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let noun = create(&server, &teacher, "/api/nouns", &body).await?;
    let res = server.client.post(server.url("/api/nouns")).bearer_auth(&teacher).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let id = noun["id"].as_i64().unwrap_or_default();
    let res = server
        .client
        .put(server.url(&format!("/api/nouns/{}", id)))
        .bearer_auth(&teacher)
        .json(&json!({"gender": "feminine"}))
        .send()
        .await?;
    let updated: Value = res.json().await?;
    assert_eq!(updated["data"]["gender"], "feminine");
    assert_eq!(updated["data"]["noun"], "кот");

    let res = server
        .client
        .delete(server.url(&format!("/api/nouns/{}", id)))
        .bearer_auth(&teacher)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.get(server.url(&format!("/api/nouns/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn incomplete_entries_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;

    let mut noun = noun_body("дом", json!([]));
    noun["declension"]["plural"] = json!({});
    let res = server.client.post(server.url("/api/nouns")).bearer_auth(&teacher).json(&noun).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"].get("declension.plural.nominative").is_some());

    let mut verb = verb_body("a_b", json!([]));
    verb["conjugationType"] = json!(5);
    let res = server.client.post(server.url("/api/verbs")).bearer_auth(&teacher).json(&verb).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn verbs_are_found_by_pair_id() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, teacher) = server.user_token("teacher", Role::Teacher).await?;
    let verb = create(&server, &teacher, "/api/verbs", &verb_body("читать_прочитать", json!([{"es": ["leer"]}]))).await?;

    let res = server.client.get(server.url("/api/verbs/pair/читать_прочитать")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["id"], verb["id"]);
    assert_eq!(body["data"]["conjugationType"], 1);
    assert_eq!(body["data"]["imperfective"]["infinitive"]["word"]["word"], "читать_прочитать-ipf");

    let res = server.client.get(server.url("/api/verbs/pair/nothing")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.get(server.url("/api/verbs?conjugationType=abc")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
