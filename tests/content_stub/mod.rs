use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

#[derive(Debug, Clone, Default)]
pub struct ContentStubConfig {
    /// Raw records; the stub applies the published/language/slug filters and
    /// sorts by `order` like the real CMS.
    pub records: Vec<Value>,
    pub behavior: StubBehavior,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default)]
pub enum StubBehavior {
    #[default]
    Serve,
    /// Every request answers 500.
    Fail,
    /// Every request answers `{}` without a `data` field.
    NoData,
}

pub struct ContentStub {
    pub base_url: String,
    queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
pub fn record(slug: &str, language: &str, order: i64) -> Value {
    json!({
        "id": order,
        "slug": slug,
        "title": format!("Title {slug}"),
        "description": format!("About {slug}"),
        "content": format!("## Overview of {slug}\n\nBody.\n\n### Details\n\nMore."),
        "category": null,
        "parentTitle": null,
        "order": order,
        "language": language,
        "isPublished": true,
        "updatedAt": "2026-01-02T03:04:05.000Z",
    })
}

impl ContentStub {
    pub fn spawn(config: ContentStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start content stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let queries = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&queries);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
                if request.method() != &tiny_http::Method::Get || path != "/api/documentations" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let params: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                seen.lock().unwrap().push(params.clone());

                let body = match config.behavior {
                    StubBehavior::Fail => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("internal error")
                                .with_status_code(500),
                        );
                        continue;
                    }
                    StubBehavior::NoData => json!({}),
                    StubBehavior::Serve => json!({ "data": select(&config.records, &params) }),
                };

                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"application/json"[..],
                )
                .expect("content-type header");
                let _ = request.respond(
                    tiny_http::Response::from_string(body.to_string()).with_header(header),
                );
            }
        });

        Self {
            base_url,
            queries,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Decoded query parameters of every request received so far.
    #[allow(dead_code)]
    pub fn queries(&self) -> Vec<Vec<(String, String)>> {
        self.queries.lock().unwrap().clone()
    }
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn select(records: &[Value], params: &[(String, String)]) -> Vec<Value> {
    let language = param(params, "filters[language][$eq]");
    let slug = param(params, "filters[slug][$eq]");
    let published_only = param(params, "filters[isPublished][$eq]") == Some("true");

    let mut out: Vec<Value> = records
        .iter()
        .filter(|r| !published_only || r["isPublished"] == json!(true))
        .filter(|r| language.is_none_or(|lang| r["language"] == json!(lang)))
        .filter(|r| slug.is_none_or(|slug| r["slug"] == json!(slug)))
        .cloned()
        .collect();
    out.sort_by_key(|r| r["order"].as_i64().unwrap_or_default());
    out
}

impl Drop for ContentStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
