use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use visitor_log::errors::{ApiError, ViewError};
use visitor_log::models::{Entry, EntryFields, Field};
use visitor_log::{EntryApi, HttpEntryApi, ViewController};

#[derive(Debug, Deserialize)]
struct Created {
    message: String,
    id: i64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_db_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("visitor_log_http_{}_{}.sqlite", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/entries")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_visitor_log"))
        .env("PORT", port.to_string())
        .env("SCHEDULE_DB_PATH", unique_db_path())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn body(reg: &str, company: &str, date: &str, time: &str) -> Value {
    json!({
        "regNumber": reg,
        "name": "Visitor",
        "companyName": company,
        "duration": time,
        "date": date,
        "roomNumber": "3A"
    })
}

async fn list(client: &Client, base_url: &str) -> Vec<Entry> {
    client
        .get(format!("{base_url}/entries"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, base_url: &str, payload: &Value) -> i64 {
    let response = client
        .post(format!("{base_url}/add-entry"))
        .json(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Created = response.json().await.unwrap();
    assert_eq!(created.message, "Entry saved successfully");
    created.id
}

#[tokio::test]
async fn http_create_then_list_contains_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url).await;
    let id = create(&client, &server.base_url, &body("HTTP-1", "Acme", "2030-01-01", "09:00")).await;
    let after = list(&client, &server.base_url).await;

    assert!(before.iter().all(|entry| entry.id != id));
    assert_eq!(after.len(), before.len() + 1);
    let created: Vec<_> = after.iter().filter(|entry| entry.id == id).collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].fields.reg_number, "HTTP-1");
    assert_eq!(created[0].fields.company_name, "Acme");
    assert_eq!(created[0].fields.room_number, "3A");
}

#[tokio::test]
async fn http_list_is_ordered_by_date_and_time() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create(&client, &server.base_url, &body("ORD-1", "Acme", "2031-01-02", "09:00")).await;
    create(&client, &server.base_url, &body("ORD-2", "Acme", "2031-01-01", "10:00")).await;

    let keys: Vec<_> = list(&client, &server.base_url)
        .await
        .iter()
        .map(|entry| entry.fields.sort_key())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn http_missing_field_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = list(&client, &server.base_url).await;

    let mut payload = body("BAD", "Acme", "2030-01-01", "09:00");
    payload["companyName"] = json!("");
    let response = client
        .post(format!("{}/add-entry", server.base_url))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "All fields are required");

    let response = client
        .post(format!("{}/add-entry", server.base_url))
        .json(&json!({ "regNumber": "BAD" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/add-entry", server.base_url))
        .header("content-type", "application/json")
        .body("[1, 2")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "All fields are required");
    assert!(error["details"].is_string());

    assert_eq!(list(&client, &server.base_url).await.len(), before.len());
}

#[tokio::test]
async fn http_numeric_field_is_stored_as_text() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut payload = body("NUM-1", "Acme", "2030-06-01", "09:00");
    payload["roomNumber"] = json!(101);
    let id = create(&client, &server.base_url, &payload).await;

    let entries = list(&client, &server.base_url).await;
    let stored = entries.iter().find(|entry| entry.id == id).unwrap();
    assert_eq!(stored.fields.room_number, "101");
}

#[tokio::test]
async fn http_update_replaces_fields_and_reports_missing_rows() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let id = create(&client, &server.base_url, &body("UPD-1", "Acme", "2030-02-01", "09:00")).await;

    let response = client
        .put(format!("{}/update-entry/{id}", server.base_url))
        .json(&body("UPD-2", "Globex", "2030-02-03", "11:30"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let message: Value = response.json().await.unwrap();
    assert_eq!(message["message"], "Entry updated successfully");

    let entries = list(&client, &server.base_url).await;
    let updated = entries.iter().find(|entry| entry.id == id).unwrap();
    assert_eq!(updated.fields.reg_number, "UPD-2");
    assert_eq!(updated.fields.company_name, "Globex");
    assert_eq!(updated.fields.date, "2030-02-03");
    assert_eq!(updated.fields.duration, "11:30");

    let missing = entries.iter().map(|entry| entry.id).max().unwrap() + 1000;
    let response = client
        .put(format!("{}/update-entry/{missing}", server.base_url))
        .json(&body("GHOST", "Nobody", "2030-02-03", "11:30"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Entry not found");
    assert_eq!(list(&client, &server.base_url).await, entries);

    let mut blank = body("UPD-3", "Acme", "2030-02-03", "11:30");
    blank["duration"] = json!("  ");
    let response = client
        .put(format!("{}/update-entry/{id}", server.base_url))
        .json(&blank)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(list(&client, &server.base_url).await, entries);
}

#[tokio::test]
async fn http_delete_removes_entry_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let id = create(&client, &server.base_url, &body("DEL-1", "Acme", "2030-03-01", "09:00")).await;

    let response = client
        .delete(format!("{}/delete-entry/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(list(&client, &server.base_url).await.iter().all(|entry| entry.id != id));

    let response = client
        .delete(format!("{}/delete-entry/{id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{}/delete-entry/not-a-number", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_index_renders_filtered_table() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let id = create(&client, &server.base_url, &body("IDX-1", "Umbrella Corp", "2030-04-01", "09:00")).await;

    let html = client
        .get(format!("{}/?q=umbrella", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains(&format!(r#"<tr data-id="{id}">"#)));
    assert!(html.contains(r#"value="umbrella""#));
    assert!(html.contains(r#"<div id="noResults" hidden>"#));
}

#[tokio::test]
async fn http_view_controller_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let mut controller = ViewController::new(HttpEntryApi::new(server.base_url.clone()));
    controller.load().await.unwrap();

    let input = EntryFields {
        reg_number: "VIEW-1".into(),
        name: "Mary Jackson".into(),
        company_name: "Langley Unique".into(),
        duration: "08:45".into(),
        date: "2030-05-01".into(),
        room_number: "Wind Tunnel".into(),
    };
    for field in Field::ALL {
        controller.view_mut().set_form_field(field, input.get(field));
    }
    let id = controller.add().await.unwrap();

    controller.set_filter("langley unique");
    assert_eq!(controller.view().visible_count(), 1);

    controller.toggle_edit(id).await.unwrap();
    controller
        .view_mut()
        .edit_field(id, Field::RoomNumber, "Hangar 2")
        .unwrap();
    controller.toggle_edit(id).await.unwrap();

    let stored = controller.api().list().await.unwrap();
    let entry = stored.iter().find(|entry| entry.id == id).unwrap();
    assert_eq!(entry.fields.room_number, "Hangar 2");

    assert!(controller.delete(id, |_| true).await.unwrap());
    controller.set_filter("langley unique");
    let view = controller.view();
    assert_eq!(view.visible_count(), 0);
    if view.entry_count() > 0 {
        assert!(view.shows_no_results());
    } else {
        assert!(view.is_empty_state());
    }

    let err = controller.api().delete(id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(missing) if missing == id));

    let err = controller.toggle_edit(id).await.unwrap_err();
    assert!(matches!(err, ViewError::UnknownRow(_)));
}
