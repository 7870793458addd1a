//! In-process HTTP stub used by the request client and REST store tests.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct StubRequest {
  pub method: String,
  pub path: String,
  pub body: Vec<u8>,
}

impl StubRequest {
  pub fn json(&self) -> Value {
    serde_json::from_slice(&self.body).unwrap_or(Value::Null)
  }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
  pub status: u16,
  pub body: String,
}

impl StubResponse {
  pub fn json(status: u16, body: &Value) -> Self {
    Self {
      status,
      body: body.to_string(),
    }
  }

  pub fn text(status: u16, body: &str) -> Self {
    Self {
      status,
      body: body.to_string(),
    }
  }

  pub fn empty(status: u16) -> Self {
    Self::text(status, "")
  }
}

type Handler = Box<dyn FnMut(&StubRequest) -> StubResponse + Send>;

struct StubState {
  handler: Handler,
  hits: HashMap<String, usize>,
}

/// One-request-per-connection HTTP/1.1 server on a random local port.
pub struct StubServer {
  addr: SocketAddr,
  state: Arc<Mutex<StubState>>,
  task: JoinHandle<()>,
}

impl StubServer {
  pub async fn start<H>(handler: H) -> Self
  where
    H: FnMut(&StubRequest) -> StubResponse + Send + 'static,
  {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(StubState {
      handler: Box::new(handler),
      hits: HashMap::new(),
    }));

    let accept_state = Arc::clone(&state);
    let task = tokio::spawn(async move {
      while let Ok((stream, _)) = listener.accept().await {
        let state = Arc::clone(&accept_state);
        tokio::spawn(async move {
          serve(stream, state).await;
        });
      }
    });

    Self { addr, state, task }
  }

  pub fn url(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// Requests received for `method` + `path` (path includes the leading slash).
  pub fn hits(&self, method: &str, path: &str) -> usize {
    let state = self.state.lock().unwrap();
    state
      .hits
      .get(&format!("{} {}", method, path))
      .copied()
      .unwrap_or(0)
  }

  pub fn total_hits(&self) -> usize {
    self.state.lock().unwrap().hits.values().sum()
  }
}

impl Drop for StubServer {
  fn drop(&mut self) {
    self.task.abort();
  }
}

async fn serve(mut stream: TcpStream, state: Arc<Mutex<StubState>>) {
  let Some(request) = read_request(&mut stream).await else {
    return;
  };

  let response = {
    let mut state = state.lock().unwrap();
    *state
      .hits
      .entry(format!("{} {}", request.method, request.path))
      .or_insert(0) += 1;
    (state.handler)(&request)
  };

  let reason = StatusCode::from_u16(response.status)
    .ok()
    .and_then(|s| s.canonical_reason())
    .unwrap_or("Unknown");
  let head = format!(
    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
    response.status,
    reason,
    response.body.len()
  );

  let _ = stream.write_all(head.as_bytes()).await;
  let _ = stream.write_all(response.body.as_bytes()).await;
  let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<StubRequest> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 4096];

  let header_end = loop {
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      return None;
    }
    buf.extend_from_slice(&chunk[..n]);
    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      break pos + 4;
    }
  };

  let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
  let mut lines = head.lines();
  let mut request_line = lines.next()?.split_whitespace();
  let method = request_line.next()?.to_string();
  let path = request_line.next()?.to_string();

  let content_length = lines
    .filter_map(|line| line.split_once(':'))
    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
    .unwrap_or(0);

  let mut body = buf[header_end..].to_vec();
  while body.len() < content_length {
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      break;
    }
    body.extend_from_slice(&chunk[..n]);
  }

  Some(StubRequest { method, path, body })
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{}", addr)
}

/// In-memory stand-in for the scheduling REST backend.
///
/// Routes: `GET /dosen` (lecturer rows), `GET /data_dosen` (assignment rows),
/// `POST /data_dosen`, `DELETE /dosen/{id_dosen}/{id_mk_genap}`.
#[derive(Clone, Default)]
pub struct FakeBackend {
  pub lecturers: Arc<Mutex<Vec<Value>>>,
  pub rows: Arc<Mutex<Vec<Value>>>,
  pub fail_reads: Arc<Mutex<bool>>,
}

impl FakeBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_fail_reads(&self, fail: bool) {
    *self.fail_reads.lock().unwrap() = fail;
  }

  pub fn row_count(&self) -> usize {
    self.rows.lock().unwrap().len()
  }

  pub async fn serve(&self) -> StubServer {
    let backend = self.clone();
    StubServer::start(move |request| backend.handle(request)).await
  }

  fn handle(&self, request: &StubRequest) -> StubResponse {
    let segments: Vec<&str> = request
      .path
      .trim_start_matches('/')
      .split('/')
      .collect();

    match (request.method.as_str(), segments.as_slice()) {
      ("GET", ["dosen"]) => {
        let lecturers = self.lecturers.lock().unwrap();
        StubResponse::json(200, &Value::Array(lecturers.clone()))
      }
      ("GET", ["data_dosen"]) => {
        if *self.fail_reads.lock().unwrap() {
          return StubResponse::json(503, &json!({ "detail": "database unavailable" }));
        }
        let rows = self.rows.lock().unwrap();
        StubResponse::json(200, &Value::Array(rows.clone()))
      }
      ("POST", ["data_dosen"]) => {
        let row = request.json();
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows.iter().any(|r| {
          r["id_dosen"] == row["id_dosen"] && r["id_mk_genap"] == row["id_mk_genap"]
        });
        if duplicate {
          return StubResponse::json(409, &json!({ "detail": "already exists" }));
        }
        rows.push(row.clone());
        StubResponse::json(201, &row)
      }
      ("DELETE", ["dosen", id_dosen, id_mk_genap]) => {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| {
          r["id_dosen"].to_string() != *id_dosen || r["id_mk_genap"].to_string() != *id_mk_genap
        });
        if rows.len() == before {
          StubResponse::json(404, &json!({ "detail": "not found" }))
        } else {
          StubResponse::json(200, &json!({ "message": "deleted" }))
        }
      }
      _ => StubResponse::json(404, &json!({ "detail": "no route" })),
    }
  }
}
