//! In-process fake of the job board backend, bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use jobboard_client::{ClientConfig, JobBoard, MemoryStorage};

pub const JWT_SECRET: &str = "test-secret";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn fail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl UserRecord {
    fn public(&self) -> Value {
        json!({ "_id": self.id, "name": self.name, "email": self.email, "role": self.role })
    }

    fn reference(&self) -> Value {
        json!({ "_id": self.id, "name": self.name, "email": self.email })
    }

    fn is_staff(&self) -> bool {
        self.role == "recruiter" || self.role == "admin"
    }
}

#[derive(Debug, Default)]
struct Db {
    users: Vec<UserRecord>,
    tokens: HashMap<String, String>,
    jobs: Vec<Value>,
    applications: Vec<Value>,
    next_id: usize,
    last_search: Option<HashMap<String, String>>,
}

impl Db {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn user(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    fn job(&self, id: &str) -> Option<&Value> {
        self.jobs.iter().find(|j| j["_id"] == id)
    }

    fn issue_token(&mut self, user: &UserRecord) -> String {
        let token = mint_token(&user.id, &user.role, ChronoDuration::hours(1));
        self.tokens.insert(token.clone(), user.id.clone());
        token
    }

    fn populated_job(&self, job: &Value) -> Value {
        let mut job = job.clone();
        let poster = job["postedBy"].as_str().and_then(|id| self.user(id)).map(UserRecord::reference);
        if let Some(poster) = poster {
            job["postedBy"] = poster;
        }
        job
    }
}

static TOKEN_SERIAL: AtomicUsize = AtomicUsize::new(0);

/// Mint a backend-style JWT carrying `id`, `role`, `iat` and `exp`. A `jti`
/// keeps tokens minted within the same second distinct.
pub fn mint_token(user_id: &str, role: &str, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = json!({
        "id": user_id,
        "role": role,
        "iat": now.timestamp() - 1,
        "exp": (now + ttl).timestamp(),
        "jti": TOKEN_SERIAL.fetch_add(1, Ordering::SeqCst),
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[derive(Debug, Default)]
pub struct Backend {
    db: Mutex<Db>,
    hits: AtomicUsize,
    login_delay: Mutex<Option<Duration>>,
    request_delay: Mutex<Option<Duration>>,
}

impl Backend {
    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().expect("fake backend lock poisoned")
    }

    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: &str) -> String {
        let mut db = self.db();
        let id = db.next_id("u");
        db.users.push(UserRecord {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        });
        id
    }

    pub fn seed_job(&self, posted_by: &str, title: &str, location: &str, job_type: &str, category: &str) -> String {
        let mut db = self.db();
        let id = db.next_id("j");
        db.jobs.push(json!({
            "_id": id,
            "title": title,
            "company": "Acme",
            "location": location,
            "description": format!("{title} at Acme"),
            "salary": 50000,
            "type": job_type,
            "category": category,
            "postedBy": posted_by,
            "createdAt": Utc::now().to_rfc3339(),
        }));
        id
    }

    /// Forget every issued token, as if the backend rotated its secret.
    pub fn revoke_all_tokens(&self) {
        self.db().tokens.clear();
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().expect("lock") = Some(delay);
    }

    /// Hold every non-auth request for `delay` before answering it.
    pub fn set_request_delay(&self, delay: Duration) {
        *self.request_delay.lock().expect("lock") = Some(delay);
    }

    pub fn user_role(&self, id: &str) -> Option<String> {
        self.db().user(id).map(|u| u.role.clone())
    }

    pub fn user_count(&self) -> usize {
        self.db().users.len()
    }

    pub fn job_count(&self) -> usize {
        self.db().jobs.len()
    }

    pub fn last_search(&self) -> Option<HashMap<String, String>> {
        self.db().last_search.clone()
    }

    fn caller(&self, headers: &HeaderMap) -> Result<UserRecord, (StatusCode, Json<Value>)> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "No token, authorization denied"))?;

        let db = self.db();
        db.tokens
            .get(token)
            .and_then(|id| db.user(id))
            .cloned()
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Token is not valid"))
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new().nest("/api", routes(backend.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            backend,
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&format!("{}/api", self.base_url)).unwrap()
    }

    /// A restored client over fresh in-memory storage.
    pub fn client(&self) -> (JobBoard, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let board = JobBoard::start(&self.config(), storage.clone()).unwrap();
        (board, storage)
    }

    /// A client signed in as a freshly seeded user with `role`.
    pub async fn signed_in(&self, role: &str) -> (JobBoard, String) {
        let email = format!("{role}-{}@example.com", self.backend.user_count());
        let id = self.backend.seed_user(&format!("Test {role}"), &email, "secret", role);
        let (board, _) = self.client();
        board.session.login(&email, "secret").await.unwrap();
        (board, id)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn routes(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/search", get(search_jobs))
        .route("/jobs/:id", get(get_job).delete(delete_job))
        .route("/applications", get(all_applications).post(apply))
        .route("/applications/my-applications", get(my_applications))
        .route("/applications/job/:job_id", get(applications_for_job))
        .route("/applications/:id/status", put(set_status))
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/role", put(set_role))
        .layer(middleware::from_fn_with_state(backend.clone(), count_hits))
        .with_state(backend)
}

async fn count_hits(State(backend): State<Arc<Backend>>, request: Request, next: Next) -> Response {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.request_delay.lock().expect("lock");
    if let Some(delay) = delay {
        if !request.uri().path().contains("/auth/") {
            tokio::time::sleep(delay).await;
        }
    }
    next.run(request).await
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Reply {
    let delay = *backend.login_delay.lock().expect("lock");
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut db = backend.db();
    let user = db
        .users
        .iter()
        .find(|u| u.email == body["email"] && u.password == body["password"])
        .cloned()
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "Invalid credentials"))?;
    let token = db.issue_token(&user);
    Ok(Json(json!({ "token": token, "user": user.public() })))
}

async fn register(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Reply {
    let mut db = backend.db();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.users.iter().any(|u| u.email == email) {
        return Err(fail(StatusCode::BAD_REQUEST, "User already exists"));
    }

    let id = db.next_id("u");
    let user = UserRecord {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        role: body["role"].as_str().unwrap_or("jobseeker").to_string(),
    };
    db.users.push(user.clone());
    let token = db.issue_token(&user);

    // Registration answers with the identity inlined next to the token.
    let mut reply = user.public();
    reply["token"] = json!(token);
    Ok(Json(reply))
}

async fn list_jobs(State(backend): State<Arc<Backend>>) -> Reply {
    let db = backend.db();
    let jobs: Vec<Value> = db.jobs.iter().map(|j| db.populated_job(j)).collect();
    Ok(Json(json!(jobs)))
}

async fn search_jobs(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let mut db = backend.db();
    db.last_search = Some(params.clone());

    let contains = |field: &Value, needle: &str| {
        field
            .as_str()
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase()))
    };
    let jobs: Vec<Value> = db
        .jobs
        .iter()
        .filter(|job| {
            params.get("keyword").is_none_or(|k| contains(&job["title"], k) || contains(&job["description"], k))
                && params.get("location").is_none_or(|l| contains(&job["location"], l))
                && params.get("type").is_none_or(|t| job["type"] == t.as_str())
                && params.get("category").is_none_or(|c| job["category"] == c.as_str())
        })
        .map(|j| db.populated_job(j))
        .collect();
    Ok(Json(json!(jobs)))
}

async fn get_job(State(backend): State<Arc<Backend>>, Path(id): Path<String>) -> Reply {
    let db = backend.db();
    db.job(&id)
        .map(|j| Json(db.populated_job(j)))
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Job not found"))
}

async fn create_job(State(backend): State<Arc<Backend>>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let caller = backend.caller(&headers)?;
    if !caller.is_staff() {
        return Err(fail(StatusCode::FORBIDDEN, "Access denied"));
    }

    let mut db = backend.db();
    let mut job = body;
    job["_id"] = json!(db.next_id("j"));
    job["postedBy"] = json!(caller.id);
    job["createdAt"] = json!(Utc::now().to_rfc3339());
    db.jobs.push(job.clone());
    Ok(Json(db.populated_job(&job)))
}

async fn delete_job(State(backend): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    let caller = backend.caller(&headers)?;
    let mut db = backend.db();
    let job = db.job(&id).cloned().ok_or_else(|| fail(StatusCode::NOT_FOUND, "Job not found"))?;
    if caller.role != "admin" && job["postedBy"] != caller.id.as_str() {
        return Err(fail(StatusCode::FORBIDDEN, "Not authorized to delete this job"));
    }
    db.jobs.retain(|j| j["_id"] != id.as_str());
    Ok(Json(json!({ "message": "Job deleted" })))
}

async fn apply(State(backend): State<Arc<Backend>>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    let caller = backend.caller(&headers)?;

    let mut job_id = String::new();
    let mut cover_letter = String::new();
    let mut resume = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed form"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobId" => job_id = field.text().await.unwrap_or_default(),
            "coverLetter" => cover_letter = field.text().await.unwrap_or_default(),
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field.bytes().await.unwrap_or_default();
                if !bytes.is_empty() {
                    resume = Some(format!("uploads/{file_name}"));
                }
            }
            _ => {}
        }
    }

    let mut db = backend.db();
    if db.job(&job_id).is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "Job not found"));
    }
    let duplicate = db
        .applications
        .iter()
        .any(|a| a["job"] == job_id.as_str() && a["applicant"] == caller.id.as_str());
    if duplicate {
        return Err(fail(StatusCode::BAD_REQUEST, "Already applied"));
    }

    let application = json!({
        "_id": db.next_id("a"),
        "job": job_id,
        "applicant": caller.id,
        "coverLetter": cover_letter,
        "resume": resume,
        "status": "pending",
        "createdAt": Utc::now().to_rfc3339(),
    });
    db.applications.push(application.clone());
    Ok(Json(application))
}

async fn my_applications(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    let caller = backend.caller(&headers)?;
    let db = backend.db();
    let mine: Vec<Value> = db
        .applications
        .iter()
        .filter(|a| a["applicant"] == caller.id.as_str())
        .map(|a| {
            let mut a = a.clone();
            if let Some(job) = a["job"].as_str().and_then(|id| db.job(id)) {
                a["job"] = db.populated_job(job);
            }
            a
        })
        .collect();
    Ok(Json(json!(mine)))
}

async fn all_applications(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    let caller = backend.caller(&headers)?;
    if !caller.is_staff() {
        return Err(fail(StatusCode::FORBIDDEN, "Access denied"));
    }

    let db = backend.db();
    let visible: Vec<Value> = db
        .applications
        .iter()
        .filter_map(|a| {
            let job = db.job(a["job"].as_str()?)?;
            if caller.role != "admin" && job["postedBy"] != caller.id.as_str() {
                return None;
            }
            let mut a = a.clone();
            a["job"] = job.clone();
            if let Some(applicant) = a["applicant"].as_str().and_then(|id| db.user(id)) {
                a["applicant"] = applicant.reference();
            }
            Some(a)
        })
        .collect();
    Ok(Json(json!(visible)))
}

async fn applications_for_job(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Reply {
    let caller = backend.caller(&headers)?;
    if !caller.is_staff() {
        return Err(fail(StatusCode::FORBIDDEN, "Access denied"));
    }

    let db = backend.db();
    let rows: Vec<Value> = db
        .applications
        .iter()
        .filter(|a| a["job"] == job_id.as_str())
        .map(|a| {
            let mut a = a.clone();
            if let Some(applicant) = a["applicant"].as_str().and_then(|id| db.user(id)) {
                a["applicant"] = applicant.reference();
            }
            a
        })
        .collect();
    Ok(Json(json!(rows)))
}

async fn set_status(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let caller = backend.caller(&headers)?;
    if !caller.is_staff() {
        return Err(fail(StatusCode::FORBIDDEN, "Access denied"));
    }

    let mut db = backend.db();
    let application = db
        .applications
        .iter_mut()
        .find(|a| a["_id"] == id.as_str())
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Application not found"))?;
    application["status"] = body["status"].clone();
    Ok(Json(application.clone()))
}

fn require_admin(backend: &Backend, headers: &HeaderMap) -> Result<UserRecord, (StatusCode, Json<Value>)> {
    let caller = backend.caller(headers)?;
    if caller.role != "admin" {
        return Err(fail(StatusCode::FORBIDDEN, "Admin access required"));
    }
    Ok(caller)
}

async fn list_users(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    require_admin(&backend, &headers)?;
    let db = backend.db();
    let rows: Vec<Value> = db
        .users
        .iter()
        .map(|u| {
            let mut row = u.public();
            row["createdAt"] = json!("2024-03-01T10:00:00.000Z");
            row
        })
        .collect();
    Ok(Json(json!(rows)))
}

async fn delete_user(State(backend): State<Arc<Backend>>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    require_admin(&backend, &headers)?;
    let mut db = backend.db();
    let before = db.users.len();
    db.users.retain(|u| u.id != id);
    if db.users.len() == before {
        return Err(fail(StatusCode::NOT_FOUND, "User not found"));
    }
    Ok(Json(json!({ "message": "User deleted" })))
}

async fn set_role(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    require_admin(&backend, &headers)?;
    let mut db = backend.db();
    let user = db
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "User not found"))?;
    user.role = body["role"].as_str().unwrap_or_default().to_string();
    Ok(Json(user.public()))
}
