#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use course_admin::api::router;
use course_admin::client::{ResourceClient, ResourcePaths};
use course_admin::db;
use course_admin::error::NetworkFailure;
use course_admin::models::{Course, CourseFields};
use course_admin::state::AppState;
use course_admin::validation::{Schema, ValidationConfig};
use tokio::sync::Notify;

pub fn schema() -> Arc<Schema> {
    Arc::new(Schema::course(&ValidationConfig::default()).expect("default schema"))
}

pub fn course(id: &str, name: &str, description: &str) -> Course {
    Course {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

#[derive(Default)]
struct Backing {
    courses: Vec<Course>,
    next_id: usize,
    fail_list: bool,
    fail_mutations: bool,
    calls: Vec<&'static str>,
    list_gates: VecDeque<Arc<Notify>>,
    mutation_gates: VecDeque<Arc<Notify>>,
}

/// In-memory stand-in for the course API. A list answers with the courses
/// held when the call began, even if it is held back by a gate.
#[derive(Default)]
pub struct FakeClient {
    backing: Mutex<Backing>,
    /// Signalled when a gated call is waiting on its gate.
    pub started: Arc<Notify>,
}

impl FakeClient {
    pub fn new(courses: Vec<Course>) -> Self {
        let next_id = courses.len() + 1;
        Self {
            backing: Mutex::new(Backing {
                courses,
                next_id,
                ..Backing::default()
            }),
            ..Self::default()
        }
    }

    /// Holds the next list call until the returned gate is notified.
    pub fn gate_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.backing.lock().unwrap().list_gates.push_back(gate.clone());
        gate
    }

    /// Holds the next create, update or delete until the returned gate is
    /// notified.
    pub fn gate_next_mutation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.backing
            .lock()
            .unwrap()
            .mutation_gates
            .push_back(gate.clone());
        gate
    }

    pub fn fail_list(&self, fail: bool) {
        self.backing.lock().unwrap().fail_list = fail;
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.backing.lock().unwrap().fail_mutations = fail;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.backing.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn server_courses(&self) -> Vec<Course> {
        self.backing.lock().unwrap().courses.clone()
    }

    /// A change made by someone else, invisible until the next reload.
    pub fn insert_directly(&self, course: Course) {
        self.backing.lock().unwrap().courses.push(course);
    }

    fn record_mutation(&self, call: &'static str) -> Option<Arc<Notify>> {
        let mut backing = self.backing.lock().unwrap();
        backing.calls.push(call);
        backing.mutation_gates.pop_front()
    }

    async fn wait(&self, gate: Option<Arc<Notify>>) {
        if let Some(gate) = gate {
            self.started.notify_one();
            gate.notified().await;
        }
    }

    fn failure(status: u16) -> NetworkFailure {
        NetworkFailure::Status {
            status,
            body: "fake failure".to_string(),
        }
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn list(&self) -> Result<Vec<Course>, NetworkFailure> {
        let (answer, gate) = {
            let mut backing = self.backing.lock().unwrap();
            backing.calls.push("list");
            let answer = if backing.fail_list {
                Err(Self::failure(503))
            } else {
                Ok(backing.courses.clone())
            };
            (answer, backing.list_gates.pop_front())
        };
        self.wait(gate).await;
        answer
    }

    async fn create(&self, fields: &CourseFields) -> Result<(), NetworkFailure> {
        let gate = self.record_mutation("create");
        self.wait(gate).await;
        let mut backing = self.backing.lock().unwrap();
        if backing.fail_mutations {
            return Err(Self::failure(500));
        }
        let id = format!("c{}", backing.next_id);
        backing.next_id += 1;
        backing.courses.push(fields.clone().with_id(id));
        Ok(())
    }

    async fn update(&self, id: &str, fields: &CourseFields) -> Result<(), NetworkFailure> {
        let gate = self.record_mutation("update");
        self.wait(gate).await;
        let mut backing = self.backing.lock().unwrap();
        if backing.fail_mutations {
            return Err(Self::failure(500));
        }
        match backing.courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                *course = fields.clone().with_id(id);
                Ok(())
            }
            None => Err(Self::failure(404)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), NetworkFailure> {
        let gate = self.record_mutation("delete");
        self.wait(gate).await;
        let mut backing = self.backing.lock().unwrap();
        if backing.fail_mutations {
            return Err(Self::failure(500));
        }
        let before = backing.courses.len();
        backing.courses.retain(|c| c.id != id);
        if backing.courses.len() == before {
            return Err(Self::failure(404));
        }
        Ok(())
    }
}

pub async fn app_state() -> AppState {
    let pool = db::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    AppState { db: pool, schema: schema() }
}

/// Serves the course API on an ephemeral port and returns its base url.
pub async fn spawn_api(paths: ResourcePaths) -> String {
    let app = router(app_state().await, "/api/v1/courses", &paths);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });
    format!("http://{}/api/v1/courses", addr)
}
