// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type Route = (String, String);

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Each route serves its responses in order and keeps repeating the last one,
/// so a sequence models an object whose status changes between polls.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Route, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, sequence: Vec<(u16, String)>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), sequence.into());
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, vec![(status, body.to_string())])
    }

    /// Add a sequence of responses for GET requests matching the exact path
    pub fn on_get_sequence(self, path: &str, sequence: Vec<(u16, String)>) -> Self {
        self.on("GET", path, sequence)
    }

    /// Add a response for PATCH requests (server-side apply) matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, vec![(status, body.to_string())])
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, vec![(status, body.to_string())])
    }

    /// Number of requests received for a method and path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p, _)| m == method && p == path)
            .count()
    }

    /// Query string of the most recent request for a method and path
    pub fn last_query(&self, method: &str, path: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, p, _)| m == method && p == path)
            .map(|(_, _, q)| q.clone())
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn next_response(&self, method: &str, path: &str, query: &str) -> Option<(u16, String)> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), query.to_string()));

        let mut responses = self.responses.lock().unwrap();
        let sequence = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if sequence.len() > 1 {
            sequence.pop_front()
        } else {
            sequence.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();

        let (status, body) = self
            .next_response(&method, &path, &query)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Path of a namespaced chaos-mesh.org object
pub fn chaos_mesh_path(plural: &str, namespace: &str, name: &str) -> String {
    format!(
        "/apis/chaos-mesh.org/v1alpha1/namespaces/{}/{}/{}",
        namespace, plural, name
    )
}

/// Create a mock PodChaos JSON response, with a status phase when given
pub fn pod_chaos_json(namespace: &str, name: &str, phase: Option<&str>) -> String {
    let mut object = serde_json::json!({
        "apiVersion": "chaos-mesh.org/v1alpha1",
        "kind": "PodChaos",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "spec": {
            "action": "pod-kill",
            "mode": "one",
            "selector": {"labelSelectors": {"app": "nginx"}}
        }
    });
    if let Some(phase) = phase {
        object["status"] = serde_json::json!({"experiment": {"desiredPhase": phase}});
    }
    object.to_string()
}

/// Create a Status response such as a 404 not found or a 500 internal error
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
