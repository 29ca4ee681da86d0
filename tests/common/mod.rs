#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use cricbuzz_terminal::cricbuzz_api::{CricbuzzClient, Transport};
use cricbuzz_terminal::error::ApiError;
use cricbuzz_terminal::ttl_cache::ManualClock;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name)).expect("fixture should be valid json")
}

/// Transport that replays queued responses per path and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<Value, ApiError>>>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub fn push(&self, path: &str, response: Result<Value, ApiError>) {
        self.responses
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|p| *p == path).count()
    }
}

impl Transport for ScriptedTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let mut key = path.to_string();
        for (name, value) in query {
            key.push_str(&format!("?{name}={value}"));
        }
        self.requests.borrow_mut().push(key.clone());
        self.responses
            .borrow_mut()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ApiError::Transport(format!("no scripted response for {key}"))))
    }
}

pub fn scripted_client() -> (CricbuzzClient<ScriptedTransport>, ManualClock) {
    let clock = ManualClock::new();
    let client = CricbuzzClient::new(ScriptedTransport::default(), Box::new(clock.clone()));
    (client, clock)
}
