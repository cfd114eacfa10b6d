//! Test doubles shared by the monitor tests.

use std::sync::Mutex;

use crate::monitor::aggregator::{Renderer, StatusTable};
use crate::probe::health::HealthCheck;
use crate::types::service::{ServiceDescriptor, ServiceStatus};


/// Renderer that records, per frame, each row's name and status.
#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Vec<(String, Option<ServiceStatus>)>>,
}


impl Renderer for RecordingRenderer {
    fn render(&mut self, services: &[ServiceDescriptor], table: &StatusTable) {
        let rows = services
            .iter()
            .map(|s| (s.name.clone(), table.get(&s.name).map(|e| e.status)))
            .collect();
        self.frames.push(rows);
    }
}


/// Health check that replays a fixed sequence, then repeats its last value.
pub struct ScriptedHealth {
    script: Mutex<Vec<ServiceStatus>>,
    last: Mutex<ServiceStatus>,
}


impl ScriptedHealth {
    pub fn sequence(statuses: Vec<ServiceStatus>) -> Self {
        let first = statuses.first().copied().unwrap_or(ServiceStatus::Down);
        let mut script = statuses;
        script.reverse();
        ScriptedHealth {
            script: Mutex::new(script),
            last: Mutex::new(first),
        }
    }

    pub fn always(status: ServiceStatus) -> Self {
        Self::sequence(vec![status])
    }
}


impl HealthCheck for ScriptedHealth {
    fn check(&self, _service: &ServiceDescriptor) -> ServiceStatus {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop() {
            *last = next;
        }
        *last
    }
}


/// Health check driven by a closure, for per-service scripting.
pub struct FnHealth<F>(pub F);


impl<F> HealthCheck for FnHealth<F>
where
    F: Fn(&ServiceDescriptor) -> ServiceStatus + Send + Sync,
{
    fn check(&self, service: &ServiceDescriptor) -> ServiceStatus {
        (self.0)(service)
    }
}
