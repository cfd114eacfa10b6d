//! Aggregator: the single owner of the status table.
//!
//! Watchers never touch the table. They publish snapshots through an
//! [`AggregatorHandle`]; the aggregator is the only consumer of the channel,
//! so every mutation happens on one thread and no lock is needed.
//!
//! # Change detection
//!
//! A snapshot triggers a render when its service has never been seen, or
//! when its status differs from the stored one. Branch and timestamp changes
//! are recorded but never trigger a render on their own.

use std::collections::HashMap;
use std::sync::mpsc;

use chrono::{DateTime, Utc};

use crate::types::service::{ServiceDescriptor, ServiceSnapshot, ServiceStatus};


/// Events accepted by the aggregator loop.
#[derive(Debug)]
pub enum MonitorEvent {
    /// A watcher's latest observation.
    Snapshot(ServiceSnapshot),
    /// Repaint without touching the table (e.g. after a terminal resize).
    Redraw,
    /// Leave the loop.
    Shutdown,
}


/// Draws the dashboard. Called synchronously on the aggregator thread.
pub trait Renderer {
    fn render(&mut self, services: &[ServiceDescriptor], table: &StatusTable);
}


/// Cloneable sender side of the aggregator channel.
#[derive(Clone)]
pub struct AggregatorHandle {
    sender: mpsc::Sender<MonitorEvent>,
}


impl AggregatorHandle {
    pub(crate) fn from_sender(sender: mpsc::Sender<MonitorEvent>) -> Self {
        AggregatorHandle { sender }
    }

    /// Send a snapshot to the aggregator.
    pub fn publish(&self, snapshot: ServiceSnapshot) -> Result<(), String> {
        self.send(MonitorEvent::Snapshot(snapshot))
    }

    /// Ask for a repaint.
    pub fn redraw(&self) -> Result<(), String> {
        self.send(MonitorEvent::Redraw)
    }

    /// Request aggregator shutdown.
    pub fn shutdown(&self) -> Result<(), String> {
        self.send(MonitorEvent::Shutdown)
    }

    fn send(&self, event: MonitorEvent) -> Result<(), String> {
        self.sender
            .send(event)
            .map_err(|e| format!("Channel send failed: {}", e))
    }
}


/// Latest snapshot per service name.
#[derive(Debug, Default)]
pub struct StatusTable {
    entries: HashMap<String, ServiceSnapshot>,
}


impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceSnapshot> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `snapshot`, replacing any previous entry for the same name.
    /// Returns true if the name was new or its status changed.
    pub fn apply(&mut self, snapshot: ServiceSnapshot) -> bool {
        let changed = match self.entries.get(&snapshot.name) {
            Some(existing) => existing.status != snapshot.status,
            None => true,
        };
        self.entries.insert(snapshot.name.clone(), snapshot);
        changed
    }

    pub fn count(&self, status: ServiceStatus) -> usize {
        self.entries.values().filter(|s| s.status == status).count()
    }

    /// Most recent `checked_at` across all entries.
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.entries.values().map(|s| s.checked_at).max()
    }
}


/// Consumes monitor events, maintains the status table, renders on change.
pub struct Aggregator<R: Renderer> {
    services: Vec<ServiceDescriptor>,
    table: StatusTable,
    receiver: mpsc::Receiver<MonitorEvent>,
    handle: AggregatorHandle,
    renderer: R,
}


impl<R: Renderer> Aggregator<R> {
    pub fn new(services: Vec<ServiceDescriptor>, renderer: R) -> Self {
        let (sender, receiver) = mpsc::channel();
        Aggregator {
            services,
            table: StatusTable::new(),
            receiver,
            handle: AggregatorHandle::from_sender(sender),
            renderer,
        }
    }

    /// Get a handle for sending events to this aggregator.
    pub fn handle(&self) -> AggregatorHandle {
        self.handle.clone()
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn table(&self) -> &StatusTable {
        &self.table
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Draw the current table as is. Before seeding this paints every row
    /// with a blank status.
    pub fn repaint(&mut self) {
        self.render();
    }

    /// Insert the startup observations and draw the first frame.
    pub fn seed(&mut self, snapshots: Vec<ServiceSnapshot>) {
        for snapshot in snapshots {
            self.table.apply(snapshot);
        }
        self.render();
    }

    /// Block on the channel until a `Shutdown` event arrives.
    pub fn run(&mut self) {
        while let Ok(event) = self.receiver.recv() {
            if self.handle_event(event) {
                return;
            }
        }
    }

    /// Process one event. Returns true if shutdown was requested.
    pub fn handle_event(&mut self, event: MonitorEvent) -> bool {
        match event {
            MonitorEvent::Snapshot(snapshot) => {
                let name = snapshot.name.clone();
                let status = snapshot.status;
                if self.table.apply(snapshot) {
                    tracing::debug!(service = %name, %status, "status changed");
                    self.render();
                }
                false
            }
            MonitorEvent::Redraw => {
                self.render();
                false
            }
            MonitorEvent::Shutdown => true,
        }
    }

    fn render(&mut self) {
        self.renderer.render(&self.services, &self.table);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::testing::RecordingRenderer;
    use crate::types::service::Revision;
    use chrono::Duration as ChronoDuration;

    fn descriptors(names: &[&str]) -> Vec<ServiceDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ServiceDescriptor {
                name: n.to_string(),
                directory: None,
                host: "localhost".into(),
                port: 8000 + i as u16,
            })
            .collect()
    }

    fn snap(name: &str, status: ServiceStatus, branch: &str) -> ServiceSnapshot {
        ServiceSnapshot::new(name, status, Revision::Known(branch.into()))
    }

    #[test]
    fn table_new_name_is_change() {
        let mut table = StatusTable::new();
        assert!(table.apply(snap("web", ServiceStatus::Down, "main")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_same_status_is_not_change_but_overwrites() {
        let mut table = StatusTable::new();
        table.apply(snap("web", ServiceStatus::Down, "main"));

        let mut later = snap("web", ServiceStatus::Down, "feature");
        later.checked_at = later.checked_at + ChronoDuration::seconds(5);
        let at = later.checked_at;
        assert!(!table.apply(later));

        let stored = table.get("web").unwrap();
        assert_eq!(stored.revision, Revision::Known("feature".into()));
        assert_eq!(stored.checked_at, at);
    }

    #[test]
    fn table_status_flip_is_change() {
        let mut table = StatusTable::new();
        table.apply(snap("web", ServiceStatus::Down, "main"));
        assert!(table.apply(snap("web", ServiceStatus::Running, "main")));
        assert!(table.apply(snap("web", ServiceStatus::Down, "main")));
    }

    #[test]
    fn table_counts_and_last_checked() {
        let mut table = StatusTable::new();
        assert_eq!(table.last_checked(), None);
        let a = snap("a", ServiceStatus::Running, "m");
        let mut b = snap("b", ServiceStatus::Down, "m");
        b.checked_at = a.checked_at + ChronoDuration::seconds(3);
        let newest = b.checked_at;
        table.apply(a);
        table.apply(b);
        assert_eq!(table.count(ServiceStatus::Running), 1);
        assert_eq!(table.count(ServiceStatus::Down), 1);
        assert_eq!(table.last_checked(), Some(newest));
    }

    #[test]
    fn last_write_wins_per_name() {
        let mut agg = Aggregator::new(descriptors(&["a", "b"]), RecordingRenderer::default());
        let sequence = vec![
            snap("a", ServiceStatus::Down, "one"),
            snap("b", ServiceStatus::Running, "x"),
            snap("a", ServiceStatus::Down, "two"),
            snap("a", ServiceStatus::Running, "three"),
            snap("b", ServiceStatus::Running, "y"),
        ];
        for s in sequence {
            agg.handle_event(MonitorEvent::Snapshot(s));
        }
        let a = agg.table().get("a").unwrap();
        let b = agg.table().get("b").unwrap();
        assert_eq!(a.status, ServiceStatus::Running);
        assert_eq!(a.revision.label(), "three");
        assert_eq!(b.revision.label(), "y");
    }

    #[test]
    fn renders_only_on_new_name_or_status_change() {
        let mut agg = Aggregator::new(descriptors(&["a", "b"]), RecordingRenderer::default());
        let steps = [
            (snap("a", ServiceStatus::Down, "m"), true),
            (snap("a", ServiceStatus::Down, "m"), false),
            (snap("a", ServiceStatus::Down, "other-branch"), false),
            (snap("b", ServiceStatus::Down, "m"), true),
            (snap("a", ServiceStatus::Running, "m"), true),
            (snap("a", ServiceStatus::Running, "m"), false),
            (snap("b", ServiceStatus::Down, "m"), false),
        ];
        let mut expected = 0;
        for (snapshot, renders) in steps {
            agg.handle_event(MonitorEvent::Snapshot(snapshot));
            if renders {
                expected += 1;
            }
            assert_eq!(agg.renderer().frames.len(), expected);
        }
    }

    #[test]
    fn unchanged_status_stream_renders_once() {
        let mut agg = Aggregator::new(descriptors(&["a"]), RecordingRenderer::default());
        for i in 0..20 {
            let s = snap("a", ServiceStatus::Running, &format!("b{}", i));
            agg.handle_event(MonitorEvent::Snapshot(s));
        }
        assert_eq!(agg.renderer().frames.len(), 1);
    }

    #[test]
    fn seed_renders_once_and_later_same_status_is_quiet() {
        let mut agg = Aggregator::new(descriptors(&["web", "db"]), RecordingRenderer::default());
        agg.seed(vec![
            snap("web", ServiceStatus::Down, "m"),
            snap("db", ServiceStatus::Down, "m"),
        ]);
        assert_eq!(agg.renderer().frames.len(), 1);
        agg.handle_event(MonitorEvent::Snapshot(snap("web", ServiceStatus::Down, "m")));
        agg.handle_event(MonitorEvent::Snapshot(snap("db", ServiceStatus::Down, "m")));
        assert_eq!(agg.renderer().frames.len(), 1);
    }

    #[test]
    fn repaint_before_seed_draws_blank_rows() {
        let mut agg = Aggregator::new(descriptors(&["web", "db"]), RecordingRenderer::default());
        agg.repaint();
        let frames = &agg.renderer().frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0],
            vec![("web".to_string(), None), ("db".to_string(), None)]
        );
        assert!(agg.table().is_empty());

        agg.seed(vec![snap("web", ServiceStatus::Running, "m")]);
        assert_eq!(agg.renderer().frames.len(), 2);
    }

    #[test]
    fn render_receives_config_order() {
        let mut agg = Aggregator::new(descriptors(&["zeta", "alpha"]), RecordingRenderer::default());
        agg.handle_event(MonitorEvent::Snapshot(snap("alpha", ServiceStatus::Down, "m")));
        let frame = &agg.renderer().frames[0];
        assert_eq!(frame[0].0, "zeta");
        assert_eq!(frame[0].1, None);
        assert_eq!(frame[1].0, "alpha");
        assert_eq!(frame[1].1, Some(ServiceStatus::Down));
    }

    #[test]
    fn redraw_renders_without_changing_table() {
        let mut agg = Aggregator::new(descriptors(&["a"]), RecordingRenderer::default());
        assert!(!agg.handle_event(MonitorEvent::Redraw));
        assert_eq!(agg.renderer().frames.len(), 1);
        assert!(agg.table().is_empty());
    }

    #[test]
    fn shutdown_ends_run_loop() {
        let mut agg = Aggregator::new(descriptors(&["a"]), RecordingRenderer::default());
        let handle = agg.handle();
        handle.publish(snap("a", ServiceStatus::Down, "m")).unwrap();
        handle.shutdown().unwrap();
        handle.publish(snap("a", ServiceStatus::Running, "m")).unwrap();

        agg.run();

        // Events after Shutdown are left unprocessed.
        assert_eq!(agg.table().get("a").unwrap().status, ServiceStatus::Down);
        assert_eq!(agg.renderer().frames.len(), 1);
    }

    #[test]
    fn handle_works_from_other_thread() {
        let mut agg = Aggregator::new(descriptors(&["a"]), RecordingRenderer::default());
        let handle = agg.handle();
        let thread = std::thread::spawn(move || {
            handle.publish(snap("a", ServiceStatus::Running, "m")).unwrap();
            handle.shutdown().unwrap();
        });
        agg.run();
        thread.join().unwrap();
        assert_eq!(agg.table().get("a").unwrap().status, ServiceStatus::Running);
    }
}
