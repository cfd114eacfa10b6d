//! svcwatch: a terminal dashboard for local services.
//!
//! # Usage
//!
//! ```text
//! svcwatch        # reads ./services.yml, press q to quit
//! ```

mod logging;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use svcwatch_core::config::{self, MonitorConfig, CONFIG_FILE};
use svcwatch_core::infrastructure::runner::ShellRunner;
use svcwatch_core::monitor::aggregator::Aggregator;
use svcwatch_core::monitor::session::Monitor;
use svcwatch_core::probe::health::TcpProbe;
use svcwatch_core::probe::revision::RevisionProbe;
use svcwatch_core::types::service::ServiceDescriptor;
use svcwatch_tui::tui::{spawn_input_listener, TerminalDashboard};


fn main() {
    let _log_guard = match logging::init(&logging::log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("svcwatch: logging disabled: {}", e);
            None
        }
    };

    let path = config_path();
    let services = match config::load(&path) {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "cannot load config");
            eprintln!("svcwatch: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(services) {
        tracing::error!(error = %e, "monitor failed");
        eprintln!("svcwatch: {}", e);
        process::exit(1);
    }
}


fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}


/// Take over the terminal and monitor until the user quits.
fn run(services: Vec<ServiceDescriptor>) -> Result<(), String> {
    let settings = MonitorConfig::default();
    let monitor = Monitor::new(
        settings.clone(),
        Arc::new(TcpProbe::new(settings.probe_timeout)),
        RevisionProbe::new(Arc::new(ShellRunner)),
    );

    let dashboard =
        TerminalDashboard::stdout().map_err(|e| format!("cannot open terminal: {}", e))?;
    let mut aggregator = Aggregator::new(services, dashboard);
    // Rows show up blank until the first probes return.
    aggregator.repaint();
    spawn_input_listener(aggregator.handle())
        .map_err(|e| format!("cannot start input thread: {}", e))?;

    monitor.run(&mut aggregator)
}
