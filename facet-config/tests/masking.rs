//! Runs in its own binary: it installs a capturing logger for the whole process.

mod common;

use std::sync::Mutex;

use common::Table;
use facet::Facet;
use facet_config::Configurator;
use log::{LevelFilter, Log, Metadata, Record};

struct Capture {
    lines: Mutex<Vec<String>>,
}

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

#[derive(Facet, Debug)]
struct Login {
    user: String,
    #[facet(sensitive)]
    password: String,
}

#[test]
fn sensitive_values_are_masked_in_logs() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let table = Table::new(&[("user", "admin"), ("password", "hunter2")]);
    let login: Login = Configurator::new().with_provider(&table).load().unwrap();
    assert_eq!(login.password, "hunter2");

    let lines = CAPTURE.lines.lock().unwrap();
    assert!(lines.iter().any(|line| line.ends_with("\"admin\"")));
    assert!(lines.iter().any(|line| line.ends_with("\"******\"")));
    assert!(lines.iter().all(|line| !line.contains("hunter2")));
}
