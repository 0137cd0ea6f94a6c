use artful_debug::core::dispatch::ServiceName;
use artful_debug::core::output::MemoryWriter;
use artful_debug::{DebugError, ErrorMask, ErrorReport, Level, Logger, Outcome, Prefix, Profile};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn capture() -> (Logger, MemoryWriter) {
    let out = MemoryWriter::new();
    (Logger::new().with_stdout(out.sink()), out)
}

#[test]
fn cumulative_verbosity_for_every_service_and_level() {
    let routine = [Level::Important, Level::Stack, Level::Log];
    for service in ServiceName::ALL {
        for target in routine {
            let mut logger = Logger::new();
            logger.set_service_level(service, target).unwrap();
            for level in Level::ROUTED {
                assert_eq!(
                    logger.services_for(level).contains(&service),
                    level <= target,
                    "{service} registered at {target}, checking {level}"
                );
            }
        }
    }
}

#[test]
fn lowering_a_level_removes_the_service_above_it() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Echo, Level::Log).unwrap();
    logger.set_service_level(ServiceName::Echo, Level::Important).unwrap();
    assert!(logger.services_for(Level::Log).is_empty());
    assert!(logger.services_for(Level::Stack).is_empty());
    assert_eq!(logger.services_for(Level::Important), &[ServiceName::Echo]);
}

#[test]
fn named_setter_validates_service_and_level() {
    let mut logger = Logger::new();
    assert!(matches!(
        logger.set_service_level_named("syslog", "ALL"),
        Err(DebugError::UnknownService { .. })
    ));
    assert!(matches!(
        logger.set_service_level_named("echo", "loud"),
        Err(DebugError::InvalidLevel(_))
    ));
    for finish in ["$$", "XX", "->", "1", "2", "3"] {
        assert!(matches!(
            logger.set_service_level_named("echo", finish),
            Err(DebugError::UseDedicatedSetter(_))
        ));
    }
    logger.set_service_level_named("echo", "!!").unwrap();
    assert!(logger.services_for(Level::Important).contains(&ServiceName::Echo));
}

#[test]
fn finish_setters_keep_store_first_and_output_html_last() {
    use ServiceName::*;
    let orders: [&[ServiceName]; 4] = [
        &[Store, OutputHtml],
        &[OutputHtml, Store],
        &[OutputHtml, Echo, Store, File],
        &[File, Store, Mail, OutputHtml, Echo],
    ];
    for order in orders {
        let mut logger = Logger::new();
        logger.set_redirect_services(order).unwrap();
        logger.set_fatal_services(order).unwrap();
        logger.set_finish_services(order).unwrap();
        for level in [Level::FinishNatural, Level::FinishFatal, Level::FinishRedirect] {
            let list = logger.services_for(level);
            assert_eq!(list.first(), Some(&Store), "{order:?}");
            assert_eq!(list.last(), Some(&OutputHtml), "{order:?}");
        }
    }
}

#[test]
fn nothing_happens_below_threshold() {
    let (mut logger, out) = capture();
    logger.set_service_level(ServiceName::Store, Level::Important).unwrap();
    logger.set_service_level(ServiceName::Echo, Level::Important).unwrap();
    logger.log("quiet", None).unwrap();
    logger.log(">> region", None).unwrap();
    assert!(out.is_empty());
    assert!(logger.store().is_empty());
    assert_eq!(logger.depth(), 0);
}

#[test]
fn brackets_balance_and_carry_elapsed_time() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.log(">> a", None).unwrap();
    logger.log(">> b", None).unwrap();
    assert_eq!(logger.depth(), 2);
    logger.log("<< b", None).unwrap();
    logger.log("<< a", None).unwrap();
    assert_eq!(logger.depth(), 0);

    let suffix = regex::Regex::new(r" \d+\.\d{3}s$").unwrap();
    let closes: Vec<_> = logger
        .store()
        .iter()
        .filter(|e| e.prefix == Prefix::End)
        .collect();
    assert_eq!(closes.len(), 2);
    for close in closes {
        assert!(suffix.is_match(&close.message), "{}", close.message);
    }
}

#[test]
fn unbalanced_close_is_safe() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.log("<< x", None).unwrap();
    logger.log("<< y", None).unwrap();
    assert_eq!(logger.depth(), 0);
    assert_eq!(logger.store().len(), 2);
}

#[test]
fn slow_region_is_escalated() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.set_slow_threshold(Duration::from_millis(10));
    logger.log(">> work", None).unwrap();
    std::thread::sleep(Duration::from_millis(20));
    logger.log("<< work", None).unwrap();
    let close = logger.store().last().unwrap();
    assert_eq!(close.level, Level::Important);
    assert!(close.message.starts_with("SLOW:"));

    logger.set_slow_threshold(Duration::from_secs(10));
    logger.log(">> quick", None).unwrap();
    logger.log("<< quick", None).unwrap();
    let close = logger.store().last().unwrap();
    assert_eq!(close.level, Level::Stack);
    assert!(close.message.starts_with("quick "));
}

#[test]
fn store_keeps_entries_in_call_order() {
    let mut logger = Logger::new();
    logger.set_service_level_named("store", "ALL").unwrap();
    logger.log("hello", None).unwrap();
    logger.log("!!urgent", None).unwrap();
    let store = logger.store();
    assert_eq!(store.len(), 2);
    assert_eq!(store[0].message, "hello");
    assert_eq!(store[0].level, Level::Log);
    assert_eq!(store[1].message, "urgent");
    assert_eq!(store[1].level, Level::Important);
}

#[test]
fn explicit_kind_bypasses_prefix_parsing() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.log_kind(Prefix::None, "!!not important", None).unwrap();
    logger.log_kind(Prefix::Important, "important", None).unwrap();
    assert_eq!(logger.store()[0].message, "!!not important");
    assert_eq!(logger.store()[0].level, Level::Log);
    assert_eq!(logger.store()[1].level, Level::Important);
}

#[test]
fn fatal_renders_through_store_and_output_html() {
    let (mut logger, out) = capture();
    logger
        .set_fatal_services(&[ServiceName::OutputHtml, ServiceName::Store])
        .unwrap();
    assert_eq!(
        logger.services_for(Level::FinishFatal),
        &[ServiceName::Store, ServiceName::OutputHtml]
    );
    let outcome = logger.fatal("boom", None).unwrap();
    assert_eq!(outcome, Outcome::Exit(1));
    assert!(logger.render_html().contains("boom"));
    // output_html stays silent until HTML is allowed
    assert!(out.is_empty());
}

#[test]
fn finish_logs_at_natural_finish() {
    let mut logger = Logger::new();
    logger.set_finish_services(&[ServiceName::Store]).unwrap();
    logger.finish("done", None).unwrap();
    assert_eq!(logger.store()[0].level, Level::FinishNatural);
    assert_eq!(logger.store()[0].message, "done");
}

#[test]
fn redirect_is_intercepted_or_handed_to_host() {
    let closed = Arc::new(Mutex::new(0));
    let mut logger = Logger::new();
    logger.set_redirect_services(&[ServiceName::Store]).unwrap();
    let counter = closed.clone();
    logger.set_session_closer(Box::new(move || *counter.lock().unwrap() += 1));

    let outcome = logger.redirect("/next", 302).unwrap();
    assert_eq!(
        outcome,
        Outcome::Redirect {
            location: "/next".to_string(),
            status: 302
        }
    );
    assert_eq!(*closed.lock().unwrap(), 1);
    assert_eq!(logger.store()[0].message, "Redirect [302] to /next");

    logger
        .set_redirect_services(&[ServiceName::InterceptRedirect, ServiceName::Store])
        .unwrap();
    match logger.redirect("/after", 303).unwrap() {
        Outcome::Intercepted { preamble } => assert!(preamble.contains("href=\"/after\"")),
        other => panic!("expected interception, got {other:?}"),
    }
    assert_eq!(*closed.lock().unwrap(), 1);
}

#[test]
fn profiles_replace_and_restore_the_table() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Echo, Level::Log).unwrap();
    let before = logger.table().clone();

    logger.push_profile("file_minimal").unwrap();
    assert_eq!(logger.profile(), Some(Profile::FileMinimal));
    assert!(logger.services_for(Level::Log).is_empty());
    assert_eq!(logger.services_for(Level::Important), &[ServiceName::File]);

    logger.pop_profile().unwrap();
    assert_eq!(logger.table(), &before);
    assert!(matches!(logger.pop_profile(), Err(DebugError::EmptyProfileStack)));

    assert!(matches!(
        logger.load_profile("debug"),
        Err(DebugError::UnknownProfile { .. })
    ));
}

#[test]
fn error_reports_follow_masks() {
    let mut logger = Logger::new();
    let report = ErrorReport::new(ErrorMask::WARNING, "division by zero", "calc.rs", 12);

    // Not installed until a profile is loaded.
    assert_eq!(logger.handle_error(&report).unwrap(), Outcome::Continue);

    logger.load(Profile::FileMinimal).unwrap();
    logger.set_service_level(ServiceName::File, Level::Disable).unwrap();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.set_fatal_services(&[ServiceName::Store]).unwrap();

    logger.error_policy_mut().reporting = ErrorMask::ERROR;
    assert_eq!(logger.handle_error(&report).unwrap(), Outcome::Continue);
    assert!(logger.store().is_empty());

    logger.error_policy_mut().reporting = ErrorMask::all();
    let notice = ErrorReport::new(ErrorMask::NOTICE, "undefined index", "calc.rs", 3);
    assert_eq!(logger.handle_error(&notice).unwrap(), Outcome::Continue);
    assert_eq!(logger.store()[0].level, Level::Important);
    assert_eq!(logger.store()[0].message, "NOTICE: undefined index in calc.rs:3");

    assert_eq!(logger.handle_error(&report).unwrap(), Outcome::Exit(1));
    assert!(!logger.error_policy().installed);
    let last = logger.store().last().unwrap();
    assert_eq!(last.level, Level::FinishFatal);
    assert!(last.backtrace.is_some());

    // Stood down: further reports pass through.
    assert_eq!(logger.handle_error(&report).unwrap(), Outcome::Continue);
}

#[test]
fn panic_handling_respects_rethrow() {
    let mut logger = Logger::new();
    logger.load(Profile::Cterm).unwrap();
    logger.set_fatal_services(&[ServiceName::Store]).unwrap();
    assert_eq!(logger.handle_panic("index out of bounds", None), None);
    assert_eq!(logger.store()[0].message, "Panic: index out of bounds");

    logger.error_policy_mut().rethrow = false;
    logger.set_exit_callback(Box::new(|_, _| Outcome::Exit(70)));
    assert_eq!(logger.handle_panic("again", None), Some(Outcome::Exit(70)));
}

#[test]
fn store_export_round_trips_through_reader() {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    logger.log(">> load", Some(serde_json::json!({"rows": 3}))).unwrap();
    logger.log("<< load", None).unwrap();

    let mut buf = Vec::new();
    logger.export_store(&mut buf).unwrap();
    let entries = artful_debug::read_store_export(std::io::Cursor::new(buf)).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].vars, Some(serde_json::json!({"rows": 3})));
    assert_eq!(entries[1].scope.as_deref(), Some("load"));

    assert_eq!(logger.take_store().len(), 2);
    assert!(logger.store().is_empty());
}

#[test]
fn config_file_wires_the_file_service() {
    use artful_debug::core::config::{load_config, DebugConfig};
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("debug.log");
    std::fs::write(
        dir.path().join("artful-debug.toml"),
        format!(
            "profile = \"file_minimal\"\nslow_threshold_secs = 0.5\n\n[file]\npath = {:?}\n",
            log_path.to_string_lossy()
        ),
    )
    .unwrap();

    let config = load_config(dir.path()).unwrap();
    assert_ne!(config, DebugConfig::default());
    let mut logger = Logger::from_config(&config).unwrap();
    logger.log("chatter", None).unwrap();
    logger.log("!!disk nearly full", None).unwrap();
    logger.flush().unwrap();

    let written = std::fs::read_to_string(&log_path).unwrap();
    assert!(written.contains("!! disk nearly full"));
    assert!(!written.contains("chatter"));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = artful_debug::core::config::load_config(dir.path()).unwrap();
    assert_eq!(config, artful_debug::core::config::DebugConfig::default());
}

#[test]
fn panic_hook_logs_the_first_panic() {
    let mut logger = Logger::new();
    logger.set_fatal_services(&[ServiceName::Store]).unwrap();
    let logger = artful_debug::shared(logger);
    artful_debug::install_panic_hook(logger.clone());

    let result = std::panic::catch_unwind(|| panic!("worker crashed"));
    assert!(result.is_err());
    let _ = std::panic::take_hook();

    let guard = logger.lock().unwrap();
    assert_eq!(guard.store()[0].message, "Panic: worker crashed");
    assert!(guard.store()[0].vars.as_ref().unwrap()["file"].is_string());
    assert!(!guard.error_policy().installed);
}

struct BrokenStore;

impl artful_debug::services::Service for BrokenStore {
    fn name(&self) -> ServiceName {
        ServiceName::Store
    }

    fn handle(
        &mut self,
        _entry: &artful_debug::Entry,
        _state: &mut artful_debug::services::ServiceState,
    ) -> Result<(), DebugError> {
        Err(DebugError::MailError("relay refused".to_string()))
    }
}

#[test]
fn failing_service_stops_the_rest_and_propagates() {
    let out = MemoryWriter::new();
    let mut logger = Logger::new()
        .with_stdout(out.sink())
        .with_service(Box::new(BrokenStore));
    logger.set_service_level(ServiceName::Echo, Level::Log).unwrap();
    logger.set_service_level(ServiceName::Store, Level::Log).unwrap();
    assert_eq!(
        logger.services_for(Level::Log),
        &[ServiceName::Store, ServiceName::Echo]
    );

    let result = logger.log("never echoed", None);
    assert!(matches!(result, Err(DebugError::MailError(_))));
    assert!(out.is_empty());
}
