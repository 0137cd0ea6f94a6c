use artful_debug::core::dispatch::ServiceName;
use artful_debug::{Bracket, Level, Logger, Prefix};
use serde_json::json;

fn store_logger(level: Level) -> Logger {
    let mut logger = Logger::new();
    logger.set_service_level(ServiceName::Store, level).unwrap();
    logger
}

#[test]
fn store_is_not_cleared_between_calls() {
    let mut logger = store_logger(Level::Log);
    for i in 0..5 {
        logger.log(&format!("step {}", i), None).unwrap();
    }
    logger.finish("done", None).unwrap();
    assert_eq!(logger.store().len(), 6);
    assert_eq!(logger.store()[5].level, Level::FinishNatural);
    logger.log("after", None).unwrap();
    assert_eq!(logger.store().len(), 7);
}

#[test]
fn stored_entries_record_depth_and_brackets() {
    let mut logger = store_logger(Level::Log);
    logger.log(">> request", None).unwrap();
    logger.log("inside", Some(json!({"user": 7}))).unwrap();
    logger.log("<< request", None).unwrap();

    let store = logger.store();
    assert_eq!(store[0].bracket, Bracket::Open);
    assert_eq!(store[0].depth, 0);
    assert_eq!(store[0].scope.as_deref(), Some("request"));
    assert_eq!(store[1].bracket, Bracket::None);
    assert_eq!(store[1].depth, 1);
    assert_eq!(store[1].vars, Some(json!({"user": 7})));
    assert_eq!(store[2].bracket, Bracket::Close);
    assert_eq!(store[2].depth, 0);
    assert!(store[1].elapsed_secs >= store[0].elapsed_secs);
}

#[test]
fn store_only_sees_levels_it_is_registered_for() {
    let mut logger = store_logger(Level::Important);
    logger.log("plain", None).unwrap();
    logger.log("!!urgent", None).unwrap();
    logger.log_kind(Prefix::Start, "region", None).unwrap();
    let messages: Vec<&str> = logger.store().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["urgent"]);
}

#[test]
fn store_renders_as_html_and_clears_on_request() {
    let mut logger = store_logger(Level::Log);
    logger.log("first <b>", None).unwrap();
    let html = logger.render_html();
    assert!(html.contains("first &lt;b&gt;"));
    logger.clear_store();
    assert!(logger.store().is_empty());
}
