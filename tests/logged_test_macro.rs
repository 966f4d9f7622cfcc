use lifecycle_log::test_utils::init_test_logger;
use lifecycle_log::templates::templates;
use lifecycle_log::{logged_test, LoggingRule, MessageKey, MessageTemplates, RuleError};

logged_test! {
    fn plain_body_passes() {
        init_test_logger();
        assert_eq!(2 + 2, 4);
    }
}

logged_test! {
    fn result_body_passes() -> Result<(), String> {
        init_test_logger();
        match "7".parse::<u8>() {
            Ok(7) => Ok(()),
            other => Err(format!("unexpected {other:?}")),
        }
    }
}

logged_test! {
    #[should_panic(expected = "still fails")]
    fn panic_reaches_the_runner() {
        init_test_logger();
        panic!("still fails");
    }
}

#[test]
fn global_rule_is_shared() {
    let a = LoggingRule::global();
    let b = LoggingRule::global();
    assert!(std::ptr::eq(a, b));
}

#[test]
fn registration_after_the_global_rule_is_rejected() {
    let rule = LoggingRule::global();
    let late = MessageTemplates::new(">> {0}", "!! {0}", "<< {0}").expect("templates");
    assert!(matches!(late.register_global(), Err(RuleError::AlreadyRegistered)));
    assert_eq!(templates(), Some(rule.templates()));
    assert_eq!(
        rule.templates().render(MessageKey::Start, "x"),
        "Starting test case [x]"
    );
}
