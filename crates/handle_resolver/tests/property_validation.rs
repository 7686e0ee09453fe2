use ippan_handle_resolver::validation::{MAX_HANDLE_LEN, MIN_HANDLE_LEN, RESERVED_HANDLES};
use ippan_handle_resolver::*;
use proptest::prelude::*;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Runtime;

// Property tests for local handle validation
// Checked both against the pure rules and through the resolver state

fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("test runtime")
    })
}

fn status_for(input: &str) -> (HandleStatus, Option<String>) {
    let _guard = runtime().enter();
    let registry = Arc::new(InMemoryHandleRegistry::new());
    let resolver = HandleResolver::new(registry.clone(), registry, &ResolverConfig::default());
    resolver.on_input_changed(input);
    (resolver.status(), resolver.reason())
}

fn decorate() -> impl Strategy<Value = (String, String, bool)> {
    ("[@]{0,2}", "[ \t]{0,2}", any::<bool>())
}

fn dress(body: &str, (at, pad, upper): &(String, String, bool)) -> String {
    let body = if *upper {
        body.to_uppercase()
    } else {
        body.to_string()
    };
    format!("{pad}{at}{body}{pad}")
}

proptest! {
    #[test]
    fn short_handles_are_invalid(body in "[a-z0-9_]{1,2}", deco in decorate()) {
        let (status, reason) = status_for(&dress(&body, &deco));
        prop_assert_eq!(status, HandleStatus::Invalid);
        prop_assert_eq!(reason.as_deref(), Some("too short"));
    }
}

proptest! {
    #[test]
    fn long_handles_are_invalid(body in "[a-z0-9_]{21,40}", deco in decorate()) {
        let (status, reason) = status_for(&dress(&body, &deco));
        prop_assert_eq!(status, HandleStatus::Invalid);
        prop_assert_eq!(reason.as_deref(), Some("too long"));
    }
}

proptest! {
    #[test]
    fn foreign_characters_are_invalid(
        head in "[a-z0-9_]{1,9}",
        bad in "[-.!#$%&*+=/?~é ]",
        tail in "[a-z0-9_]{1,9}",
    ) {
        let input = format!("{head}{bad}{tail}");
        let (status, reason) = status_for(&input);
        prop_assert_eq!(status, HandleStatus::Invalid);
        prop_assert_eq!(reason.as_deref(), Some("invalid characters"));
    }
}

proptest! {
    #[test]
    fn reserved_words_are_invalid_in_any_dress(
        index in 0..RESERVED_HANDLES.len(),
        deco in decorate(),
    ) {
        let word = RESERVED_HANDLES[index];
        prop_assume!(word.len() >= MIN_HANDLE_LEN);
        let (status, reason) = status_for(&dress(word, &deco));
        prop_assert_eq!(status, HandleStatus::Invalid);
        prop_assert_eq!(reason.as_deref(), Some("reserved"));
    }
}

proptest! {
    #[test]
    fn well_formed_handles_start_checking(body in "[a-z0-9_]{3,20}", deco in decorate()) {
        prop_assume!(!HandleRules::new().is_reserved(&body));
        let (status, reason) = status_for(&dress(&body, &deco));
        prop_assert_eq!(status, HandleStatus::Checking);
        prop_assert_eq!(reason, None);
    }
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[ -~\t]{0,30}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.contains('@'));
    }
}

proptest! {
    #[test]
    fn accepted_handles_match_the_charset_and_bounds(raw in "[@ ]{0,2}[A-Za-z0-9_-]{0,25}") {
        let rules = HandleRules::new();
        let normalized = normalize(&raw);
        if rules.validate(&normalized).is_ok() {
            let len = normalized.chars().count();
            prop_assert!((MIN_HANDLE_LEN..=MAX_HANDLE_LEN).contains(&len));
            prop_assert!(normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            let handle = Handle::new(&raw);
            prop_assert_eq!(handle.as_str(), normalized.as_str());
        }
    }
}
