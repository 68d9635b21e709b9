//! Property-based tests for plan building, rendering, and validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use caddy_operator::domain::plan::{SERVICE_NAME, build_plan};
use caddy_operator::domain::render::{render_with, validate_hostname};
use caddy_operator::domain::{DesiredConfig, History};
use caddy_operator::infra::assets::load_template;

fn valid_hostname() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,20}[a-z0-9])?(\\.[a-z]{2,8}){0,3}"
}

fn config() -> impl Strategy<Value = DesiredConfig> {
    (valid_hostname(), any::<bool>(), any::<bool>()).prop_map(
        |(hostname, file_server, browseable)| DesiredConfig {
            hostname,
            file_server,
            browseable,
        },
    )
}

// ============================================================================
// build_plan()
// ============================================================================

proptest! {
    /// Equal inputs always produce structurally equal plans.
    #[test]
    fn prop_plan_is_deterministic(cfg in config()) {
        prop_assert_eq!(build_plan(&cfg), build_plan(&cfg.clone()));
    }

    /// Every plan has exactly the managed service, whatever the input.
    #[test]
    fn prop_plan_has_single_service(cfg in config()) {
        let plan = build_plan(&cfg);
        prop_assert_eq!(plan.len(), 1);
        prop_assert!(plan.get(SERVICE_NAME).is_some());
    }

    /// Distinct configs never collapse into the same plan.
    #[test]
    fn prop_distinct_configs_distinct_plans(a in config(), b in config()) {
        prop_assume!(a != b);
        prop_assert_ne!(build_plan(&a), build_plan(&b));
    }
}

// ============================================================================
// render_with()
// ============================================================================

proptest! {
    /// Rendering is a pure function of its inputs.
    #[test]
    fn prop_render_is_pure(cfg in config()) {
        let template = load_template(None).expect("embedded template");
        let first = render_with(&template, &cfg).expect("render");
        let second = render_with(&template, &cfg).expect("render");
        prop_assert_eq!(first, second);
    }

    /// The rendered artifact mentions the hostname and leaves no tags behind.
    #[test]
    fn prop_render_substitutes_all_tags(cfg in config()) {
        let template = load_template(None).expect("embedded template");
        let out = String::from_utf8(render_with(&template, &cfg).expect("render"))
            .expect("utf-8");
        prop_assert!(out.contains(&cfg.hostname), "hostname missing: {}", out);
        prop_assert!(!out.contains("{{"), "leftover tag: {}", out);
        prop_assert_eq!(
            out.contains("file_server browse"),
            cfg.file_server && cfg.browseable
        );
    }
}

// ============================================================================
// validate_hostname()
// ============================================================================

proptest! {
    /// Conventional DNS names are accepted.
    #[test]
    fn prop_valid_hostnames_accepted(host in valid_hostname()) {
        prop_assert!(validate_hostname(&host).is_ok(), "rejected {}", host);
    }

    /// Any whitespace or brace makes the hostname invalid.
    #[test]
    fn prop_injection_characters_rejected(
        prefix in "[a-z]{1,10}",
        bad in prop::sample::select(vec![" ", "\t", "\n", "{", "}", "\"", ";"]),
        suffix in "[a-z]{0,10}",
    ) {
        let host = format!("{prefix}{bad}{suffix}");
        prop_assert!(validate_hostname(&host).is_err(), "accepted {:?}", host);
    }

    /// Invalid hostnames never reach the artifact.
    #[test]
    fn prop_invalid_hostname_never_renders(host in ".*[ {}\n].*") {
        let cfg = DesiredConfig { hostname: host, ..DesiredConfig::default() };
        let template = load_template(None).expect("embedded template");
        prop_assert!(render_with(&template, &cfg).is_err());
    }
}

// ============================================================================
// History
// ============================================================================

proptest! {
    /// History only grows, keeps first-seen order, and never duplicates.
    #[test]
    fn prop_history_is_append_only_set(values in prop::collection::vec("[a-c]{1,2}", 0..30)) {
        let mut history = History::default();
        let mut seen: Vec<String> = Vec::new();
        for v in &values {
            let before = history.len();
            let added = history.record(v);
            prop_assert!(history.len() >= before);
            prop_assert_eq!(added, !seen.contains(v));
            if added {
                seen.push(v.clone());
            }
        }
        prop_assert_eq!(history.to_vec(), seen);
    }
}
