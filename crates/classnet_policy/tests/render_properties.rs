use classnet_common::models::{Rule, RuleKind};
use classnet_policy::render_policy;
use proptest::prelude::*;

fn kind() -> impl Strategy<Value = RuleKind> {
    prop_oneof![
        Just(RuleKind::Whitelist),
        Just(RuleKind::BlockedSubdomain),
        Just(RuleKind::BlockedPath),
    ]
}

fn rule() -> impl Strategy<Value = Rule> {
    (kind(), "(https?://)?[A-Za-z0-9.-]{1,20}(/[a-z]{0,8})?/?").prop_map(|(k, v)| Rule::new(k, v))
}

proptest! {
    #[test]
    fn rendering_ignores_order_and_duplicates(rules in prop::collection::vec(rule(), 0..20)) {
        let mut shuffled = rules.clone();
        shuffled.reverse();
        shuffled.extend(rules.iter().cloned());
        prop_assert_eq!(render_policy(&rules), render_policy(&shuffled));
    }

    #[test]
    fn rendering_is_deterministic(rules in prop::collection::vec(rule(), 0..20)) {
        prop_assert_eq!(render_policy(&rules), render_policy(&rules));
    }

    #[test]
    fn every_document_has_three_sections(rules in prop::collection::vec(rule(), 0..20)) {
        let doc = render_policy(&rules);
        prop_assert!(doc.starts_with("## WHITELIST\n"));
        prop_assert!(doc.contains("\n## BLOCKED-SUBDOMAINS\n"));
        prop_assert!(doc.contains("\n## BLOCKED-PATHS\n"));
        prop_assert!(!doc.contains("#DESACTIVADO"));
    }
}
