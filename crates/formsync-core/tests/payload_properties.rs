//! Algebraic properties of payload building and permission resolution.

use formsync_core::{
    build_create_payload, build_update_payload, resolve_field_edit, BranchContext, EditRule,
    FieldAccess, FieldDescriptor, FieldValue, FormData, NodeRef, PermissionContext,
    PermissionDecision, UserInput,
};
use formsync_test_utils::{arb_decision, arb_field, arb_field_value, arb_pool_wire};
use proptest::prelude::*;
use serde_json::json;

fn form_strategy() -> impl Strategy<Value = Vec<(FieldDescriptor, FieldValue)>> {
    proptest::collection::vec("[a-z]{1,6}", 0..6).prop_flat_map(|names| {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<String> = names
            .into_iter()
            .filter(|n| seen.insert(n.clone()))
            .collect();
        unique
            .into_iter()
            .map(|name| (arb_field(name), arb_field_value()))
            .collect::<Vec<_>>()
    })
}

proptest! {
    /// Empty values never reach a create payload.
    #[test]
    fn empty_never_in_create_payload(entries in form_strategy()) {
        let fields: Vec<FieldDescriptor> = entries.iter().map(|(f, _)| f.clone()).collect();
        let data: FormData = entries
            .iter()
            .map(|(f, v)| (f.name.clone(), v.clone()))
            .collect();

        let payload = build_create_payload(&fields, &data);
        for (name, value) in data.iter() {
            if value.is_empty() {
                prop_assert!(!payload.contains_key(name));
            }
        }
        // Nothing outside the form data is ever emitted
        for key in payload.keys() {
            prop_assert!(data.get(key).is_some());
        }
    }

    /// Pool values are emitted exactly as received, on create and on update.
    #[test]
    fn pool_values_pass_through(wire in arb_pool_wire()) {
        let field = FieldDescriptor::attribute("asn", "Number");
        let value = FieldValue::from_json(&wire).unwrap();
        let data = FormData::new().with("asn", value);

        let created = build_create_payload(std::slice::from_ref(&field), &data);
        prop_assert_eq!(&created["asn"], &wire["value"]);

        let updated = build_update_payload(&[field], &data);
        prop_assert_eq!(&updated["asn"], &wire["value"]);
    }

    /// A form left at its opening values produces an empty update.
    #[test]
    fn unchanged_form_updates_nothing(entries in form_strategy()) {
        let fields: Vec<FieldDescriptor> = entries
            .iter()
            .map(|(f, v)| f.clone().with_default(v.clone()))
            .collect();
        let data: FormData = entries
            .into_iter()
            .map(|(f, v)| (f.name, v))
            .collect();

        prop_assert!(build_update_payload(&fields, &data).is_empty());
    }

    /// Exactly one rule fires for every decision and branch state, and the
    /// outcome of an explicit decision ignores ownership flags.
    #[test]
    fn permission_rules_are_total(
        decision in arb_decision(),
        is_default in any::<bool>(),
        is_protected in any::<bool>(),
        is_read_only in any::<bool>(),
        owned_by_user in proptest::option::of(any::<bool>()),
    ) {
        let mut access = FieldAccess::new();
        access.update = decision;
        access.is_protected = is_protected;
        access.is_read_only = is_read_only;
        access.owner = owned_by_user.map(|mine| NodeRef::new(if mine { "me" } else { "them" }));

        let context = PermissionContext::new(
            Some(BranchContext::new("b", is_default)),
            Some("me".to_string()),
        );
        let resolution = resolve_field_edit(&access, &context);

        let (rule, editable) = match decision {
            Some(PermissionDecision::Allow) => (EditRule::Allow, true),
            Some(PermissionDecision::AllowDefault) => (EditRule::AllowDefault, is_default),
            Some(PermissionDecision::AllowOther) => (EditRule::AllowOther, !is_default),
            Some(PermissionDecision::Deny) => (EditRule::Deny, false),
            None => (
                EditRule::Ownership,
                !is_read_only && (!is_protected || owned_by_user.unwrap_or(true)),
            ),
        };
        prop_assert_eq!(resolution.rule, rule);
        prop_assert_eq!(resolution.editable, editable);
    }
}

#[test]
fn empty_string_is_sent_as_null() {
    let fields = vec![FieldDescriptor::attribute("description", "Text")];
    let data = FormData::new().with("description", FieldValue::User(UserInput::Scalar("".into())));

    assert_eq!(
        build_create_payload(&fields, &data)["description"],
        json!({"value": null})
    );

    let fields = vec![FieldDescriptor::attribute("description", "Text")
        .with_default(FieldValue::user("old"))];
    assert_eq!(
        build_update_payload(&fields, &data)["description"],
        json!({"value": null})
    );
}

#[test]
fn every_decision_and_branch_combination_resolves() {
    let mut rules = std::collections::HashSet::new();
    for decision in PermissionDecision::ALL.map(Some).into_iter().chain([None]) {
        for is_default in [true, false] {
            let access = FieldAccess {
                update: decision,
                ..FieldAccess::default()
            };
            let context =
                PermissionContext::new(Some(BranchContext::new("b", is_default)), None);
            rules.insert(resolve_field_edit(&access, &context).rule);
        }
    }
    assert_eq!(rules.len(), 5);
}
