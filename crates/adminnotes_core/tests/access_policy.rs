use adminnotes_core::notice::text;
use adminnotes_core::{
    can_edit, can_edit_with_raw_params, AccessConfig, Actor, IdSet, ModuleParams, Notices,
    SUPER_USER_GROUP,
};

fn sample_actors() -> Vec<Actor> {
    vec![
        Actor::guest(),
        Actor::new(42, [2]),
        Actor::new(43, [2, 6]),
        Actor::new(99, [7]),
        Actor::new(1, [SUPER_USER_GROUP]),
    ]
}

fn sample_configs() -> Vec<AccessConfig> {
    vec![
        AccessConfig::unrestricted(),
        AccessConfig::from_lists("6", "").unwrap(),
        AccessConfig::from_lists("", "42").unwrap(),
        AccessConfig::from_lists("3,4", "1000").unwrap(),
    ]
}

#[test]
fn empty_allow_lists_let_every_actor_edit() {
    let config = AccessConfig::from_lists(" , ", "").unwrap();
    assert!(config.is_unrestricted());
    for actor in sample_actors() {
        assert!(can_edit(&actor, &config), "actor {} denied", actor.id);
    }
}

#[test]
fn super_users_can_always_edit() {
    for config in sample_configs() {
        assert!(can_edit(&Actor::new(500, [2, SUPER_USER_GROUP]), &config));
        assert!(can_edit(&Actor::new(0, [SUPER_USER_GROUP]), &config));
    }
}

#[test]
fn group_or_user_membership_grants_edit() {
    let config = AccessConfig::from_lists("6", "42").unwrap();

    assert!(can_edit(&Actor::new(42, [2]), &config));
    assert!(can_edit(&Actor::new(43, [2, 6]), &config));
    assert!(!can_edit(&Actor::new(99, [7]), &config));
    assert!(!can_edit(&Actor::guest(), &config));
}

#[test]
fn comma_separated_lists_match_explicit_sets() {
    let cases = [
        ("6", "", vec![6], vec![]),
        (" 6 ,7,", "42", vec![6, 7], vec![42]),
        ("", "42, 43", vec![], vec![42, 43]),
        (",,3", " ", vec![3], vec![]),
    ];

    for (groups, users, group_set, user_set) in cases {
        let from_strings = AccessConfig::from_lists(groups, users).unwrap();
        let from_sets = AccessConfig::new(
            group_set.iter().copied().collect::<IdSet>(),
            user_set.iter().copied().collect::<IdSet>(),
        );
        assert_eq!(from_strings, from_sets);
        for actor in sample_actors() {
            assert_eq!(
                can_edit(&actor, &from_strings),
                can_edit(&actor, &from_sets),
                "groups={groups:?} users={users:?} actor={}",
                actor.id
            );
        }
    }
}

#[test]
fn raw_params_in_string_and_array_form_evaluate_the_same() {
    let as_strings = r#"{"edit_user_groups":"6,7","edit_users":"42"}"#;
    let as_arrays = r#"{"edit_user_groups":["6","7"],"edit_users":[42]}"#;

    for actor in sample_actors() {
        let mut notices = Notices::new();
        assert_eq!(
            can_edit_with_raw_params(&actor, as_strings, &mut notices),
            can_edit_with_raw_params(&actor, as_arrays, &mut notices)
        );
        assert!(notices.is_empty());
    }
}

#[test]
fn malformed_raw_params_deny_regular_users_with_notice() {
    let mut notices = Notices::new();
    let allowed = can_edit_with_raw_params(
        &Actor::new(42, [2, 6]),
        r#"{"edit_users":"42,admin"}"#,
        &mut notices,
    );

    assert!(!allowed);
    assert!(notices.has_errors());
    assert!(notices.contains(text::INVALID_CONFIGURATION));
}

#[test]
fn malformed_raw_params_still_let_super_users_edit() {
    let mut notices = Notices::new();
    let allowed = can_edit_with_raw_params(
        &Actor::new(1, [SUPER_USER_GROUP]),
        r#"{"edit_users":"42, bob"}"#,
        &mut notices,
    );

    assert!(allowed);
    assert_eq!(notices.len(), 1);
    assert!(notices.contains(text::INVALID_CONFIGURATION));
}

#[test]
fn module_params_feed_the_access_config() {
    let params = ModuleParams::parse(r#"{"edit_user_groups":"6"}"#).unwrap();
    let config = AccessConfig::from_params(&params);

    assert!(can_edit(&Actor::new(2, [6]), &config));
    assert!(!can_edit(&Actor::new(2, [2]), &config));
}
