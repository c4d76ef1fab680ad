use adminnotes_core::db::open_db_in_memory;
use adminnotes_core::model::module::{ALL_PAGES_MENU_ID, CPANEL_POSITION, MODULE_NAME};
use adminnotes_core::{
    enable_module, preflight, uninstall, InstallError, InstallKind, ModuleParams,
    ModuleRepository, ProvisionOutcome, PublishSettings, SqliteModuleRepository,
};

#[test]
fn fresh_install_creates_and_publishes_dashboard_panel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);

    preflight(InstallKind::Install, "4.4.1").unwrap();
    let outcome = enable_module(&repo).unwrap();
    let ProvisionOutcome::Published(id) = outcome else {
        panic!("expected a newly published instance, got {outcome:?}");
    };

    let module = repo.get_module(id).unwrap().unwrap();
    assert_eq!(module.module, MODULE_NAME);
    assert_eq!(module.title, "Notes");
    assert!(module.published);
    assert_eq!(module.position, CPANEL_POSITION);
    assert_eq!(module.access, 3);
    let params = module.params().unwrap();
    assert_eq!(params, ModuleParams::provisioning_defaults());
    assert!(params.force_editor);
    assert!(params.print);
    assert!(params.download);
    assert_eq!(repo.menu_assignments(id).unwrap(), vec![ALL_PAGES_MENU_ID]);
}

#[test]
fn enabling_twice_keeps_the_published_instance() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);

    let first = enable_module(&repo).unwrap();
    let second = enable_module(&repo).unwrap();

    assert_eq!(second, ProvisionOutcome::AlreadyPublished(first.module_id()));
    assert_eq!(repo.list_instances(MODULE_NAME).unwrap().len(), 1);
    assert_eq!(
        repo.menu_assignments(first.module_id()).unwrap(),
        vec![ALL_PAGES_MENU_ID]
    );
}

#[test]
fn existing_unpublished_instance_is_published_with_its_content() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let existing = repo.create_module(MODULE_NAME).unwrap();
    repo.set_content(existing, "<p>kept across reinstall</p>")
        .unwrap();

    let outcome = enable_module(&repo).unwrap();

    assert_eq!(outcome, ProvisionOutcome::Published(existing));
    let module = repo.get_module(existing).unwrap().unwrap();
    assert!(module.published);
    assert_eq!(
        module.content.as_deref(),
        Some("<p>kept across reinstall</p>")
    );
}

#[test]
fn instance_published_elsewhere_is_not_treated_as_dashboard_panel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let sidebar = repo.create_module(MODULE_NAME).unwrap();
    repo.publish_module(
        sidebar,
        &PublishSettings {
            position: "sidebar".to_string(),
            ..PublishSettings::dashboard()
        },
    )
    .unwrap();

    let outcome = enable_module(&repo).unwrap();

    assert_eq!(outcome, ProvisionOutcome::Published(sidebar));
    let module = repo.get_module(sidebar).unwrap().unwrap();
    assert_eq!(module.position, CPANEL_POSITION);
}

#[test]
fn old_hosts_are_refused_before_any_change() {
    let err = preflight(InstallKind::Update, "3.10.12").unwrap_err();
    assert!(matches!(err, InstallError::HostVersionTooOld { .. }));
    assert!(preflight(InstallKind::Uninstall, "3.10.12").is_ok());
}

#[test]
fn uninstall_removes_instances_and_menu_assignments() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteModuleRepository::new(&conn);
    let id = enable_module(&repo).unwrap().module_id();
    repo.create_module(MODULE_NAME).unwrap();
    let unrelated = repo.create_module("mod_custom").unwrap();

    assert_eq!(uninstall(&repo).unwrap(), 2);
    assert!(repo.get_module(id).unwrap().is_none());
    assert!(repo.menu_assignments(id).unwrap().is_empty());
    assert!(repo.get_module(unrelated).unwrap().is_some());
    assert_eq!(uninstall(&repo).unwrap(), 0);
}
