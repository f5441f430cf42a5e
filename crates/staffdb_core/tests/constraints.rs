use staffdb_core::db::open_db_in_memory;
use staffdb_core::{
    initialize_schema, seed, LookupKind, LookupRepository, NewUser, Predicate, Relations,
    RepoError, UserColumn, UserPatch, UserRepository,
};
use rusqlite::Connection;

#[test]
fn duplicate_lookup_name_is_rejected_for_every_relation() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    for kind in LookupKind::ALL {
        let repo = relations.lookup(kind);
        let existing = repo.list().unwrap()[0].name.clone();

        let err = repo.insert_names(&[existing]).unwrap_err();
        assert!(err.is_constraint_violation(), "{kind:?}: {err}");
        assert_eq!(repo.count().unwrap(), 5, "{kind:?}");
    }
}

#[test]
fn same_name_in_different_relations_is_allowed() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    relations.projects.insert_names(&["Аналитик"]).unwrap();
    assert_eq!(relations.projects.count().unwrap(), 6);
}

#[test]
fn duplicate_email_is_rejected() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let err = relations
        .users
        .insert_users(&[NewUser::new("Другой Иван", "ivan.petrov@company.com")])
        .unwrap_err();
    assert!(err.is_constraint_violation(), "{err}");
    assert_eq!(relations.users.count_users().unwrap(), 5);
}

#[test]
fn bulk_insert_is_all_or_nothing() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let err = relations
        .users
        .insert_users(&[
            NewUser::new("Новый Сотрудник", "new.hire@company.com"),
            NewUser::new("Клон", "maria.sidorova@company.com"),
        ])
        .unwrap_err();
    assert!(err.is_constraint_violation());
    assert_eq!(relations.users.count_users().unwrap(), 5);
}

#[test]
fn duplicate_names_are_allowed_for_users() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    relations
        .users
        .insert_users(&[NewUser::new("Иван Петров", "ivan.petrov2@company.com")])
        .unwrap();
    assert_eq!(relations.users.count_users().unwrap(), 6);
}

#[test]
fn update_to_duplicate_email_is_rejected_and_keeps_row() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let err = relations
        .users
        .update_users(
            &UserPatch::email("maria.sidorova@company.com"),
            &Predicate::eq(UserColumn::Id, 1),
        )
        .unwrap_err();
    assert!(err.is_constraint_violation());

    let ivan = relations.users.get_user(1).unwrap().unwrap();
    assert_eq!(ivan.email, "ivan.petrov@company.com");
}

#[test]
fn dangling_reference_is_rejected() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let err = relations
        .users
        .insert_users(&[NewUser::new("Призрак", "ghost@company.com").with_refs(99, 1, 1)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint { .. }), "{err}");
}

#[test]
fn over_long_email_is_a_validation_error() {
    let conn = seeded_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let email = format!("{}@company.com", "x".repeat(95));
    let err = relations
        .users
        .insert_users(&[NewUser::new("Длинный", email)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)), "{err}");
}

fn seeded_conn() -> Connection {
    let conn = open_db_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    {
        let relations = Relations::try_new(&conn).unwrap();
        seed(&relations).unwrap();
    }
    conn
}
