use staffdb_core::db::open_db_in_memory;
use staffdb_core::{
    initialize_schema, seed, seed_with, LookupKind, LookupRepository, NewUser, QueryRunner,
    Relations, RepoError, SeedData, SeedError, SeedSummary, UserRepository,
};
use rusqlite::Connection;

#[test]
fn seed_inserts_five_rows_per_relation() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let summary = seed(&relations).unwrap();
    assert_eq!(
        summary,
        SeedSummary {
            positions: 5,
            roles: 5,
            departments: 5,
            projects: 5,
            users: 5,
        }
    );

    for kind in LookupKind::ALL {
        assert_eq!(relations.lookup(kind).count().unwrap(), 5, "{kind:?}");
    }
    assert_eq!(relations.users.count_users().unwrap(), 5);
}

#[test]
fn lookup_ids_follow_insertion_order() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();
    seed(&relations).unwrap();

    let roles = relations.roles.list().unwrap();
    let names: Vec<(i64, &str)> = roles
        .iter()
        .map(|role| (role.id, role.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            (1, "Администратор"),
            (2, "Модератор"),
            (3, "Пользователь"),
            (4, "Гость"),
            (5, "Редактор"),
        ]
    );
    assert_eq!(
        relations.departments.get(4).unwrap().unwrap().name,
        "Отдел аналитики"
    );
    assert!(relations.positions.get(6).unwrap().is_none());
}

#[test]
fn seeded_users_reference_lookups_by_ordinal() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();
    seed(&relations).unwrap();

    let maria = relations.users.get_user(2).unwrap().unwrap();
    assert_eq!(maria.name, "Мария Сидорова");
    assert_eq!(maria.role_id, Some(2));
    assert_eq!(maria.position_id, Some(2));
    assert_eq!(maria.department_id, Some(3));
}

#[test]
fn failing_seed_leaves_no_partial_rows() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let mut data = SeedData::fixture();
    data.users[4].email = data.users[0].email.clone();

    let err = seed_with(&relations, &data).unwrap_err();
    match &err {
        SeedError::Relation { table, source } => {
            assert_eq!(*table, "users");
            assert!(source.is_constraint_violation(), "unexpected error: {source}");
        }
        other => panic!("unexpected error: {other}"),
    }

    for kind in LookupKind::ALL {
        assert_eq!(relations.lookup(kind).count().unwrap(), 0, "{kind:?}");
    }
    assert_eq!(relations.users.count_users().unwrap(), 0);
}

#[test]
fn duplicate_lookup_name_inside_one_batch_aborts_that_seed() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let mut data = SeedData::fixture();
    data.departments[1] = data.departments[0].clone();

    let err = seed_with(&relations, &data).unwrap_err();
    assert!(matches!(
        err,
        SeedError::Relation {
            table: "departments",
            ..
        }
    ));
    assert_eq!(relations.positions.count().unwrap(), 0);
}

#[test]
fn over_long_name_fails_validation_before_sql() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let mut data = SeedData::fixture();
    data.projects[2] = "п".repeat(51);

    let err = seed_with(&relations, &data).unwrap_err();
    assert!(matches!(err.repo_error(), RepoError::Validation(_)));
    assert_eq!(relations.projects.count().unwrap(), 0);
}

#[test]
fn reinitialize_and_seed_resets_after_mutations() {
    let conn = fresh_conn();
    {
        let relations = Relations::try_new(&conn).unwrap();
        seed(&relations).unwrap();
        QueryRunner::new(&relations).run_all().unwrap();
        assert_eq!(relations.users.count_users().unwrap(), 4);
    }

    initialize_schema(&conn).unwrap();
    let relations = Relations::try_new(&conn).unwrap();
    seed(&relations).unwrap();

    assert_eq!(relations.users.count_users().unwrap(), 5);
    let ivan = relations.users.get_user(1).unwrap().unwrap();
    assert_eq!(ivan.email, "ivan.petrov@company.com");
    let dmitry = relations.users.get_user(5).unwrap().unwrap();
    assert_eq!(dmitry.name, "Дмитрий Орлов");
}

#[test]
fn users_without_references_are_allowed() {
    let conn = fresh_conn();
    let relations = Relations::try_new(&conn).unwrap();

    let ids = relations
        .users
        .insert_users(&[NewUser::new("Без Отдела", "nobody@company.com")])
        .unwrap();
    let user = relations.users.get_user(ids[0]).unwrap().unwrap();
    assert_eq!(user.role_id, None);
    assert_eq!(user.position_id, None);
    assert_eq!(user.department_id, None);
}

fn fresh_conn() -> Connection {
    let conn = open_db_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    conn
}
