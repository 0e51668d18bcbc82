use contactos_core::db::init_default_schema;
use contactos_core::{
    Contact, ContactPatch, ContactRepository, DbError, RepoError, SqliteContactRepository,
    SqliteFileProvider,
};
use rusqlite::Connection;
use std::collections::HashSet;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    repo: SqliteContactRepository<SqliteFileProvider>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let provider = SqliteFileProvider::new(dir.path().join("contactos.db"));
        init_default_schema(&provider).unwrap();
        Self {
            _dir: dir,
            repo: SqliteContactRepository::new(provider),
        }
    }

    fn raw_conn(&self) -> Connection {
        Connection::open(self.repo.provider().path()).unwrap()
    }

    fn track_updates(&self) {
        self.raw_conn()
            .execute_batch(
                "CREATE TABLE update_log (contact_id INTEGER NOT NULL);
                 CREATE TRIGGER contactos_update_log AFTER UPDATE ON contactos
                 BEGIN
                     INSERT INTO update_log (contact_id) VALUES (NEW.id);
                 END;",
            )
            .unwrap();
    }

    fn update_count(&self) -> i64 {
        self.raw_conn()
            .query_row("SELECT COUNT(*) FROM update_log;", [], |row| row.get(0))
            .unwrap()
    }

    fn seed_ana(&self) -> i64 {
        self.repo
            .agregar(&Contact::new("Ana", "Diaz", "555-1234", "ana@x.com"))
            .unwrap()
    }
}

#[test]
fn agregar_then_obtener_roundtrip_lowercases_email() {
    let fx = Fixture::new();

    let id = fx
        .repo
        .agregar(&Contact::new("Ana", "Diaz", "555-1234", "ANA@X.COM"))
        .unwrap();

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.nombre, "Ana");
    assert_eq!(loaded.apellido, "Diaz");
    assert_eq!(loaded.telefono, "555-1234");
    assert_eq!(loaded.email, "ana@x.com");
}

#[test]
fn agregar_ignores_preset_id() {
    let fx = Fixture::new();
    let first = fx.seed_ana();

    let preset = Contact::with_id(first, "Luis", "Perez", "555-0000", "luis@x.com");
    let second = fx.repo.agregar(&preset).unwrap();

    assert_ne!(first, second);
    assert_eq!(fx.repo.contar().unwrap(), 2);
    assert_eq!(fx.repo.obtener_por_id(first).unwrap().unwrap().nombre, "Ana");
}

#[test]
fn agregar_does_not_validate() {
    let fx = Fixture::new();

    let id = fx.repo.agregar(&Contact::new("", "", "", "")).unwrap();
    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.nombre, "");
}

#[test]
fn obtener_por_id_missing_returns_none() {
    let fx = Fixture::new();
    assert!(fx.repo.obtener_por_id(404).unwrap().is_none());
}

#[test]
fn obtener_todos_returns_every_row() {
    let fx = Fixture::new();
    let ana = fx.seed_ana();
    let luis = fx
        .repo
        .agregar(&Contact::new("Luis", "Perez", "555-0000", "luis@x.com"))
        .unwrap();

    let ids: HashSet<_> = fx
        .repo
        .obtener_todos()
        .unwrap()
        .into_iter()
        .filter_map(|contact| contact.id)
        .collect();
    assert_eq!(ids, HashSet::from([ana, luis]));
}

#[test]
fn obtener_todos_tolerates_null_columns() {
    let fx = Fixture::new();
    fx.raw_conn()
        .execute(
            "INSERT INTO contactos (nombre, apellido, telefono, email) VALUES ('Eva', NULL, NULL, ' EVA@X.COM ');",
            [],
        )
        .unwrap();

    let all = fx.repo.obtener_todos().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].apellido, "");
    assert_eq!(all[0].email, "eva@x.com");
}

#[test]
fn actualizar_writes_only_changed_non_empty_fields() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    let updated = fx
        .repo
        .actualizar(&Contact::with_id(id, "", "", "555-9999", ""))
        .unwrap();
    assert!(updated);

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.nombre, "Ana");
    assert_eq!(loaded.apellido, "Diaz");
    assert_eq!(loaded.telefono, "555-9999");
    assert_eq!(loaded.email, "ana@x.com");
}

#[test]
fn actualizar_identical_contact_is_noop() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    let identical = Contact::with_id(id, "Ana", "Diaz", "555-1234", "ANA@x.com");
    assert!(!fx.repo.actualizar(&identical).unwrap());

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded, Contact::with_id(id, "Ana", "Diaz", "555-1234", "ana@x.com"));
}

#[test]
fn actualizar_all_empty_fields_is_noop() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    assert!(!fx.repo.actualizar(&Contact::with_id(id, "", "", "", "")).unwrap());
    assert_eq!(fx.repo.obtener_por_id(id).unwrap().unwrap().telefono, "555-1234");
}

#[test]
fn actualizar_whitespace_field_edit_is_left_untouched() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    let mut edited = fx.repo.obtener_por_id(id).unwrap().unwrap();
    edited.nombre = "   ".to_string();
    edited.telefono = "555-9999".to_string();
    assert!(fx.repo.actualizar(&edited).unwrap());

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.nombre, "Ana");
    assert_eq!(loaded.telefono, "555-9999");
}

#[test]
fn actualizar_noop_and_missing_row_issue_no_update() {
    let fx = Fixture::new();
    let id = fx.seed_ana();
    fx.track_updates();

    let identical = Contact::with_id(id, "Ana", "Diaz", "555-1234", "ana@x.com");
    assert!(!fx.repo.actualizar(&identical).unwrap());
    assert!(!fx.repo.actualizar(&Contact::with_id(id, "", "", "", "")).unwrap());
    let ghost = Contact::with_id(id + 100, "Luis", "Perez", "555-0000", "luis@x.com");
    assert!(!fx.repo.actualizar(&ghost).unwrap());
    assert_eq!(fx.update_count(), 0);

    let changed = Contact::with_id(id, "", "", "555-9999", "");
    assert!(fx.repo.actualizar(&changed).unwrap());
    assert_eq!(fx.update_count(), 1);
}

#[test]
fn actualizar_missing_row_returns_false() {
    let fx = Fixture::new();
    let ghost = Contact::with_id(77, "Ana", "Diaz", "555-1234", "ana@x.com");
    assert!(!fx.repo.actualizar(&ghost).unwrap());
    assert_eq!(fx.repo.contar().unwrap(), 0);
}

#[test]
fn actualizar_without_id_is_invalid_argument() {
    let fx = Fixture::new();
    let err = fx
        .repo
        .actualizar(&Contact::new("Ana", "Diaz", "555-1234", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidArgument(_)));
}

#[test]
fn aplicar_parche_updates_several_columns() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    let patch = ContactPatch::new(id)
        .apellido("Diaz Lopez")
        .email(" ANA.DIAZ@X.COM ");
    assert!(fx.repo.aplicar_parche(&patch).unwrap());

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.nombre, "Ana");
    assert_eq!(loaded.apellido, "Diaz Lopez");
    assert_eq!(loaded.email, "ana.diaz@x.com");
}

#[test]
fn aplicar_parche_rejects_clearing_required_column() {
    let fx = Fixture::new();
    let id = fx.seed_ana();

    let patch = ContactPatch::new(id).nombre("  ").telefono("555-9999");
    let err = fx.repo.aplicar_parche(&patch).unwrap_err();
    match err {
        RepoError::InvalidArgument(message) => assert!(message.contains("nombre")),
        other => panic!("unexpected error: {other}"),
    }

    let loaded = fx.repo.obtener_por_id(id).unwrap().unwrap();
    assert_eq!(loaded.telefono, "555-1234");
}

#[test]
fn aplicar_parche_empty_patch_returns_false() {
    let fx = Fixture::new();
    let id = fx.seed_ana();
    assert!(!fx.repo.aplicar_parche(&ContactPatch::new(id)).unwrap());
}

#[test]
fn eliminar_existing_then_lookup_is_absent() {
    let fx = Fixture::new();
    let id = fx.seed_ana();
    let stored = fx.repo.obtener_por_id(id).unwrap().unwrap();

    assert!(fx.repo.eliminar(&stored).unwrap());
    assert!(fx.repo.obtener_por_id(id).unwrap().is_none());
    assert!(!fx.repo.eliminar(&stored).unwrap());
}

#[test]
fn eliminar_missing_returns_false() {
    let fx = Fixture::new();
    let ghost = Contact::with_id(123, "", "", "", "");
    assert!(!fx.repo.eliminar(&ghost).unwrap());
    assert!(!fx.repo.eliminar_por_id(123).unwrap());
}

#[test]
fn eliminar_without_id_is_invalid_argument() {
    let fx = Fixture::new();
    fx.seed_ana();

    let err = fx
        .repo
        .eliminar(&Contact::new("Ana", "Diaz", "555-1234", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidArgument(_)));
    assert_eq!(fx.repo.contar().unwrap(), 1);
}

#[test]
fn contar_tracks_inserts_and_deletes() {
    let fx = Fixture::new();
    assert_eq!(fx.repo.contar().unwrap(), 0);

    let id = fx.seed_ana();
    fx.seed_ana();
    assert_eq!(fx.repo.contar().unwrap(), 2);

    fx.repo.eliminar_por_id(id).unwrap();
    assert_eq!(fx.repo.contar().unwrap(), 1);
}

#[test]
fn operations_without_schema_surface_storage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteContactRepository::new(SqliteFileProvider::new(dir.path().join("empty.db")));

    let err = repo
        .agregar(&Contact::new("Ana", "Diaz", "555-1234", "ana@x.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
}

#[test]
fn unreachable_database_surfaces_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let repo = SqliteContactRepository::new(SqliteFileProvider::new(blocker.join("c.db")));

    let err = repo.obtener_todos().unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Connection { .. })));
}
