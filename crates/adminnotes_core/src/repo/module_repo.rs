//! Module repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Read and write the content blob of one panel instance.
//! - Provide the record/menu operations used by provisioning.
//!
//! # Invariants
//! - Writes store `modules.params` as `ModuleParams` JSON; reads hand the
//!   stored text back unparsed.
//! - Content writes are last-writer-wins; no version check is made.

use crate::db::DbError;
use crate::model::module::{ModuleId, NoteModule, PublishSettings};
use crate::model::params::{ModuleParams, ParamsError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MODULE_SELECT_SQL: &str = "SELECT
    id,
    module,
    title,
    published,
    position,
    access,
    content,
    params
FROM modules";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ModuleId),
    InvalidData(String),
    Params(ParamsError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "module not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted module data: {message}"),
            Self::Params(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Params(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ParamsError> for RepoError {
    fn from(value: ParamsError) -> Self {
        Self::Params(value)
    }
}

/// Repository interface for panel instances.
pub trait ModuleRepository {
    /// Content blob of one instance; `None` when missing or never saved.
    fn get_content(&self, id: ModuleId) -> RepoResult<Option<String>>;
    /// Replaces the content blob of an existing instance.
    fn set_content(&self, id: ModuleId, content: &str) -> RepoResult<()>;
    fn get_module(&self, id: ModuleId) -> RepoResult<Option<NoteModule>>;
    /// Id of a published instance of `module` at `position`.
    fn find_published(&self, module: &str, position: &str) -> RepoResult<Option<ModuleId>>;
    /// Lowest id among all instances of `module`.
    fn first_instance(&self, module: &str) -> RepoResult<Option<ModuleId>>;
    /// Inserts an unpublished instance with default configuration.
    fn create_module(&self, module: &str) -> RepoResult<ModuleId>;
    fn publish_module(&self, id: ModuleId, settings: &PublishSettings) -> RepoResult<()>;
    /// Adds a menu assignment; repeated assignments are ignored.
    fn assign_menu(&self, id: ModuleId, menu_id: i64) -> RepoResult<()>;
    fn menu_assignments(&self, id: ModuleId) -> RepoResult<Vec<i64>>;
    /// Removes an instance and its menu assignments.
    fn delete_module(&self, id: ModuleId) -> RepoResult<()>;
    fn list_instances(&self, module: &str) -> RepoResult<Vec<ModuleId>>;
}

/// SQLite-backed module repository.
pub struct SqliteModuleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteModuleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ModuleRepository for SqliteModuleRepository<'_> {
    fn get_content(&self, id: ModuleId) -> RepoResult<Option<String>> {
        let content: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT content FROM modules WHERE id = ?1;",
                [id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content.flatten())
    }

    fn set_content(&self, id: ModuleId, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE modules
             SET
                content = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.get(), content],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_module(&self, id: ModuleId) -> RepoResult<Option<NoteModule>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MODULE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return parse_module_row(row).map(Some);
        }
        Ok(None)
    }

    fn find_published(&self, module: &str, position: &str) -> RepoResult<Option<ModuleId>> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id
                 FROM modules
                 WHERE module = ?1
                   AND published = 1
                   AND position = ?2
                 ORDER BY id ASC
                 LIMIT 1;",
                params![module, position],
                |row| row.get(0),
            )
            .optional()?;
        id.map(parse_module_id).transpose()
    }

    fn first_instance(&self, module: &str) -> RepoResult<Option<ModuleId>> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM modules WHERE module = ?1 ORDER BY id ASC LIMIT 1;",
                [module],
                |row| row.get(0),
            )
            .optional()?;
        id.map(parse_module_id).transpose()
    }

    fn create_module(&self, module: &str) -> RepoResult<ModuleId> {
        let params_json = ModuleParams::default().to_json()?;
        self.conn.execute(
            "INSERT INTO modules (module, params) VALUES (?1, ?2);",
            params![module, params_json],
        )?;
        parse_module_id(self.conn.last_insert_rowid())
    }

    fn publish_module(&self, id: ModuleId, settings: &PublishSettings) -> RepoResult<()> {
        let params_json = settings.params.to_json()?;
        let changed = self.conn.execute(
            "UPDATE modules
             SET
                title = ?2,
                published = 1,
                position = ?3,
                access = ?4,
                params = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.get(),
                settings.title,
                settings.position,
                settings.access,
                params_json,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn assign_menu(&self, id: ModuleId, menu_id: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO modules_menu (moduleid, menuid) VALUES (?1, ?2);",
            params![id.get(), menu_id],
        )?;
        Ok(())
    }

    fn menu_assignments(&self, id: ModuleId) -> RepoResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT menuid FROM modules_menu WHERE moduleid = ?1 ORDER BY menuid ASC;")?;
        let mut rows = stmt.query([id.get()])?;
        let mut menus = Vec::new();
        while let Some(row) = rows.next()? {
            menus.push(row.get(0)?);
        }
        Ok(menus)
    }

    fn delete_module(&self, id: ModuleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM modules WHERE id = ?1;", [id.get()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_instances(&self, module: &str) -> RepoResult<Vec<ModuleId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM modules WHERE module = ?1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([module])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(parse_module_id(row.get(0)?)?);
        }
        Ok(ids)
    }
}

fn parse_module_id(value: i64) -> RepoResult<ModuleId> {
    ModuleId::new(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid id value `{value}` in modules.id")))
}

fn parse_module_row(row: &Row<'_>) -> RepoResult<NoteModule> {
    let published: i64 = row.get("published")?;
    Ok(NoteModule {
        id: parse_module_id(row.get("id")?)?,
        module: row.get("module")?,
        title: row.get("title")?,
        published: published == 1,
        position: row.get("position")?,
        access: row.get("access")?,
        content: row.get("content")?,
        raw_params: row.get("params")?,
    })
}
