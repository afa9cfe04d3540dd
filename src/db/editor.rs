use std::future::Future;

use anyhow::{bail, Result};
use serde_json::{Map, Value};
use sqlx::types::Json;

use super::Db;
use crate::utils::pagination::{Direction, Page, PageRequest};

/// An editor record.
///
/// Fields other than `id` and `name` are kept as-is in `attributes` and stored
/// as a JSON object, so clients may send extra properties and get them back.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Editor {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Editor {
    /// Properties a page of editors may be sorted by.
    pub const SORTABLE: &'static [&'static str] = &["id", "name"];

    #[cfg(test)]
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), ..Default::default() }
    }
}

#[derive(sqlx::FromRow)]
struct EditorRow {
    id: i64,
    name: Option<String>,
    attributes: Json<Map<String, Value>>,
}

impl From<EditorRow> for Editor {
    fn from(row: EditorRow) -> Self {
        Self { id: Some(row.id), name: row.name, attributes: row.attributes.0 }
    }
}

/// Persistence operations over editors.
pub trait EditorRepository: Send + Sync {
    /// Insert a new editor, assigning it an id. Any id on `editor` is ignored.
    fn insert(&self, editor: &Editor) -> impl Future<Output = Result<Editor>> + Send;

    /// Replace the editor with `editor.id`, inserting it under that id if it doesn't exist.
    fn upsert(&self, editor: &Editor) -> impl Future<Output = Result<Editor>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Editor>>> + Send;

    fn find_all(&self, request: &PageRequest) -> impl Future<Output = Result<Page<Editor>>> + Send;

    /// Delete an editor. Deleting a missing id is not an error.
    fn delete_by_id(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Insert `editor` if it has no id, otherwise replace it.
    fn save(&self, editor: &Editor) -> impl Future<Output = Result<Editor>> + Send {
        async move {
            match editor.id {
                None => self.insert(editor).await,
                Some(_) => self.upsert(editor).await,
            }
        }
    }
}

/// Create the `editors` table.
pub async fn create_table(db: &Db) -> Result<()> {
    db.query(
        "CREATE TABLE editors ( \
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            name TEXT, \
            attributes TEXT NOT NULL DEFAULT '{}' \
        )",
    )
    .execute(db.pool())
    .await?;
    Ok(())
}

/// [`EditorRepository`] backed by the `editors` sqlite table.
#[derive(Clone, Debug)]
pub struct SqliteEditorRepository {
    db: Db,
}

impl SqliteEditorRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = self
            .db
            .query_scalar("SELECT COUNT(*) FROM editors")
            .fetch_one(self.db.pool())
            .await?;
        Ok(u64::try_from(count)?)
    }
}

/// Build an `ORDER BY` clause, always ending in `id` so paging is stable.
fn order_by(request: &PageRequest) -> Result<String> {
    let mut terms = vec![];
    for order in &request.sort {
        let column = match order.property.as_str() {
            "id" => "id",
            "name" => "name",
            other => bail!("cannot sort editors by {other:?}"),
        };
        let direction = match order.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        terms.push(format!("{column} {direction}"));
    }
    if !request.sort.iter().any(|o| o.property == "id") {
        terms.push("id ASC".to_string());
    }
    Ok(terms.join(", "))
}

impl EditorRepository for SqliteEditorRepository {
    async fn insert(&self, editor: &Editor) -> Result<Editor> {
        let row = self
            .db
            .query_as::<EditorRow>(
                "INSERT INTO editors (name, attributes) \
                 VALUES (?, ?) \
                 RETURNING id, name, attributes",
            )
            .bind(&editor.name)
            .bind(Json(&editor.attributes))
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.into())
    }

    async fn upsert(&self, editor: &Editor) -> Result<Editor> {
        let Some(id) = editor.id else {
            bail!("cannot upsert an editor without an id");
        };
        let row = self
            .db
            .query_as::<EditorRow>(
                "INSERT INTO editors (id, name, attributes) \
                 VALUES (?, ?, ?) \
                 ON CONFLICT (id) DO UPDATE SET \
                    name = excluded.name, \
                    attributes = excluded.attributes \
                 RETURNING id, name, attributes",
            )
            .bind(id)
            .bind(&editor.name)
            .bind(Json(&editor.attributes))
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Editor>> {
        let row = self
            .db
            .query_as::<EditorRow>("SELECT id, name, attributes FROM editors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(Into::into))
    }

    /// Fetch one page. The total is only counted with a second query when it
    /// can't be inferred from a short page.
    async fn find_all(&self, request: &PageRequest) -> Result<Page<Editor>> {
        let sql = format!(
            "SELECT id, name, attributes FROM editors ORDER BY {} LIMIT ? OFFSET ?",
            order_by(request)?
        );
        let offset = request.offset();
        let rows = self
            .db
            .query_as::<EditorRow>(&sql)
            .bind(i64::from(request.size))
            .bind(i64::try_from(offset)?)
            .fetch_all(self.db.pool())
            .await?;
        let content = rows.into_iter().map(Editor::from).collect::<Vec<_>>();

        let fetched = content.len() as u64;
        let short = fetched < u64::from(request.size);
        let total = if short && (offset == 0 || fetched > 0) {
            offset + fetched
        } else {
            self.count().await?
        };

        Ok(Page::new(content, request, total))
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.db.query("DELETE FROM editors WHERE id = ?").bind(id).execute(self.db.pool()).await?;
        Ok(())
    }
}
