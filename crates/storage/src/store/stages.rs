#![forbid(unsafe_code)]

use super::*;
use kb_core::ids::{ArticleId, StageId};
use kb_core::{AccessLevel, Actor};
use rusqlite::{Connection, OptionalExtension, Row, params};

const DEFAULT_STAGE_SEQUENCE: i64 = 10;

fn stage_from_row(row: &Row<'_>) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: StageId::new(row.get(0)?),
        parent_id: ArticleId::new(row.get(1)?),
        name: row.get(2)?,
        sequence: row.get(3)?,
        fold: row.get(4)?,
    })
}

fn load_stage(conn: &Connection, id: StageId) -> Result<Stage, StoreError> {
    conn.query_row(
        "SELECT id, parent_id, name, sequence, fold FROM article_stages WHERE id=?1",
        params![id.get()],
        stage_from_row,
    )
    .optional()?
    .ok_or(StoreError::UnknownStage(id))
}

/// A stage only applies to items of the article that owns it.
pub(in crate::store) fn ensure_stage_fits_tx(
    conn: &Connection,
    stage: StageId,
    parent: Option<ArticleId>,
    is_item: bool,
) -> Result<(), StoreError> {
    let stage = load_stage(conn, stage)?;
    if !is_item {
        return Err(StoreError::InvalidInput("only article items can have a stage"));
    }
    if Some(stage.parent_id) != parent {
        return Err(StoreError::InvalidInput(
            "the stage belongs to another parent article",
        ));
    }
    Ok(())
}

impl SqliteStore {
    pub fn create_stage(
        &mut self,
        actor: &Actor,
        request: CreateStageRequest,
    ) -> Result<Stage, StoreError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("stage name must not be empty"));
        }
        let tx = begin_write(&mut self.conn)?;
        load_article(&tx, request.parent_id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            request.parent_id,
            AccessLevel::Write,
            "managing stages requires write access on the parent",
        )?;
        tx.execute(
            "INSERT INTO article_stages(parent_id, name, sequence, fold, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.parent_id.get(),
                name,
                request.sequence.unwrap_or(DEFAULT_STAGE_SEQUENCE),
                request.fold,
                now_ms(),
            ],
        )?;
        let stage = load_stage(&tx, StageId::new(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(stage)
    }

    pub fn set_stage_fold(
        &mut self,
        actor: &Actor,
        id: StageId,
        fold: bool,
    ) -> Result<Stage, StoreError> {
        let tx = begin_write(&mut self.conn)?;
        let stage = load_stage(&tx, id)?;
        ensure_access_tx(
            &tx,
            &self.resolver,
            actor,
            stage.parent_id,
            AccessLevel::Write,
            "managing stages requires write access on the parent",
        )?;
        tx.execute(
            "UPDATE article_stages SET fold=?2 WHERE id=?1",
            params![id.get(), fold],
        )?;
        let stage = load_stage(&tx, id)?;
        tx.commit()?;
        Ok(stage)
    }

    pub fn list_stages(&self, actor: &Actor, parent: ArticleId) -> Result<Vec<Stage>, StoreError> {
        load_article(&self.conn, parent)?;
        ensure_access_tx(
            &self.conn,
            &self.resolver,
            actor,
            parent,
            AccessLevel::Read,
            "reading requires read access",
        )?;
        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id, name, sequence, fold FROM article_stages \
             WHERE parent_id=?1 ORDER BY sequence ASC, id ASC",
        )?;
        let stages = stmt
            .query_map(params![parent.get()], stage_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stages)
    }
}
