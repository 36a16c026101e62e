// ==========================================
// 预测性维护排程系统 - 审计日志仓储
// ==========================================
// 职责: AuditSink 的 SQLite 实现 (仅追加)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::contracts::{AuditEvent, AuditSink};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteAuditLog - 审计日志
// ==========================================
pub struct SqliteAuditLog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAuditLog {
    /// 创建新的 SqliteAuditLog 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取最近 N 条事件 (调试/审计查询)
    pub fn list_recent(&self, limit: u32) -> RepositoryResult<Vec<AuditEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT event_id, event_type, entity_id, operator, detail_json, occurred_at
            FROM audit_log ORDER BY seq_no DESC LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, event_type_raw, entity_id, operator, detail_json, occurred_raw) = row?;
            let event_type = serde_json::from_str(&format!("\"{}\"", event_type_raw))
                .map_err(|e| RepositoryError::SerializationError {
                    entity: "AuditEvent".to_string(),
                    message: e.to_string(),
                })?;
            let occurred_at = chrono::NaiveDateTime::parse_from_str(
                &occurred_raw,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| RepositoryError::SerializationError {
                entity: "AuditEvent".to_string(),
                message: e.to_string(),
            })?;
            events.push(AuditEvent {
                event_id,
                event_type,
                entity_id,
                operator,
                detail_json,
                occurred_at,
            });
        }
        Ok(events)
    }
}

#[async_trait]
impl AuditSink for SqliteAuditLog {
    async fn append(&self, event: AuditEvent) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO audit_log (
                event_id, event_type, entity_id, operator, detail_json, occurred_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.event_id,
                event.event_type.to_string(),
                event.entity_id,
                event.operator,
                event.detail_json,
                event.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }
}
