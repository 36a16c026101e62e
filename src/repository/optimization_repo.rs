// ==========================================
// 预测性维护排程系统 - 优化提案仓储
// ==========================================
// 红线: OptimizationRun 为追加式审计记录,仅状态列可更新,
//       且只允许 PROPOSED → {APPLIED, REJECTED, STALE}
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::optimization::OptimizationRun;
use crate::domain::types::OptimizationRunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// OptimizationRunRepository - 优化提案仓储
// ==========================================
pub struct OptimizationRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OptimizationRunRepository {
    /// 创建新的 OptimizationRunRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入提案 (追加)
    pub fn insert(&self, run: &OptimizationRun) -> RepositoryResult<()> {
        let payload =
            serde_json::to_string(run).map_err(|e| RepositoryError::SerializationError {
                entity: "OptimizationRun".to_string(),
                message: e.to_string(),
            })?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO optimization_run (
                run_id, period_from, period_to, status,
                snapshot_fingerprint, payload_json, created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                run.run_id,
                run.period.from.to_string(),
                run.period.to.to_string(),
                run.status.to_db_str(),
                run.snapshot_fingerprint,
                payload,
                run.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                run.created_by,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<OptimizationRun> {
        let conn = self.get_conn()?;
        let (payload, status): (String, String) = conn
            .query_row(
                "SELECT payload_json, status FROM optimization_run WHERE run_id = ?1",
                params![run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "OptimizationRun".to_string(),
                    id: run_id.to_string(),
                },
                other => other.into(),
            })?;

        let mut run: OptimizationRun =
            serde_json::from_str(&payload).map_err(|e| RepositoryError::SerializationError {
                entity: "OptimizationRun".to_string(),
                message: e.to_string(),
            })?;
        // 状态列为唯一可变列,以列值为准
        if let Some(s) = OptimizationRunStatus::from_db_str(&status) {
            run.status = s;
        }
        Ok(run)
    }

    /// 状态流转 (仅允许 PROPOSED 出发)
    pub fn transition_status(
        &self,
        run_id: &str,
        target: OptimizationRunStatus,
    ) -> RepositoryResult<()> {
        let current = self.find_by_id(run_id)?;

        if current.status != OptimizationRunStatus::Proposed {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.status.to_string(),
                to: target.to_string(),
            });
        }
        if target == OptimizationRunStatus::Proposed {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.status.to_string(),
                to: target.to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE optimization_run SET status = ?2 WHERE run_id = ?1 AND status = 'PROPOSED'",
            params![run_id, target.to_db_str()],
        )?;
        Ok(())
    }

    /// 查询全部提案 (按创建时间倒序)
    pub fn list(&self) -> RepositoryResult<Vec<OptimizationRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT run_id FROM optimization_run ORDER BY created_at DESC, run_id DESC",
        )?;
        let ids: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        drop(stmt);
        drop(conn);

        ids.iter().map(|id| self.find_by_id(id)).collect()
    }
}
