// ==========================================
// 预测性维护排程系统 - 分析报表仓储
// ==========================================
// 红线: 报表为追加式审计记录,仓储不提供更新/删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::analytics::MaintenanceAnalyticsReport;
use crate::domain::types::DateRange;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AnalyticsReportRepository - 分析报表仓储
// ==========================================
pub struct AnalyticsReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AnalyticsReportRepository {
    /// 创建新的 AnalyticsReportRepository 实例
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

    /// 插入报表 (追加)
    pub fn insert(&self, report: &MaintenanceAnalyticsReport) -> RepositoryResult<()> {
        let payload =
            serde_json::to_string(report).map_err(|e| RepositoryError::SerializationError {
                entity: "MaintenanceAnalyticsReport".to_string(),
                message: e.to_string(),
            })?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO analytics_report (
                report_id, period_from, period_to, report_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                report.report_id,
                report.period.from.to_string(),
                report.period.to.to_string(),
                payload,
                report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, report_id: &str) -> RepositoryResult<MaintenanceAnalyticsReport> {
        let conn = self.get_conn()?;
        let payload: String = conn
            .query_row(
                "SELECT report_json FROM analytics_report WHERE report_id = ?1",
                params![report_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "MaintenanceAnalyticsReport".to_string(),
                    id: report_id.to_string(),
                },
                other => other.into(),
            })?;

        serde_json::from_str(&payload).map_err(|e| RepositoryError::SerializationError {
            entity: "MaintenanceAnalyticsReport".to_string(),
            message: e.to_string(),
        })
    }

    /// 查询窗口重叠的报表 (按生成时间倒序)
    pub fn list_overlapping(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<MaintenanceAnalyticsReport>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT report_json FROM analytics_report
            WHERE period_from <= ?2 AND period_to >= ?1
            ORDER BY created_at DESC, report_id DESC
            "#,
        )?;
        let rows = stmt.query_map(
            params![range.from.to_string(), range.to.to_string()],
            |row| row.get::<_, String>(0),
        )?;

        let mut reports = Vec::new();
        for row in rows {
            let payload = row?;
            reports.push(serde_json::from_str(&payload).map_err(|e| {
                RepositoryError::SerializationError {
                    entity: "MaintenanceAnalyticsReport".to_string(),
                    message: e.to_string(),
                }
            })?);
        }
        Ok(reports)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn memory_repo() -> AnalyticsReportRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        AnalyticsReportRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_find_by_id_not_found() {
        let repo = memory_repo();
        assert!(matches!(
            repo.find_by_id("RPT-NONE").unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }
}
