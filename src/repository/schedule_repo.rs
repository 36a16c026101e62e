// ==========================================
// 预测性维护排程系统 - 维护排程仓储
// ==========================================
// 红线: Repository 不含业务逻辑,只负责数据访问
// 并发: 状态/整单更新走乐观锁 (revision 比对)
// 存储: 查询键单列展开 + 完整聚合 JSON (payload_json)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::schedule::MaintenanceSchedule;
use crate::domain::types::{DateRange, ScheduleStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleRepository - 维护排程仓储
// ==========================================
/// 维护排程仓储
///
/// 职责: 管理 maintenance_schedule 表的 CRUD 操作
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的 ScheduleRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 聚合序列化
    fn to_payload(schedule: &MaintenanceSchedule) -> RepositoryResult<String> {
        serde_json::to_string(schedule).map_err(|e| RepositoryError::SerializationError {
            entity: "MaintenanceSchedule".to_string(),
            message: e.to_string(),
        })
    }

    /// 聚合反序列化
    fn from_payload(raw: &str) -> RepositoryResult<MaintenanceSchedule> {
        serde_json::from_str(raw).map_err(|e| RepositoryError::SerializationError {
            entity: "MaintenanceSchedule".to_string(),
            message: e.to_string(),
        })
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 插入排程
    pub fn insert(&self, schedule: &MaintenanceSchedule) -> RepositoryResult<()> {
        let payload = Self::to_payload(schedule)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO maintenance_schedule (
                schedule_id, equipment_id, equipment_name, equipment_category,
                status, priority_level, strategy, scheduled_date,
                estimated_duration_hours, total_cost_estimate,
                payload_json, created_at, updated_at, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                schedule.schedule_id,
                schedule.equipment_id,
                schedule.equipment_name,
                schedule.equipment_category,
                schedule.status.to_db_str(),
                schedule.priority_level.to_db_str(),
                schedule.strategy.as_str(),
                schedule.scheduled_date.to_string(),
                schedule.estimated_duration_hours,
                schedule.cost_analysis.total_cost_estimate,
                payload,
                schedule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                schedule.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                schedule.revision,
            ],
        )?;
        Ok(())
    }

    /// 批量插入 (事务)
    pub fn batch_insert(&self, schedules: &[MaintenanceSchedule]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for schedule in schedules {
            let payload = Self::to_payload(schedule)?;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO maintenance_schedule (
                    schedule_id, equipment_id, equipment_name, equipment_category,
                    status, priority_level, strategy, scheduled_date,
                    estimated_duration_hours, total_cost_estimate,
                    payload_json, created_at, updated_at, revision
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    schedule.schedule_id,
                    schedule.equipment_id,
                    schedule.equipment_name,
                    schedule.equipment_category,
                    schedule.status.to_db_str(),
                    schedule.priority_level.to_db_str(),
                    schedule.strategy.as_str(),
                    schedule.scheduled_date.to_string(),
                    schedule.estimated_duration_hours,
                    schedule.cost_analysis.total_cost_estimate,
                    payload,
                    schedule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    schedule.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    schedule.revision,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 状态转换 (乐观锁)
    ///
    /// # 参数
    /// - schedule_id: 排程ID
    /// - target: 目标状态
    /// - expected_revision: 期望修订号
    ///
    /// # 返回
    /// - Ok(MaintenanceSchedule): 更新后的排程 (revision+1)
    /// - Err(InvalidStateTransition): 非法转换
    /// - Err(OptimisticLockFailure): 修订号不匹配
    pub fn update_status(
        &self,
        schedule_id: &str,
        target: ScheduleStatus,
        expected_revision: i32,
    ) -> RepositoryResult<MaintenanceSchedule> {
        let mut schedule = self.find_by_id(schedule_id)?;

        if schedule.revision != expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                entity_id: schedule_id.to_string(),
                expected: expected_revision,
                actual: schedule.revision,
            });
        }

        if !schedule.status.can_transition_to(target) {
            return Err(RepositoryError::InvalidStateTransition {
                from: schedule.status.to_string(),
                to: target.to_string(),
            });
        }

        schedule.status = target;
        schedule.revision += 1;
        schedule.updated_at = Utc::now().naive_utc();

        self.replace(&schedule, expected_revision)?;
        Ok(schedule)
    }

    /// 整单替换 (乐观锁,供优化提案应用使用)
    ///
    /// # 参数
    /// - schedule: 新内容 (revision 必须已是 expected_revision+1)
    /// - expected_revision: 数据库中期望的当前修订号
    pub fn replace(
        &self,
        schedule: &MaintenanceSchedule,
        expected_revision: i32,
    ) -> RepositoryResult<()> {
        let payload = Self::to_payload(schedule)?;

        // 锁作用域收紧: 失败分支还要重新读取当前修订号
        let affected = {
            let conn = self.get_conn()?;
            conn.execute(
                r#"
                UPDATE maintenance_schedule SET
                    status = ?2, priority_level = ?3, scheduled_date = ?4,
                    estimated_duration_hours = ?5, total_cost_estimate = ?6,
                    payload_json = ?7, updated_at = ?8, revision = ?9
                WHERE schedule_id = ?1 AND revision = ?10
                "#,
                params![
                    schedule.schedule_id,
                    schedule.status.to_db_str(),
                    schedule.priority_level.to_db_str(),
                    schedule.scheduled_date.to_string(),
                    schedule.estimated_duration_hours,
                    schedule.cost_analysis.total_cost_estimate,
                    payload,
                    schedule.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    schedule.revision,
                    expected_revision,
                ],
            )?
        };

        if affected == 0 {
            // 区分"不存在"与"修订号过期"
            let current = self.find_by_id(&schedule.schedule_id)?;
            return Err(RepositoryError::OptimisticLockFailure {
                entity_id: schedule.schedule_id.clone(),
                expected: expected_revision,
                actual: current.revision,
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, schedule_id: &str) -> RepositoryResult<MaintenanceSchedule> {
        let conn = self.get_conn()?;
        let payload: String = conn
            .query_row(
                "SELECT payload_json FROM maintenance_schedule WHERE schedule_id = ?1",
                params![schedule_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "MaintenanceSchedule".to_string(),
                    id: schedule_id.to_string(),
                },
                other => other.into(),
            })?;
        Self::from_payload(&payload)
    }

    /// 组合条件查询 (设备集合 / 日期窗口均可选)
    ///
    /// 结果按 (scheduled_date, schedule_id) 升序,保证确定性
    pub fn list(
        &self,
        equipment_ids: Option<&[String]>,
        date_range: Option<DateRange>,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            "SELECT payload_json FROM maintenance_schedule WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ids) = equipment_ids {
            if ids.is_empty() {
                return Ok(vec![]);
            }
            let placeholders: Vec<String> = (0..ids.len())
                .map(|i| format!("?{}", args.len() + i + 1))
                .collect();
            sql.push_str(&format!(
                " AND equipment_id IN ({})",
                placeholders.join(", ")
            ));
            for id in ids {
                args.push(Box::new(id.clone()));
            }
        }

        if let Some(range) = date_range {
            sql.push_str(&format!(
                " AND scheduled_date >= ?{} AND scheduled_date <= ?{}",
                args.len() + 1,
                args.len() + 2
            ));
            args.push(Box::new(range.from.to_string()));
            args.push(Box::new(range.to.to_string()));
        }

        sql.push_str(" ORDER BY scheduled_date ASC, schedule_id ASC");

        let mut stmt = conn.prepare(&sql)?;
        let arg_refs: Vec<&dyn rusqlite::types::ToSql> =
            args.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(arg_refs.as_slice(), |row| row.get::<_, String>(0))?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(Self::from_payload(&row?)?);
        }
        Ok(schedules)
    }

    /// 查询窗口内排程 (舰队优化快照入口)
    pub fn list_in_window(&self, range: DateRange) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        self.list(None, Some(range))
    }
}

// ==========================================
// 单元测试
// ==========================================
// 注: 依赖完整聚合构造,主要覆盖由 tests/ 下集成测试完成;
// 此处仅验证 NotFound 路径。
#[cfg(test)]
mod tests {
    use super::*;

    fn memory_repo() -> ScheduleRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ScheduleRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_find_by_id_not_found() {
        let repo = memory_repo();
        let err = repo.find_by_id("SCH-NONE").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_list_with_empty_equipment_filter() {
        let repo = memory_repo();
        let result = repo.list(Some(&[]), None).unwrap();
        assert!(result.is_empty());
    }
}
