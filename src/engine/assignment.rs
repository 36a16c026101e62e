// ==========================================
// 预测性维护排程系统 - 技师分派引擎
// ==========================================
// 职责: 按技能交集为任务匹配技师
// 输入: 任务列表 + 在岗技师列表
// 输出: Vec<TechnicianAssignment> (仅含有匹配任务的技师)
// ==========================================
// 已知简化: 同一任务允许被多名技师匹配认领,不做互斥约束。
// 是否改为独占分派 (贪心二部匹配) 是开放问题,不在此处静默修正。
// ==========================================

use crate::domain::task::{MaintenanceTask, Technician, TechnicianAssignment};
use tracing::debug;

// ==========================================
// AssignmentResolver - 技师分派引擎
// ==========================================
/// 技师分派引擎 (无状态)
pub struct AssignmentResolver;

impl AssignmentResolver {
    /// 构造函数
    pub fn new() -> Self {
        Self
    }

    /// 解析任务分派
    ///
    /// # 参数
    /// - tasks: 维护任务列表
    /// - technicians: 技师列表 (非在岗技师被跳过)
    ///
    /// # 返回
    /// 技师分派列表: 每名技师匹配其技能覆盖的任务,
    /// 无匹配任务的技师不出现在结果中;
    /// estimated_hours = Σ(匹配任务分钟)/60,保留一位小数
    pub fn resolve(
        &self,
        tasks: &[MaintenanceTask],
        technicians: &[Technician],
    ) -> Vec<TechnicianAssignment> {
        let mut assignments = Vec::new();

        for technician in technicians {
            if !technician.active {
                debug!(
                    technician_id = %technician.technician_id,
                    "技师非在岗,跳过分派"
                );
                continue;
            }

            let matched: Vec<&MaintenanceTask> = tasks
                .iter()
                .filter(|task| {
                    task.required_skills
                        .iter()
                        .any(|skill| technician.specializations.contains(skill))
                })
                .collect();

            if matched.is_empty() {
                continue;
            }

            let total_minutes: i64 = matched.iter().map(|t| t.estimated_minutes).sum();
            let estimated_hours = (total_minutes as f64 / 60.0 * 10.0).round() / 10.0;

            assignments.push(TechnicianAssignment {
                technician_id: technician.technician_id.clone(),
                technician_name: technician.name.clone(),
                matched_task_ids: matched.iter().map(|t| t.task_id.clone()).collect(),
                estimated_hours,
            });
        }

        debug!(
            task_count = tasks.len(),
            technician_count = technicians.len(),
            assignment_count = assignments.len(),
            "技师分派完成"
        );

        assignments
    }
}

impl Default for AssignmentResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn task(task_id: &str, minutes: i64, skills: &[&str]) -> MaintenanceTask {
        MaintenanceTask {
            task_id: task_id.to_string(),
            name: format!("任务{}", task_id),
            description: String::new(),
            estimated_minutes: minutes,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            tools: vec![],
            parts: vec![],
            safety_requirements: vec![],
        }
    }

    fn technician(id: &str, active: bool, specs: &[&str]) -> Technician {
        Technician {
            technician_id: id.to_string(),
            name: format!("技师{}", id),
            active,
            specializations: specs.iter().map(|s| s.to_string()).collect(),
            hourly_rate: None,
            max_hours_per_day: 8.0,
        }
    }

    #[test]
    fn test_skill_intersection_matching() {
        let tasks = vec![
            task("T01", 30, &["mechanical"]),
            task("T02", 45, &["electrical"]),
            task("T03", 90, &["mechanical", "electrical"]),
        ];
        let technicians = vec![
            technician("TECH-1", true, &["mechanical"]),
            technician("TECH-2", true, &["electrical"]),
            technician("TECH-3", true, &["hvac"]),
        ];

        let assignments = AssignmentResolver::new().resolve(&tasks, &technicians);

        // TECH-3 无匹配任务,不出现
        assert_eq!(assignments.len(), 2);

        let a1 = &assignments[0];
        assert_eq!(a1.technician_id, "TECH-1");
        assert_eq!(a1.matched_task_ids, vec!["T01", "T03"]);
        // (30+90)/60 = 2.0
        assert_eq!(a1.estimated_hours, 2.0);

        let a2 = &assignments[1];
        assert_eq!(a2.matched_task_ids, vec!["T02", "T03"]);
        // (45+90)/60 = 2.25 → 2.3 (一位小数)
        assert_eq!(a2.estimated_hours, 2.3);
    }

    #[test]
    fn test_inactive_technician_skipped() {
        let tasks = vec![task("T01", 60, &["mechanical"])];
        let technicians = vec![technician("TECH-1", false, &["mechanical"])];

        let assignments = AssignmentResolver::new().resolve(&tasks, &technicians);
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_task_may_be_claimed_by_multiple_technicians() {
        // 已知简化: 不做互斥,两名同技能技师都会认领同一任务
        let tasks = vec![task("T01", 60, &["mechanical"])];
        let technicians = vec![
            technician("TECH-1", true, &["mechanical"]),
            technician("TECH-2", true, &["mechanical"]),
        ];

        let assignments = AssignmentResolver::new().resolve(&tasks, &technicians);
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].matched_task_ids, vec!["T01"]);
        assert_eq!(assignments[1].matched_task_ids, vec!["T01"]);
    }

    #[test]
    fn test_hours_rounding_one_decimal() {
        // 50 分钟 = 0.8333h → 0.8
        let tasks = vec![task("T01", 50, &["mechanical"])];
        let technicians = vec![technician("TECH-1", true, &["mechanical"])];

        let assignments = AssignmentResolver::new().resolve(&tasks, &technicians);
        assert_eq!(assignments[0].estimated_hours, 0.8);
    }
}
