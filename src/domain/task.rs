// ==========================================
// 预测性维护排程系统 - 维护任务与技师实体
// ==========================================
// 职责: 维护任务、备件、技师与任务分派结构
// ==========================================

use crate::domain::types::SafetyRequirement;
use serde::{Deserialize, Serialize};

// ==========================================
// SparePart - 备件
// ==========================================
/// 备件条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    /// 备件编码
    pub part_no: String,
    /// 备件名称
    pub name: String,
    /// 单价
    pub unit_cost: f64,
    /// 数量
    pub quantity: u32,
}

impl SparePart {
    /// 行项目金额 (单价 × 数量)
    pub fn line_cost(&self) -> f64 {
        self.unit_cost * self.quantity as f64
    }
}

// ==========================================
// MaintenanceTask - 维护任务
// ==========================================
/// 维护任务
///
/// task_id 在单个排程内唯一 (由任务目录引擎顺序编号)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceTask {
    /// 任务ID (排程内唯一, T01 起顺序编号)
    pub task_id: String,
    /// 任务名称
    pub name: String,
    /// 任务说明
    pub description: String,
    /// 预计工时 (分钟)
    pub estimated_minutes: i64,
    /// 所需技能
    pub required_skills: Vec<String>,
    /// 所需工具
    pub tools: Vec<String>,
    /// 所需备件
    pub parts: Vec<SparePart>,
    /// 安全要求
    pub safety_requirements: Vec<SafetyRequirement>,
}

impl MaintenanceTask {
    /// 任务备件合计金额
    pub fn parts_cost(&self) -> f64 {
        self.parts.iter().map(|p| p.line_cost()).sum()
    }
}

// ==========================================
// Technician - 技师 (外部技师名录提供)
// ==========================================
/// 技师主数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    /// 技师ID
    pub technician_id: String,
    /// 姓名
    pub name: String,
    /// 是否在岗
    pub active: bool,
    /// 专业技能
    pub specializations: Vec<String>,
    /// 小时费率覆写 (缺省时使用配置费率)
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    /// 单日最大工时
    #[serde(default = "default_max_hours")]
    pub max_hours_per_day: f64,
}

fn default_max_hours() -> f64 {
    8.0
}

// ==========================================
// TechnicianAssignment - 任务分派
// ==========================================
/// 技师任务分派
///
/// 已知简化: 同一任务允许被多名技师匹配认领,不做互斥约束。
/// 是否应改为独占分派 (如贪心二部匹配) 仍是开放问题,见 DESIGN.md。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianAssignment {
    /// 技师ID
    pub technician_id: String,
    /// 技师姓名
    pub technician_name: String,
    /// 匹配到的任务ID列表
    pub matched_task_ids: Vec<String>,
    /// 预计工时 (小时, 保留一位小数)
    pub estimated_hours: f64,
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spare_part_line_cost() {
        let part = SparePart {
            part_no: "BRG-6204".to_string(),
            name: "深沟球轴承".to_string(),
            unit_cost: 45.0,
            quantity: 2,
        };
        assert_eq!(part.line_cost(), 90.0);
    }

    #[test]
    fn test_task_parts_cost() {
        let task = MaintenanceTask {
            task_id: "T01".to_string(),
            name: "轴承更换".to_string(),
            description: "更换磨损轴承".to_string(),
            estimated_minutes: 90,
            required_skills: vec!["mechanical".to_string()],
            tools: vec!["拉马".to_string()],
            parts: vec![
                SparePart {
                    part_no: "BRG-6204".to_string(),
                    name: "深沟球轴承".to_string(),
                    unit_cost: 45.0,
                    quantity: 2,
                },
                SparePart {
                    part_no: "GRS-EP2".to_string(),
                    name: "润滑脂".to_string(),
                    unit_cost: 12.5,
                    quantity: 1,
                },
            ],
            safety_requirements: vec![SafetyRequirement::LockoutTagout],
        };
        assert_eq!(task.parts_cost(), 102.5);
    }
}
