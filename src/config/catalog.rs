// ==========================================
// 预测性维护排程系统 - 任务目录配置
// ==========================================
// 职责: 设备类别 → 任务模板的注入式查表配置
// 红线: 目录是配置不是硬编码全局量,可整体替换、可独立测试
// ==========================================

use crate::domain::task::SparePart;
use crate::domain::types::SafetyRequirement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// TaskTemplate - 任务模板
// ==========================================
/// 任务模板 (目录条目,生成时才分配任务ID)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// 任务名称
    pub name: String,
    /// 任务说明
    pub description: String,
    /// 预计工时 (分钟)
    pub estimated_minutes: i64,
    /// 所需技能
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// 所需工具
    #[serde(default)]
    pub tools: Vec<String>,
    /// 所需备件
    #[serde(default)]
    pub parts: Vec<SparePart>,
    /// 安全要求
    #[serde(default)]
    pub safety_requirements: Vec<SafetyRequirement>,
}

// ==========================================
// TaskCatalog - 任务目录
// ==========================================
/// 任务目录
///
/// - categories: 类别 → 有序任务模板列表 (键统一大写)
/// - generic: 未知类别的兜底模板 (点检 + 清洁)
/// - critical_replacement: 高失效概率时追加的关键部件更换模板
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCatalog {
    /// 类别任务表
    pub categories: HashMap<String, Vec<TaskTemplate>>,
    /// 未知类别兜底
    pub generic: Vec<TaskTemplate>,
    /// 关键部件更换模板 (必须含非零备件成本 + 上锁挂牌)
    pub critical_replacement: TaskTemplate,
}

impl TaskCatalog {
    /// 按类别查任务模板,未知类别回退到兜底模板
    ///
    /// # 参数
    /// - category: 设备类别 (大小写不敏感)
    pub fn templates_for(&self, category: &str) -> &[TaskTemplate] {
        self.categories
            .get(&category.to_uppercase())
            .map(|v| v.as_slice())
            .unwrap_or(&self.generic)
    }

    /// 从 JSON 字符串加载目录
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        let mut categories = HashMap::new();

        categories.insert(
            "PUMP".to_string(),
            vec![
                template("泵体点检", "检查泵体振动/噪声/温升", 30, &["mechanical"], &["测振仪"]),
                template_with_parts(
                    "机械密封检查",
                    "检查密封泄漏并按需更换",
                    60,
                    &["mechanical"],
                    &["密封工装"],
                    vec![part("SEAL-MS20", "机械密封", 85.0, 1)],
                    vec![SafetyRequirement::LockoutTagout],
                ),
                template_with_parts(
                    "轴承润滑",
                    "补充润滑脂并记录用量",
                    20,
                    &["mechanical"],
                    &["润滑枪"],
                    vec![part("GRS-EP2", "润滑脂", 12.5, 1)],
                    vec![],
                ),
            ],
        );

        categories.insert(
            "MOTOR".to_string(),
            vec![
                template("电机点检", "检查绕组温度/电流平衡", 30, &["electrical"], &["钳形表"]),
                template_with_parts(
                    "绝缘测试",
                    "兆欧表绝缘电阻测试",
                    45,
                    &["electrical"],
                    &["兆欧表"],
                    vec![],
                    vec![SafetyRequirement::ElectricalIsolation, SafetyRequirement::LockoutTagout],
                ),
                template_with_parts(
                    "冷却风道清洁",
                    "清理风道积灰",
                    30,
                    &["electrical", "mechanical"],
                    &["吸尘器"],
                    vec![part("FLT-AX10", "进风滤网", 18.0, 1)],
                    vec![],
                ),
            ],
        );

        categories.insert(
            "COMPRESSOR".to_string(),
            vec![
                template("压缩机点检", "检查排气压力/温度/油位", 40, &["mechanical"], &["压力表"]),
                template_with_parts(
                    "油滤更换",
                    "更换润滑油滤芯",
                    50,
                    &["mechanical"],
                    &["滤芯扳手"],
                    vec![part("FLT-OL33", "油滤芯", 42.0, 1)],
                    vec![SafetyRequirement::LockoutTagout],
                ),
                template_with_parts(
                    "安全阀校验",
                    "校验安全阀起跳压力",
                    60,
                    &["mechanical", "safety"],
                    &["校验台"],
                    vec![],
                    vec![SafetyRequirement::Ppe],
                ),
            ],
        );

        categories.insert(
            "CONVEYOR".to_string(),
            vec![
                template("输送带巡检", "检查跑偏/磨损/接头", 30, &["mechanical"], &[]),
                template_with_parts(
                    "托辊更换",
                    "更换异响/卡死托辊",
                    60,
                    &["mechanical"],
                    &["撬棍"],
                    vec![part("RLR-089", "托辊", 35.0, 2)],
                    vec![SafetyRequirement::LockoutTagout],
                ),
                template("张紧调整", "调整张紧装置至标准行程", 25, &["mechanical"], &["扭矩扳手"]),
            ],
        );

        categories.insert(
            "HVAC".to_string(),
            vec![
                template("机组点检", "检查制冷剂压力/冷凝器结垢", 35, &["hvac"], &["歧管压力表"]),
                template_with_parts(
                    "滤网更换",
                    "更换回风滤网",
                    20,
                    &["hvac"],
                    &[],
                    vec![part("FLT-HV01", "回风滤网", 22.0, 2)],
                    vec![],
                ),
            ],
        );

        let generic = vec![
            template("设备点检", "通用外观/运行状态点检", 30, &["mechanical"], &[]),
            template("设备清洁", "通用清洁与紧固", 30, &[], &[]),
        ];

        let critical_replacement = template_with_parts(
            "关键部件更换",
            "高失效风险下的关键磨损件预防性更换",
            120,
            &["mechanical", "electrical"],
            &["专用工装"],
            vec![part("CRT-KIT", "关键部件套件", 350.0, 1)],
            vec![SafetyRequirement::LockoutTagout, SafetyRequirement::Ppe],
        );

        Self {
            categories,
            generic,
            critical_replacement,
        }
    }
}

// ==========================================
// 模板构造辅助
// ==========================================

fn template(
    name: &str,
    description: &str,
    minutes: i64,
    skills: &[&str],
    tools: &[&str],
) -> TaskTemplate {
    template_with_parts(name, description, minutes, skills, tools, vec![], vec![])
}

fn template_with_parts(
    name: &str,
    description: &str,
    minutes: i64,
    skills: &[&str],
    tools: &[&str],
    parts: Vec<SparePart>,
    safety: Vec<SafetyRequirement>,
) -> TaskTemplate {
    TaskTemplate {
        name: name.to_string(),
        description: description.to_string(),
        estimated_minutes: minutes,
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        tools: tools.iter().map(|s| s.to_string()).collect(),
        parts,
        safety_requirements: safety,
    }
}

fn part(part_no: &str, name: &str, unit_cost: f64, quantity: u32) -> SparePart {
    SparePart {
        part_no: part_no.to_string(),
        name: name.to_string(),
        unit_cost,
        quantity,
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_for_known_category() {
        let catalog = TaskCatalog::default();
        let pump = catalog.templates_for("PUMP");
        assert_eq!(pump.len(), 3);
        assert_eq!(pump[0].name, "泵体点检");

        // 大小写不敏感
        assert_eq!(catalog.templates_for("pump").len(), 3);
    }

    #[test]
    fn test_templates_for_unknown_category_falls_back() {
        let catalog = TaskCatalog::default();
        let unknown = catalog.templates_for("TURBO_ENCABULATOR");
        assert_eq!(unknown.len(), 2);
        assert_eq!(unknown[0].name, "设备点检");
    }

    #[test]
    fn test_critical_replacement_template_contract() {
        let catalog = TaskCatalog::default();
        let tpl = &catalog.critical_replacement;

        // 关键部件更换必须带非零备件成本与上锁挂牌
        let parts_cost: f64 = tpl.parts.iter().map(|p| p.line_cost()).sum();
        assert!(parts_cost > 0.0);
        assert!(tpl
            .safety_requirements
            .contains(&SafetyRequirement::LockoutTagout));
    }

    #[test]
    fn test_catalog_loads_from_json() {
        let raw = serde_json::to_string(&TaskCatalog::default()).unwrap();
        let restored = TaskCatalog::from_json(&raw).unwrap();
        assert_eq!(restored.templates_for("MOTOR").len(), 3);
    }
}
