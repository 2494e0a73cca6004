use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 工程主表 (works)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Work {
    pub id: i64,
    pub name: String,
    pub village: Option<String>,
    pub fund_head: Option<String>,
    /// 上次保存的汇总快照, 只用于恢复税项和单位倍数
    #[serde(skip)]
    pub recap_json: Option<serde_json::Value>,
}

/// 子工程 (subworks)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subwork {
    pub id: i64,
    pub work_id: i64,
    pub sequence: i64,
    pub name: String,
    pub unit: Option<String>, // 自由文本, 非数字时按 1 处理
}

/// 子工程明细项 (subwork_items)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SubworkItem {
    pub subwork_id: i64,
    pub sequence: i64,
    #[sqlx(try_from = "Option<String>")]
    #[serde(default)]
    pub category: ItemCategory,
    pub total_item_amount: Option<f64>,
}

/// 汇总表的三个部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Part {
    A,
    B,
    C,
}

/// 明细分类标签
///
/// 存储层是自由文本, 在加载边界转换; 无法识别的标签保留原文, 不计入任何部分。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ItemCategory {
    #[default]
    Regular,
    Royalty,
    Testing,
    WithGst,
    Materials,
    Purchasing,
    Other(String),
}

impl ItemCategory {
    pub fn parse(tag: Option<&str>) -> Self {
        match tag {
            None | Some("") => ItemCategory::Regular,
            Some("royalty") => ItemCategory::Royalty,
            Some("testing") => ItemCategory::Testing,
            Some("With GST") => ItemCategory::WithGst,
            Some("materials") => ItemCategory::Materials,
            Some("purchasing") => ItemCategory::Purchasing,
            Some(other) => ItemCategory::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> Option<&str> {
        match self {
            ItemCategory::Regular => None,
            ItemCategory::Royalty => Some("royalty"),
            ItemCategory::Testing => Some("testing"),
            ItemCategory::WithGst => Some("With GST"),
            ItemCategory::Materials => Some("materials"),
            ItemCategory::Purchasing => Some("purchasing"),
            ItemCategory::Other(tag) => Some(tag),
        }
    }

    /// 该分类归属的部分, 未知标签返回 None
    pub fn part(&self) -> Option<Part> {
        match self {
            ItemCategory::Regular => Some(Part::A),
            ItemCategory::Royalty | ItemCategory::Testing => Some(Part::B),
            ItemCategory::WithGst | ItemCategory::Materials | ItemCategory::Purchasing => {
                Some(Part::C)
            }
            ItemCategory::Other(_) => None,
        }
    }
}

impl From<Option<String>> for ItemCategory {
    fn from(tag: Option<String>) -> Self {
        ItemCategory::parse(tag.as_deref())
    }
}

impl From<ItemCategory> for Option<String> {
    fn from(category: ItemCategory) -> Self {
        category.as_tag().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_tags_are_regular() {
        assert_eq!(ItemCategory::parse(None), ItemCategory::Regular);
        assert_eq!(ItemCategory::parse(Some("")), ItemCategory::Regular);
    }

    #[test]
    fn tags_match_case_sensitively() {
        assert_eq!(ItemCategory::parse(Some("With GST")), ItemCategory::WithGst);
        assert_eq!(
            ItemCategory::parse(Some("Royalty")),
            ItemCategory::Other("Royalty".to_string())
        );
        assert_eq!(ItemCategory::parse(Some("Royalty")).part(), None);
    }

    #[test]
    fn item_category_serializes_as_stored_tag() {
        let item = SubworkItem {
            subwork_id: 7,
            sequence: 1,
            category: ItemCategory::WithGst,
            total_item_amount: Some(120.0),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["category"], "With GST");

        let back: SubworkItem = serde_json::from_value(serde_json::json!({
            "subwork_id": 7,
            "sequence": 2,
            "category": null,
            "total_item_amount": null
        }))
        .unwrap();
        assert_eq!(back.category, ItemCategory::Regular);
        assert_eq!(back.total_item_amount, None);
    }
}
