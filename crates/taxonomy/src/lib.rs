//! Static category → keyword lookup table.
//!
//! One table serves both scoring modes: it carries the generic product
//! words plus the brand terms used by plain substring scoring. Lookups for
//! unknown categories yield an empty keyword set, never an error.

use serde::Deserialize;
use stashwise_features::fuzzy_contains;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Empty category name")]
    EmptyName,
    #[error("Category '{0}' has no keywords")]
    EmptyKeywords(String),
    #[error("Category '{0}' listed more than once")]
    DuplicateCategory(String),
    #[error("Invalid taxonomy document: {0}")]
    Parse(#[from] serde_json::Error),
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "电子产品",
        &[
            "手机", "电脑", "笔记本", "平板", "耳机", "音响", "相机", "充电器", "数据线", "键盘",
            "鼠标", "显示器", "电视", "冰箱", "空调", "洗衣机", "智能手表", "手环", "路由器",
            "充电宝", "移动电源", "iPhone", "iPad", "MacBook", "华为", "小米", "三星", "索尼",
            "戴尔", "联想",
        ],
    ),
    (
        "服装配饰",
        &[
            "衣服", "裤子", "裙子", "外套", "T恤", "衬衫", "毛衣", "羽绒服", "鞋子", "运动鞋",
            "皮鞋", "靴子", "包包", "钱包", "手表", "眼镜", "帽子", "围巾", "手套", "袜子", "内衣",
            "睡衣", "耐克", "阿迪达斯", "优衣库", "ZARA", "H&M", "LV", "古驰",
        ],
    ),
    (
        "生活用品",
        &[
            "杯子", "餐具", "锅具", "刀具", "收纳", "清洁", "毛巾", "浴巾", "床上用品", "枕头",
            "被子", "床单", "窗帘", "地毯", "灯具", "家具", "椅子", "桌子", "沙发", "床", "衣柜",
            "书架", "宜家", "无印良品",
        ],
    ),
    (
        "书籍文具",
        &[
            "书籍", "图书", "小说", "教材", "笔记本", "笔", "铅笔", "钢笔", "橡皮", "尺子", "文具",
            "文件夹", "订书机", "胶水", "剪刀", "便利贴", "打印机", "墨盒", "纸张", "便签",
            "计算器", "编程", "JavaScript", "Python", "设计",
        ],
    ),
    (
        "食品饮料",
        &[
            "咖啡", "茶叶", "零食", "饼干", "巧克力", "糖果", "饮料", "果汁", "牛奶", "酸奶",
            "面包", "蛋糕", "坚果", "干果", "蜂蜜", "调料", "酱油", "醋", "盐", "糖", "香料",
            "食用油", "星巴克", "雀巢", "可乐",
        ],
    ),
    (
        "运动健身",
        &[
            "运动鞋", "运动服", "哑铃", "跑步机", "瑜伽垫", "健身", "运动", "篮球", "足球", "网球",
            "羽毛球", "乒乓球", "游泳", "骑行", "登山", "背包", "水壶", "毛巾", "护腕", "护膝",
            "健身房", "Keep",
        ],
    ),
    (
        "美妆护肤",
        &[
            "洗面奶", "面霜", "乳液", "精华", "面膜", "口红", "粉底", "眼影", "睫毛膏", "眼线笔",
            "腮红", "眉笔", "香水", "指甲油", "化妆刷", "卸妆水", "爽肤水", "防晒霜", "护手霜",
            "身体乳", "兰蔻", "雅诗兰黛", "欧莱雅", "美宝莲", "SK-II",
        ],
    ),
    (
        "母婴用品",
        &[
            "奶粉", "尿不湿", "婴儿", "儿童", "玩具", "奶瓶", "奶嘴", "婴儿车", "婴儿床",
            "安全座椅", "绘本", "拼图", "积木", "文具", "书包", "衣服", "鞋子", "帽子", "袜子",
            "餐具", "美赞臣", "花王", "帮宝适",
        ],
    ),
];

/// One category's curated keywords.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxonomyEntry {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered category → keyword-set table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTaxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Default for KeywordTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordTaxonomy {
    /// The table shipped with the crate.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(category, keywords)| TaxonomyEntry {
                category: (*category).to_string(),
                keywords: dedup(keywords.iter().map(|k| (*k).to_string())),
            })
            .collect();
        Self { entries }
    }

    /// Build a table from custom entries, keeping their order.
    ///
    /// Every category must have a non-empty name and at least one keyword.
    pub fn from_entries(
        entries: impl IntoIterator<Item = TaxonomyEntry>,
    ) -> Result<Self, TaxonomyError> {
        let mut built: Vec<TaxonomyEntry> = Vec::new();
        for entry in entries {
            let category = entry.category.trim().to_string();
            if category.is_empty() {
                return Err(TaxonomyError::EmptyName);
            }
            if built.iter().any(|e| e.category == category) {
                return Err(TaxonomyError::DuplicateCategory(category));
            }
            let keywords = dedup(
                entry
                    .keywords
                    .into_iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
            );
            if keywords.is_empty() {
                return Err(TaxonomyError::EmptyKeywords(category));
            }
            built.push(TaxonomyEntry { category, keywords });
        }
        Ok(Self { entries: built })
    }

    /// Parse a JSON array of `{category, keywords}` objects.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let entries: Vec<TaxonomyEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Keywords for a category name; empty for unknown names.
    pub fn keywords(&self, category: &str) -> &[String] {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Category names in table order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a token matches any keyword of the category (either-way
    /// containment, case-insensitive).
    pub fn token_matches(&self, category: &str, token: &str) -> bool {
        self.keywords(category)
            .iter()
            .any(|keyword| fuzzy_contains(keyword, token))
    }

    /// Number of the category's keywords found inside `text`
    /// (case-insensitive substring).
    pub fn hits_in(&self, category: &str, text: &str) -> usize {
        let text = text.to_lowercase();
        self.keywords(category)
            .iter()
            .filter(|keyword| text.contains(&keyword.to_lowercase()))
            .count()
    }
}

fn dedup(keywords: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        if !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}
