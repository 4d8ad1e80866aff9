//! Column-mapping configuration served by `GET /api/config/column_mappings`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Standard columns a spec file must or may provide, plus known aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Standard columns every confirmed spec must map.
    #[serde(default)]
    pub required_columns: Vec<String>,
    /// Standard columns that may be left unmapped.
    #[serde(default)]
    pub optional_columns: Vec<String>,
    /// Alias table: standard column -> accepted original header names.
    #[serde(default)]
    pub column_mappings: BTreeMap<String, Vec<String>>,
}

impl ColumnConfig {
    /// All standard columns in display order (required first, then optional).
    pub fn standard_columns(&self) -> impl Iterator<Item = &str> {
        self.required_columns
            .iter()
            .chain(self.optional_columns.iter())
            .map(String::as_str)
    }

    pub fn is_required(&self, column: &str) -> bool {
        self.required_columns.iter().any(|c| c == column)
    }

    /// True when `column` is a required or optional standard column.
    pub fn is_known(&self, column: &str) -> bool {
        self.standard_columns().any(|c| c == column)
    }

    /// Known aliases for a standard column (empty when none are configured).
    pub fn aliases(&self, column: &str) -> &[String] {
        self.column_mappings
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for ColumnConfig {
    /// The server's built-in configuration, used when the endpoint returns
    /// nothing better.
    fn default() -> Self {
        let aliases = |values: &[&str]| -> Vec<String> {
            values.iter().map(|v| (*v).to_string()).collect()
        };
        let mut column_mappings = BTreeMap::new();
        column_mappings.insert(
            "item_id".to_string(),
            aliases(&["产品ID", "商品编号", "货号", "item id", "itemid", "id"]),
        );
        column_mappings.insert(
            "product_name".to_string(),
            aliases(&[
                "产品名称",
                "商品名称",
                "名称",
                "product name",
                "productname",
                "name",
            ]),
        );
        column_mappings.insert("size".to_string(), aliases(&["尺寸", "规格", "型号", "size"]));
        column_mappings.insert("color".to_string(), aliases(&["颜色", "色彩", "color"]));
        column_mappings.insert(
            "standard_unit_price".to_string(),
            aliases(&["标准单价", "单价", "价格", "price", "unit price", "unitprice"]),
        );
        Self {
            required_columns: vec!["item_id".to_string(), "product_name".to_string()],
            optional_columns: vec![
                "size".to_string(),
                "color".to_string(),
                "standard_unit_price".to_string(),
            ],
            column_mappings,
        }
    }
}

/// Envelope of the configuration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfigResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub config: Option<ColumnConfig>,
    #[serde(default)]
    pub message: Option<String>,
}
