use serde::Serialize;

/// Query parameters shared by the endpoints that return a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingOptions {
    /// Maximum number of items to return. Reddit defaults to 25, caps at 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Fullname of the item to page after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Fullname of the item to page before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_detail: Option<bool>,
    /// Time filter for top/controversial: hour, day, week, month, year, all.
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl ListingOptions {
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }
}
