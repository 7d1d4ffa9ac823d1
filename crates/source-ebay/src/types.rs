//! Finding API wire types.
//!
//! The Finding API wraps nearly every scalar in a one-element array, so the
//! raw shapes here mirror that and the accessor methods flatten it. Parsing
//! of prices and timestamps happens in the adapter, where a bad value drops
//! one item instead of failing the response.

use serde::Deserialize;

/// Top-level Finding API response. Exactly one of the operation fields is
/// populated, depending on which operation was called.
#[derive(Debug, Clone, Deserialize)]
pub struct FindingResponse {
    #[serde(rename = "findItemsAdvancedResponse")]
    pub advanced: Option<Vec<ResponseBody>>,
    #[serde(rename = "findCompletedItemsResponse")]
    pub completed: Option<Vec<ResponseBody>>,
}

impl FindingResponse {
    /// The operation body, whichever operation produced it.
    #[must_use]
    pub fn body(&self) -> Option<&ResponseBody> {
        self.advanced
            .as_deref()
            .or(self.completed.as_deref())
            .and_then(<[ResponseBody]>::first)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBody {
    pub ack: Option<Vec<String>>,
    #[serde(rename = "searchResult")]
    pub search_result: Option<Vec<SearchResult>>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<serde_json::Value>,
}

impl ResponseBody {
    /// Whether the API reported success. "Warning" still carries results.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(
            self.ack.as_deref().and_then(<[String]>::first).map(String::as_str),
            Some("Success" | "Warning")
        )
    }

    /// All items in the first search result block.
    #[must_use]
    pub fn items(&self) -> &[RawItem] {
        self.search_result
            .as_deref()
            .and_then(<[SearchResult]>::first)
            .and_then(|r| r.item.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "@count")]
    pub count: Option<String>,
    pub item: Option<Vec<RawItem>>,
}

/// One listing as returned by the Finding API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(rename = "itemId")]
    pub item_id: Option<Vec<String>>,
    pub title: Option<Vec<String>>,
    #[serde(rename = "sellingStatus")]
    pub selling_status: Option<Vec<SellingStatus>>,
    #[serde(rename = "listingInfo")]
    pub listing_info: Option<Vec<ListingInfo>>,
    pub condition: Option<Vec<ConditionInfo>>,
    #[serde(rename = "sellerInfo")]
    pub seller_info: Option<Vec<SellerInfo>>,
    #[serde(rename = "viewItemURL")]
    pub view_item_url: Option<Vec<String>>,
}

impl RawItem {
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        first_str(self.item_id.as_deref())
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        first_str(self.title.as_deref())
    }

    #[must_use]
    pub fn price(&self) -> Option<&Money> {
        self.selling_status
            .as_deref()
            .and_then(<[SellingStatus]>::first)
            .and_then(|s| s.current_price.as_deref())
            .and_then(<[Money]>::first)
    }

    #[must_use]
    pub fn selling_state(&self) -> Option<&str> {
        self.selling_status
            .as_deref()
            .and_then(<[SellingStatus]>::first)
            .and_then(|s| first_str(s.selling_state.as_deref()))
    }

    #[must_use]
    pub fn listing_type(&self) -> Option<&str> {
        self.listing_info
            .as_deref()
            .and_then(<[ListingInfo]>::first)
            .and_then(|l| first_str(l.listing_type.as_deref()))
    }

    #[must_use]
    pub fn end_time(&self) -> Option<&str> {
        self.listing_info
            .as_deref()
            .and_then(<[ListingInfo]>::first)
            .and_then(|l| first_str(l.end_time.as_deref()))
    }

    #[must_use]
    pub fn condition_name(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .and_then(<[ConditionInfo]>::first)
            .and_then(|c| first_str(c.condition_display_name.as_deref()))
    }

    #[must_use]
    pub fn seller_name(&self) -> Option<&str> {
        self.seller_info
            .as_deref()
            .and_then(<[SellerInfo]>::first)
            .and_then(|s| first_str(s.seller_user_name.as_deref()))
    }

    #[must_use]
    pub fn feedback_percent(&self) -> Option<&str> {
        self.seller_info
            .as_deref()
            .and_then(<[SellerInfo]>::first)
            .and_then(|s| first_str(s.positive_feedback_percent.as_deref()))
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        first_str(self.view_item_url.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellingStatus {
    #[serde(rename = "currentPrice")]
    pub current_price: Option<Vec<Money>>,
    #[serde(rename = "sellingState")]
    pub selling_state: Option<Vec<String>>,
}

/// Price with currency, e.g. `{"@currencyId": "USD", "__value__": "8.99"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    #[serde(rename = "@currencyId")]
    pub currency_id: Option<String>,
    #[serde(rename = "__value__")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingInfo {
    #[serde(rename = "listingType")]
    pub listing_type: Option<Vec<String>>,
    #[serde(rename = "endTime")]
    pub end_time: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionInfo {
    #[serde(rename = "conditionDisplayName")]
    pub condition_display_name: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerInfo {
    #[serde(rename = "sellerUserName")]
    pub seller_user_name: Option<Vec<String>>,
    #[serde(rename = "positiveFeedbackPercent")]
    pub positive_feedback_percent: Option<Vec<String>>,
}

fn first_str(values: Option<&[String]>) -> Option<&str> {
    values.and_then(<[String]>::first).map(String::as_str)
}
