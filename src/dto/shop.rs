use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::{ShopEffect, ShopItem},
    dto::session::UserProfile,
};

/// One catalog entry exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ShopItemView {
    /// Stable identifier used in purchase requests.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price in XP.
    pub price: u64,
    /// "cosmetic" or "buff".
    pub kind: String,
    /// Multiplier granted by buff items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl From<&ShopItem> for ShopItemView {
    fn from(item: &ShopItem) -> Self {
        let (kind, multiplier) = match &item.effect {
            ShopEffect::Cosmetic => ("cosmetic", None),
            ShopEffect::Buff { multiplier, .. } => ("buff", Some(*multiplier)),
        };
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            kind: kind.to_string(),
            multiplier,
        }
    }
}

/// Catalog listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShopCatalogResponse {
    /// All purchasable items.
    pub items: Vec<ShopItemView>,
}

/// Request to buy one shop item.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PurchaseRequest {
    /// Identifier of the item to buy.
    #[validate(length(min = 1, max = 64))]
    pub item_id: String,
}

/// Result of a successful purchase.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    /// Identifier of the purchased item.
    pub item_id: String,
    /// Profile after the purchase.
    pub profile: UserProfile,
}
