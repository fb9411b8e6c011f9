use tracing::info;
use uuid::Uuid;

use crate::{
    config::ShopEffect,
    dao::models::BuffEntity,
    dto::{
        session::UserProfile,
        shop::{PurchaseRequest, PurchaseResponse, ShopCatalogResponse, ShopItemView},
    },
    error::ServiceError,
    services::session_service,
    state::SharedState,
};

/// The full catalog, as configured.
pub fn catalog(state: &SharedState) -> ShopCatalogResponse {
    ShopCatalogResponse {
        items: state.config().shop().iter().map(ShopItemView::from).collect(),
    }
}

/// Buy one item for the session's user.
///
/// Cosmetics can be owned once and go to the inventory. Buying a buff
/// replaces any pending buff rather than stacking with it. The price is
/// deducted from XP and the level recomputed, so purchases can demote.
pub async fn purchase(
    state: &SharedState,
    session_id: Uuid,
    request: PurchaseRequest,
) -> Result<PurchaseResponse, ServiceError> {
    let item = state
        .config()
        .shop_item(&request.item_id)
        .ok_or_else(|| ServiceError::NotFound(format!("shop item `{}` not found", request.item_id)))?
        .clone();

    let session = state.session(session_id)?;
    let mut guard = session.lock().await;

    if guard.record.xp < item.price {
        return Err(ServiceError::InvalidInput(format!(
            "not enough XP for `{}`: costs {}, have {}",
            item.name, item.price, guard.record.xp
        )));
    }

    match &item.effect {
        ShopEffect::Cosmetic => {
            if guard.record.inventory.iter().any(|owned| *owned == item.id) {
                return Err(ServiceError::InvalidInput(format!(
                    "`{}` is already owned",
                    item.name
                )));
            }
            guard.record.inventory.push(item.id.clone());
        }
        ShopEffect::Buff { name, multiplier } => {
            guard.record.active_buffs = vec![BuffEntity {
                name: name.clone(),
                multiplier: *multiplier,
            }];
        }
    }

    guard.record.xp -= item.price;
    guard.record.level = state.config().level(guard.record.xp);
    info!(
        username = guard.record.username,
        item = item.id,
        price = item.price,
        "shop purchase"
    );

    session_service::persist(state, &guard).await;

    Ok(PurchaseResponse {
        item_id: item.id,
        profile: UserProfile::from_record(&guard.record, state.config()),
    })
}
