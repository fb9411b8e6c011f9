use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    dao::models::UserEntity,
    dto::leaderboard::{LeaderboardEntry, LeaderboardResponse},
    error::ServiceError,
    state::{LeaderboardCache, LeaderboardRow, SharedState},
};

/// Inventory item ids surfaced as leaderboard badges.
const BADGE_ITEMS: [&str; 2] = ["golden_frame", "mushroom_badge"];

/// Ranked snapshot of all users, served from cache while fresh.
///
/// A snapshot older than the configured TTL triggers a re-fetch. When the
/// store cannot be reached a stale snapshot is served rather than failing;
/// the error only surfaces when there is nothing cached at all.
pub async fn get_snapshot(
    state: &SharedState,
    force_refresh: bool,
) -> Result<LeaderboardResponse, ServiceError> {
    if !force_refresh {
        let guard = state.leaderboard_cache().read().await;
        if let Some(cache) = guard.as_ref() {
            if cache.fetched_at.elapsed() < state.config().leaderboard_ttl() {
                debug!("serving leaderboard from cache");
                return Ok(render(&cache.rows));
            }
        }
    }

    match fetch_rows(state).await {
        Ok(rows) => {
            let response = render(&rows);
            let mut guard = state.leaderboard_cache().write().await;
            *guard = Some(LeaderboardCache {
                rows,
                fetched_at: Instant::now(),
            });
            Ok(response)
        }
        Err(err) => {
            let guard = state.leaderboard_cache().read().await;
            match guard.as_ref() {
                Some(cache) => {
                    warn!(error = %err, "leaderboard refresh failed; serving stale snapshot");
                    Ok(render(&cache.rows))
                }
                None => Err(err),
            }
        }
    }
}

/// Drop the cached snapshot so the next read re-fetches.
pub async fn invalidate(state: &SharedState) {
    let mut guard = state.leaderboard_cache().write().await;
    guard.take();
}

async fn fetch_rows(state: &SharedState) -> Result<Vec<LeaderboardRow>, ServiceError> {
    let store = state.require_user_store().await?;
    let users = store.list_users().await?;

    let mut rows: Vec<LeaderboardRow> = users.iter().map(row_of).collect();
    // Stable sort: ties keep their store order.
    rows.sort_by(|a, b| b.xp.cmp(&a.xp));
    Ok(rows)
}

fn row_of(user: &UserEntity) -> LeaderboardRow {
    LeaderboardRow {
        username: user.username.clone(),
        xp: user.xp,
        badges: user
            .inventory
            .iter()
            .filter(|item| BADGE_ITEMS.contains(&item.as_str()))
            .cloned()
            .collect(),
    }
}

fn render(rows: &[LeaderboardRow]) -> LeaderboardResponse {
    LeaderboardResponse {
        entries: rows
            .iter()
            .enumerate()
            .map(|(index, row)| LeaderboardEntry::from_row(index as u32 + 1, row))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::user_store::{UserStore, memory::MemoryUserStore},
        state::AppState,
    };

    use super::*;

    async fn seeded_state() -> (SharedState, MemoryUserStore) {
        let state = AppState::new(AppConfig::default(), None);
        let store = MemoryUserStore::new();
        for (name, xp, inventory) in [
            ("Ada", 300_u64, vec!["golden_frame".to_string()]),
            ("Grace", 900, vec![]),
            ("Edsger", 300, vec!["mushroom_badge".to_string(), "quill".to_string()]),
        ] {
            let mut user = UserEntity::new(name);
            user.xp = xp;
            user.inventory = inventory;
            store.append_user(user).await.unwrap();
        }
        state.install_user_store(Arc::new(store.clone())).await;
        (state, store)
    }

    #[tokio::test]
    async fn rows_sort_by_xp_with_stable_ties_and_medals() {
        let (state, _store) = seeded_state().await;

        let response = get_snapshot(&state, false).await.unwrap();
        let names: Vec<&str> = response.entries.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["Grace", "Ada", "Edsger"]);
        assert_eq!(response.entries[0].medal.as_deref(), Some("gold"));
        assert_eq!(response.entries[1].medal.as_deref(), Some("silver"));
        assert_eq!(response.entries[2].medal.as_deref(), Some("bronze"));
        assert_eq!(response.entries[2].rank, 3);
    }

    #[tokio::test]
    async fn only_badge_items_surface() {
        let (state, _store) = seeded_state().await;

        let response = get_snapshot(&state, false).await.unwrap();
        assert_eq!(response.entries[1].badges, vec!["golden_frame".to_string()]);
        assert_eq!(response.entries[2].badges, vec!["mushroom_badge".to_string()]);
    }

    #[tokio::test]
    async fn snapshot_is_cached_within_the_ttl() {
        let (state, store) = seeded_state().await;

        let first = get_snapshot(&state, false).await.unwrap();
        // A write landing after the fetch is invisible until the TTL lapses.
        let mut user = UserEntity::new("Alan");
        user.xp = 5000;
        store.append_user(user).await.unwrap();

        let second = get_snapshot(&state, false).await.unwrap();
        assert_eq!(first.entries, second.entries);

        let forced = get_snapshot(&state, true).await.unwrap();
        assert_eq!(forced.entries[0].username, "Alan");
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let (state, store) = seeded_state().await;
        get_snapshot(&state, false).await.unwrap();

        let mut user = UserEntity::new("Alan");
        user.xp = 5000;
        store.append_user(user).await.unwrap();
        invalidate(&state).await;

        let response = get_snapshot(&state, false).await.unwrap();
        assert_eq!(response.entries[0].username, "Alan");
    }

    #[tokio::test]
    async fn stale_snapshot_serves_when_the_store_drops() {
        let (state, _store) = seeded_state().await;
        get_snapshot(&state, false).await.unwrap();

        state.clear_user_store().await;
        let response = get_snapshot(&state, true).await.unwrap();
        assert_eq!(response.entries.len(), 3);
    }

    #[tokio::test]
    async fn degraded_with_no_cache_is_an_error() {
        let state = AppState::new(AppConfig::default(), None);
        let err = get_snapshot(&state, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
