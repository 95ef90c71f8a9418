use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// How often idle sessions are looked for
const REAP_INTERVAL: Duration = Duration::from_secs(60);
/// Short TTLs check more often, but never in a tight loop
const MIN_REAP_INTERVAL: Duration = Duration::from_secs(1);

fn reap_interval(ttl: Duration) -> Duration {
    REAP_INTERVAL.min(ttl).max(MIN_REAP_INTERVAL)
}

/// Spawn a background task that drops quiz sessions idle for longer than `ttl`
pub fn spawn_session_reaper(state: Arc<AppState>, ttl: Duration) -> tokio::task::JoinHandle<()> {
    let interval = reap_interval(ttl);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let removed = state.reap_idle_sessions(ttl).await;
            if removed > 0 {
                tracing::info!(
                    "Reaped {} idle sessions ({} active)",
                    removed,
                    state.session_count().await
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::AnswerMatcher;
    use crate::reference::ReferenceTables;
    use crate::roster;
    use crate::state::store::StatsStore;
    use crate::types::Difficulty;

    #[test]
    fn test_reap_interval_bounds() {
        assert_eq!(reap_interval(Duration::ZERO), MIN_REAP_INTERVAL);
        assert_eq!(reap_interval(Duration::from_millis(10)), MIN_REAP_INTERVAL);
        assert_eq!(reap_interval(Duration::from_secs(30)), Duration::from_secs(30));
        assert_eq!(reap_interval(Duration::from_secs(3600)), REAP_INTERVAL);
    }

    #[tokio::test]
    async fn test_reaper_removes_sessions_after_ttl() {
        let matcher = AnswerMatcher::new(Arc::new(ReferenceTables::default()));
        let state = Arc::new(AppState::new(
            roster::sample(),
            matcher,
            StatsStore::in_memory().await.unwrap(),
        ));
        let id = state.new_game(Difficulty::Hard).await.unwrap().session_id;

        state.sessions.write().await.get_mut(&id).unwrap().last_active =
            chrono::Utc::now() - chrono::Duration::seconds(120);

        let handle = spawn_session_reaper(state.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(state.session_count().await, 0);
        handle.abort();
    }
}
