//! Install and activate phases.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use umc_core::{Error, Request};

use super::OfflineCache;

/// Lifecycle of one deployed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created, seed resources not stored yet (or the last install failed).
    Parsed,
    /// Seed resources stored; older generations may still exist.
    Installed,
    /// Older generations pruned; requests are intercepted.
    Activated,
}

impl OfflineCache {
    /// Open the current generation and store every seed resource.
    ///
    /// All-or-nothing: a network error or non-2xx seed response fails the
    /// install and nothing is written. The host decides whether to retry.
    pub async fn on_install(&self) -> Result<(), Error> {
        let _phase = self.phase.lock().await;
        let name = self.cache_name();

        self.ctx.store.open_generation(name).await?;

        let fetches = self.config.seed_manifest.iter().map(|url| async move {
            let request = Request::get(url.clone());
            let response = self
                .ctx
                .transport
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;
            if !response.is_success() {
                return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
            }
            Ok::<_, Error>((request.key(), response))
        });
        let entries = try_join_all(fetches).await.inspect_err(|e| {
            tracing::error!(cache_name = name, error = %e, "install failed");
        })?;

        self.ctx
            .store
            .put_entries(name, &entries)
            .await
            .map_err(|e| Error::InstallFailed(format!("storing seed resources: {e}")))?;

        let mut state = self.state.write().await;
        if *state < Lifecycle::Installed {
            *state = Lifecycle::Installed;
        }

        tracing::info!(cache_name = name, resources = entries.len(), "installed");
        Ok(())
    }

    /// Delete every generation except the current one and start intercepting.
    ///
    /// Returns the deleted generation names. Fails with `INVALID_STATE` if no
    /// install has completed yet.
    pub async fn on_activate(&self) -> Result<Vec<String>, Error> {
        let _phase = self.phase.lock().await;
        let name = self.cache_name();

        if self.state().await < Lifecycle::Installed {
            return Err(Error::InvalidState(format!("cannot activate {name} before install completes")));
        }

        let stale = self
            .ctx
            .store
            .generation_names()
            .await?
            .into_iter()
            .filter(|existing| existing != name)
            .collect::<Vec<_>>();

        let results = try_join_all(stale.iter().map(|old| self.ctx.store.delete_generation(old))).await?;
        let deleted = stale
            .into_iter()
            .zip(results)
            .filter_map(|(old, removed)| removed.then_some(old))
            .collect::<Vec<_>>();

        *self.state.write().await = Lifecycle::Activated;

        tracing::info!(cache_name = name, deleted = ?deleted, "activated");
        Ok(deleted)
    }
}
