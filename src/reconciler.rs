use crate::client::AlertsApi;
use crate::types::{Result, Subscription, SubscriptionRequest};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Difference between the desired keyword set and the current subscriptions.
///
/// `to_add` holds keywords with no subscription of the same name, in desired
/// order; `to_remove` holds subscriptions whose name is not desired, in
/// listing order. The two are disjoint by construction.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub to_add: Vec<String>,
    pub to_remove: Vec<Subscription>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the reconciliation plan. Pure set difference over exact names,
/// O(n + m) via hash membership.
pub fn plan(desired: &[String], current: &[Subscription]) -> ReconcilePlan {
    let current_by_name: HashMap<&str, &Subscription> =
        current.iter().map(|s| (s.name.as_str(), s)).collect();
    let desired_names: HashSet<&str> = desired.iter().map(String::as_str).collect();

    let to_add = desired
        .iter()
        .filter(|keyword| !current_by_name.contains_key(keyword.as_str()))
        .cloned()
        .collect();

    let to_remove = current
        .iter()
        .filter(|sub| !desired_names.contains(sub.name.as_str()))
        .cloned()
        .collect();

    ReconcilePlan { to_add, to_remove }
}

/// Applies reconciliation plans against an alerting client.
pub struct Reconciler {
    allow_removal: bool,
}

impl Reconciler {
    pub fn new(allow_removal: bool) -> Self {
        Self { allow_removal }
    }

    /// Plan against the client's current listing and apply the result.
    pub async fn reconcile<C: AlertsApi>(
        &self,
        client: &C,
        desired: &[String],
    ) -> Result<ReconcilePlan> {
        let plan = plan(desired, client.list());
        self.apply(client, &plan).await?;
        Ok(plan)
    }

    /// Issue all additions concurrently and wait for every one; the first
    /// failure rejects the whole application. Removals only run when the
    /// removal policy is enabled, which it is not by default.
    pub async fn apply<C: AlertsApi>(&self, client: &C, plan: &ReconcilePlan) -> Result<()> {
        let additions = plan.to_add.iter().map(|keyword| async move {
            info!("Adding {}", keyword);
            client
                .create(SubscriptionRequest::for_keyword(keyword))
                .await
                .map(|_| ())
        });
        join_all(additions)
            .await
            .into_iter()
            .collect::<Result<Vec<()>>>()?;

        if !plan.to_remove.is_empty() {
            if self.allow_removal {
                let removals = plan.to_remove.iter().map(|sub| async move {
                    info!("Removing {} ({})", sub.name, sub.id);
                    client.remove(&sub.id).await
                });
                join_all(removals)
                    .await
                    .into_iter()
                    .collect::<Result<Vec<()>>>()?;
            } else {
                info!(
                    "{} subscriptions are not in the keyword list; removal is disabled, leaving them",
                    plan.to_remove.len()
                );
            }
        }

        Ok(())
    }
}
