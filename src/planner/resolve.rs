//! Name to id lookups for users, plans and buckets.
//!
//! User and plan misses are `None`, not errors: task writes skip an
//! unresolvable assignee instead of failing.

use tracing::{debug, error, warn};
use urlencoding::encode as url_encode;

use super::PlannerHttpClient;
use crate::error::AppError;
use crate::graph::dto::{Group, ODataList, PlannerBucket, PlannerPlan, User};
use crate::models::{BucketInfo, BucketListing, BucketMatch, BucketRef, Plan};

/// Quotes inside OData string literals are doubled.
pub fn escape_odata_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Filter expressions tried in order after a direct lookup misses.
pub fn user_filters(identifier: &str) -> Vec<String> {
    let escaped = escape_odata_string(identifier);
    vec![
        format!("userPrincipalName eq '{}'", escaped),
        format!("mail eq '{}'", escaped),
        format!("mailNickname eq '{}'", escaped),
        format!("displayName eq '{}'", escaped),
        format!("startswith(mailNickname,'{}')", escaped),
    ]
}

impl PlannerHttpClient {
    pub(crate) async fn find_user_id(&self, identifier: &str) -> Option<String> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            warn!("Empty user identifier provided for lookup");
            return None;
        }

        // Graph accepts an object id or UPN directly on /users/{id}.
        match self
            .graph
            .get_json::<User>(&format!("users/{}", url_encode(identifier)))
            .await
        {
            Ok(user) => return Some(user.id),
            Err(err) if err.graph_status() == Some(404) => {
                debug!("Direct lookup for '{}' returned 404", identifier);
            }
            Err(err) => debug!("Direct lookup for '{}' failed: {}", identifier, err),
        }

        for filter in user_filters(identifier) {
            let path = format!("users?$filter={}", url_encode(&filter));
            match self.graph.get_json::<ODataList<User>>(&path).await {
                Ok(list) => {
                    if let Some(user) = list.value.into_iter().next() {
                        return Some(user.id);
                    }
                }
                Err(err) => debug!("Filter lookup '{}' failed: {}", filter, err),
            }
        }

        warn!("User '{}' not found", identifier);
        None
    }

    /// Display name for a user id, or the id itself when the lookup fails.
    pub(crate) async fn user_display_name(&self, user_id: &str) -> String {
        match self
            .graph
            .get_json::<User>(&format!("users/{}", url_encode(user_id)))
            .await
        {
            Ok(user) => user.display_name.unwrap_or_else(|| user_id.to_string()),
            Err(err) => {
                warn!("Could not resolve user ID {}: {}", user_id, err);
                user_id.to_string()
            }
        }
    }

    pub(crate) async fn fetch_all_plans(&self) -> Result<Vec<Plan>, AppError> {
        let groups = match self.graph.get_json::<ODataList<Group>>("groups").await {
            Ok(list) => list.value,
            Err(err) => {
                if matches!(err.graph_status(), Some(401) | Some(403)) {
                    error!(
                        "Error listing groups: {}. The app is probably missing permissions. \
                         Required: Group.Read.All and Tasks.Read (or Tasks.ReadWrite); \
                         make sure admin consent was granted.",
                        err
                    );
                } else {
                    error!("Error listing groups: {}", err);
                }
                return Err(err);
            }
        };
        debug!("Found {} groups", groups.len());

        let mut plans = Vec::new();
        for group in groups {
            let group_label = group.display_name.as_deref().unwrap_or(&group.id);
            let path = format!("groups/{}/planner/plans", group.id);
            match self.graph.get_json::<ODataList<PlannerPlan>>(&path).await {
                Ok(list) => {
                    for plan in list.value {
                        debug!(
                            "Found plan: '{}' in group '{}' (Plan ID: {})",
                            plan.title, group_label, plan.id
                        );
                        plans.push(Plan {
                            id: plan.id,
                            title: plan.title,
                            group_id: group.id.clone(),
                            group_name: group.display_name.clone(),
                        });
                    }
                }
                Err(err) if err.graph_status() == Some(403) => {
                    debug!("No access to plans in group: {}", group_label);
                }
                Err(err) => debug!("Error getting plans for group {}: {}", group_label, err),
            }
        }

        Ok(plans)
    }

    /// First plan whose title matches exactly. Duplicate titles resolve to
    /// whichever the groups listing yields first.
    pub(crate) async fn find_plan(&self, title: &str) -> Result<Option<Plan>, AppError> {
        debug!("Searching for plan: '{}'", title);
        let plans = self.fetch_all_plans().await?;
        debug!("Total plans found: {}", plans.len());

        let total = plans.len();
        let titles: Vec<String> = plans.iter().map(|p| p.title.clone()).collect();
        match plans.into_iter().find(|p| p.title == title) {
            Some(plan) => {
                debug!("Found matching plan: {} with ID: {}", title, plan.id);
                Ok(Some(plan))
            }
            None => {
                warn!("Plan '{}' not found among {} plans", title, total);
                debug!("Available plans: {:?}", titles);
                Ok(None)
            }
        }
    }

    pub(crate) async fn fetch_buckets(&self, plan_name: &str) -> Result<BucketListing, AppError> {
        let plan = self.find_plan(plan_name).await?.ok_or_else(|| {
            error!("Cannot list buckets: Plan '{}' not found", plan_name);
            AppError::PlanNotFound(plan_name.to_string())
        })?;

        let path = format!("planner/plans/{}/buckets", plan.id);
        let buckets = self
            .graph
            .get_json::<ODataList<PlannerBucket>>(&path)
            .await
            .inspect_err(|err| error!("Error fetching buckets for plan {}: {}", plan_name, err))?
            .value
            .into_iter()
            .map(|b| BucketInfo {
                id: b.id,
                name: b.name,
                plan_id: b.plan_id,
                order_hint: b.order_hint,
            })
            .collect();

        Ok(BucketListing {
            plan_name: plan_name.to_string(),
            plan_id: plan.id,
            buckets,
        })
    }

    pub(crate) async fn find_bucket(&self, plan_name: &str, bucket_value: &str) -> Result<BucketMatch, AppError> {
        let cleaned = bucket_value.trim();
        if cleaned.is_empty() {
            return Err(AppError::BadRequest("Bucket value is empty".to_string()));
        }

        let listing = self.fetch_buckets(plan_name).await?;
        match match_bucket(&listing, cleaned) {
            Some(found) => Ok(found),
            None => Err(AppError::BucketNotFound {
                value: cleaned.to_string(),
                available: listing.buckets.iter().map(BucketRef::from).collect(),
            }),
        }
    }
}

/// Case-insensitive match on id first, then name, bucket by bucket.
pub fn match_bucket(listing: &BucketListing, value: &str) -> Option<BucketMatch> {
    let target = value.trim().to_lowercase();
    listing.buckets.iter().find_map(|bucket| {
        let id = bucket.id.trim();
        let name = bucket.name.trim();
        let hit = (!id.is_empty() && id.to_lowercase() == target)
            || (!name.is_empty() && name.to_lowercase() == target);
        hit.then(|| BucketMatch {
            plan_name: listing.plan_name.clone(),
            plan_id: listing.plan_id.clone(),
            bucket_id: id.to_string(),
            bucket_name: name.to_string(),
        })
    })
}
