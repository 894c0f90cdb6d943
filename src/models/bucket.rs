use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketInfo {
    pub id: String,
    pub name: String,
    pub plan_id: Option<String>,
    pub order_hint: Option<String>,
}

/// Short form used when reporting which buckets exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketListing {
    pub plan_name: String,
    pub plan_id: String,
    pub buckets: Vec<BucketInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketMatch {
    pub plan_name: String,
    pub plan_id: String,
    pub bucket_id: String,
    pub bucket_name: String,
}

impl From<&BucketInfo> for BucketRef {
    fn from(bucket: &BucketInfo) -> Self {
        Self {
            id: bucket.id.clone(),
            name: bucket.name.clone(),
        }
    }
}
