//! Split fetched tweets around the cutoff

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Post;

/// Tweets to delete and tweets to keep, each in fetch order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Partition {
    pub delete: Vec<Post>,
    pub keep: Vec<Post>,
}

/// A tweet is deleted iff it was created strictly before `cutoff`.
///
/// Every timestamp is parsed before anything is returned, so one malformed
/// `created_at` fails the whole partition rather than silently keeping or
/// dropping that tweet.
pub fn partition_by_cutoff(posts: Vec<Post>, cutoff: DateTime<Utc>) -> Result<Partition> {
    let mut partition = Partition::default();

    for post in posts {
        if post.created_instant()? < cutoff {
            partition.delete.push(post);
        } else {
            partition.keep.push(post);
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PurgeError;
    use chrono::TimeZone;

    fn post(id: &str, created_at: &str) -> Post {
        Post {
            id: id.to_string(),
            created_at: created_at.to_string(),
            text: None,
        }
    }

    fn cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_partitions_around_cutoff() {
        let posts = vec![
            post("1", "2015-01-01T00:00:00.000Z"),
            post("2", "2015-02-01T00:00:00.000Z"),
            post("3", "2015-08-01T00:00:00.000Z"),
            post("4", "2016-01-01T00:00:00.000Z"),
        ];

        let partition = partition_by_cutoff(posts, cutoff()).unwrap();
        let delete: Vec<_> = partition.delete.iter().map(|p| p.id.as_str()).collect();
        let keep: Vec<_> = partition.keep.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(delete, vec!["1", "2"]);
        assert_eq!(keep, vec!["3", "4"]);
    }

    #[test]
    fn test_post_at_cutoff_is_kept() {
        let partition =
            partition_by_cutoff(vec![post("1", "2015-07-01T00:00:00.000Z")], cutoff()).unwrap();
        assert!(partition.delete.is_empty());
        assert_eq!(partition.keep.len(), 1);
    }

    #[test]
    fn test_one_millisecond_before_cutoff_is_deleted() {
        let partition =
            partition_by_cutoff(vec![post("1", "2015-06-30T23:59:59.999Z")], cutoff()).unwrap();
        assert_eq!(partition.delete.len(), 1);
        assert!(partition.keep.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let partition = partition_by_cutoff(Vec::new(), cutoff()).unwrap();
        assert_eq!(partition, Partition::default());
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let posts = vec![
            post("1", "2015-01-01T00:00:00.000Z"),
            post("2", "01/02/2015"),
            post("3", "2015-01-03T00:00:00.000Z"),
        ];

        match partition_by_cutoff(posts, cutoff()) {
            Err(PurgeError::TimestampParse { post_id, value }) => {
                assert_eq!(post_id, "2");
                assert_eq!(value, "01/02/2015");
            }
            other => panic!("Expected TimestampParse, got {:?}", other),
        }
    }

    #[test]
    fn test_sizes_add_up() {
        let posts: Vec<Post> = (1..=28)
            .map(|day| post(&day.to_string(), &format!("2015-06-{:02}T12:00:00.000Z", day)))
            .collect();
        let cutoff = Utc.with_ymd_and_hms(2015, 6, 15, 12, 0, 0).unwrap();

        let partition = partition_by_cutoff(posts, cutoff).unwrap();
        assert_eq!(partition.delete.len(), 14);
        assert_eq!(partition.keep.len(), 14);
    }
}
