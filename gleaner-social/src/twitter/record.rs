//! Flat record shape persisted to `tweets.json`.

use crate::twitter::types::SearchResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One collected post. `username` stays `None` when the author id
/// cannot be resolved from the page's user expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub username: Option<String>,
    pub date: String,
    pub content: String,
}

/// Join tweets with their authors and flatten each into a [`PostRecord`].
///
/// The author side-table is rebuilt per page from `includes.users`;
/// hard newlines in the text are replaced with spaces so every record
/// is a single line.
pub fn records_from_page(page: &SearchResponse) -> Vec<PostRecord> {
    let users: HashMap<&str, &str> = page
        .includes
        .as_ref()
        .and_then(|inc| inc.users.as_ref())
        .map(|users| {
            users
                .iter()
                .map(|u| (u.id.as_str(), u.username.as_str()))
                .collect()
        })
        .unwrap_or_default();

    page.data
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|tweet| PostRecord {
            username: tweet
                .author_id
                .as_deref()
                .and_then(|id| users.get(id))
                .map(|name| (*name).to_string()),
            date: tweet.created_at.clone().unwrap_or_default(),
            content: tweet.text.replace('\n', " "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::types::{Includes, Meta, Tweet, User};

    fn page(tweets: Vec<Tweet>, users: Vec<User>) -> SearchResponse {
        SearchResponse {
            data: Some(tweets),
            includes: Some(Includes { users: Some(users) }),
            meta: Some(Meta::default()),
        }
    }

    fn tweet(id: &str, text: &str, author_id: Option<&str>) -> Tweet {
        Tweet {
            id: id.into(),
            text: text.into(),
            author_id: author_id.map(Into::into),
            created_at: Some("2026-08-20T12:00:00Z".into()),
        }
    }

    #[test]
    fn joins_author_via_side_table() {
        let records = records_from_page(&page(
            vec![tweet("1", "hi", Some("42"))],
            vec![User {
                id: "42".into(),
                username: "alice".into(),
            }],
        ));
        assert_eq!(records[0].username.as_deref(), Some("alice"));
    }

    #[test]
    fn unresolved_author_is_none() {
        let records = records_from_page(&page(
            vec![tweet("1", "hi", Some("99")), tweet("2", "yo", None)],
            vec![User {
                id: "42".into(),
                username: "alice".into(),
            }],
        ));
        assert_eq!(records[0].username, None);
        assert_eq!(records[1].username, None);
    }

    #[test]
    fn newlines_collapse_to_spaces() {
        let records = records_from_page(&page(
            vec![tweet("1", "line one\nline two\nline three", None)],
            vec![],
        ));
        assert_eq!(records[0].content, "line one line two line three");
    }

    #[test]
    fn empty_page_yields_no_records() {
        let empty = SearchResponse {
            data: None,
            includes: None,
            meta: None,
        };
        assert!(records_from_page(&empty).is_empty());
    }
}
