#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{NaiveDate, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn metadata(title: &str, date: &str) -> PostMetadata {
        PostMetadata {
            title: title.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            updated_date: None,
            excerpt: "A short summary".to_string(),
            tags: vec!["welcome".to_string(), "blog".to_string()],
            published: true,
        }
    }

    fn test_repository(dir: &TempDir, policy: SlugPolicy) -> BlogRepository {
        BlogRepository::new(BlogConfig {
            content_directory: dir.path().to_path_buf(),
            slug_policy: policy,
            ..BlogConfig::default()
        })
    }

    #[test]
    fn frontmatter_round_trip() {
        let m = metadata("Hello World", "2025-06-07");
        let body = "# Hello\n\nFirst paragraph.\n\nSecond paragraph.";

        let encoded = frontmatter::encode(&m, body);
        let (decoded, decoded_body) = frontmatter::decode(&encoded).unwrap();

        assert_eq!(decoded, m);
        assert_eq!(decoded_body, body);
    }

    #[test]
    fn frontmatter_round_trip_with_updated_date() {
        let mut m = metadata("Hello World", "2025-06-07");
        m.updated_date = NaiveDate::from_ymd_opt(2025, 6, 9);
        m.published = false;
        m.tags = Vec::new();

        let encoded = frontmatter::encode(&m, "body");
        let (decoded, body) = frontmatter::decode(&encoded).unwrap();

        assert_eq!(decoded, m);
        assert_eq!(body, "body");
    }

    #[test]
    fn encode_omits_updated_date_when_absent() {
        let m = metadata("Hello", "2025-06-07");
        let encoded = frontmatter::encode(&m, "body");

        assert!(!encoded.contains("updatedDate"));
        assert!(encoded.starts_with("---\ntitle: \"Hello\"\ndate: \"2025-06-07\"\n"));
    }

    #[test]
    fn encode_field_order_is_fixed() {
        let mut m = metadata("Hello", "2025-06-07");
        m.updated_date = NaiveDate::from_ymd_opt(2025, 6, 8);

        let encoded = frontmatter::encode(&m, "body");
        let expected = "---\n\
                        title: \"Hello\"\n\
                        date: \"2025-06-07\"\n\
                        updatedDate: \"2025-06-08\"\n\
                        excerpt: \"A short summary\"\n\
                        tags: [\"welcome\", \"blog\"]\n\
                        published: true\n\
                        ---\n\nbody";
        assert_eq!(encoded, expected);
    }

    #[test]
    fn decode_requires_leading_delimiter() {
        let result = frontmatter::decode("title: \"Hello\"\n---\n\nbody");
        assert!(matches!(result, Err(BlogError::InvalidFormat(_))));

        // Leading whitespace before the delimiter is also rejected.
        let result = frontmatter::decode("\n---\ntitle: \"Hello\"\n---\n\nbody");
        assert!(matches!(result, Err(BlogError::InvalidFormat(_))));
    }

    #[test]
    fn decode_requires_closing_delimiter() {
        let result = frontmatter::decode("---\ntitle: \"Hello\"\ndate: \"2025-01-01\"\n");
        assert!(matches!(result, Err(BlogError::InvalidFormat(_))));
    }

    #[test]
    fn decode_reports_missing_required_fields() {
        let text = "---\ntitle: \"Hello\"\nexcerpt: \"e\"\n---\n\nbody";
        match frontmatter::decode(text) {
            Err(BlogError::MissingMetadata(field)) => assert_eq!(field, "date"),
            other => panic!("expected missing date, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn decode_applies_defaults_and_ignores_unknown_keys() {
        let text = "---\n\
                    title: \"Hello\"\n\
                    date: \"2025-06-07\"\n\
                    excerpt: \"e\"\n\
                    author: \"someone\"\n\
                    ---\n\nbody";
        let (m, _) = frontmatter::decode(text).unwrap();
        assert!(m.tags.is_empty());
        assert!(m.published);
        assert!(m.updated_date.is_none());
    }

    #[test]
    fn decode_coerces_published_literal() {
        let text = "---\n\
                    title: \"Hello\"\n\
                    date: \"2025-06-07\"\n\
                    excerpt: \"e\"\n\
                    published: false\n\
                    ---\n\nbody";
        let (m, _) = frontmatter::decode(text).unwrap();
        assert!(!m.published);
    }

    #[test]
    fn decode_parses_tags_with_uneven_spacing() {
        let text = "---\n\
                    title: \"Hello\"\n\
                    date: \"2025-06-07\"\n\
                    excerpt: \"e\"\n\
                    tags: [\"one\" ,\"two\",  \"three\"]\n\
                    ---\n\nbody";
        let (m, _) = frontmatter::decode(text).unwrap();
        assert_eq!(m.tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn decode_accepts_timestamp_dates() {
        let text = "---\n\
                    title: \"Hello\"\n\
                    date: \"2025-06-07T10:30:00Z\"\n\
                    excerpt: \"e\"\n\
                    ---\n\nbody";
        let (m, _) = frontmatter::decode(text).unwrap();
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2025, 6, 7).unwrap());
    }

    #[test]
    fn slug_from_title_strips_punctuation() {
        assert_eq!(
            BlogRepository::slug_from_title("Hello, World!"),
            "hello-world"
        );
        assert_eq!(
            BlogRepository::slug_from_title("  Spaces   everywhere  "),
            "spaces-everywhere"
        );
        assert_eq!(
            BlogRepository::slug_from_title("Rust's Ownership Model"),
            "rusts-ownership-model"
        );
        assert_eq!(BlogRepository::slug_from_title("!!!"), "");
    }

    #[tokio::test]
    async fn create_then_read_back_has_no_updated_date() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let m = metadata("First Post", "2025-06-07");
        repository.create("first-post", &m, "The body.", None).await.unwrap();

        let post = repository
            .get_by_slug("first-post", None)
            .await
            .unwrap()
            .expect("post should exist");

        assert_eq!(post.title, "First Post");
        assert_eq!(post.date, m.date);
        assert!(post.updated_date.is_none());
        assert!(!post.was_updated());
        assert!(post.html_content.contains("The body."));

        let raw = fs::read_to_string(dir.path().join("first-post.md")).unwrap();
        assert!(!raw.contains("updatedDate"));
    }

    #[tokio::test]
    async fn update_preserves_date_and_stamps_updated_date() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let m = metadata("First Post", "2025-06-07");
        repository.create("first-post", &m, "Original body.", None).await.unwrap();

        // The caller passes a bogus creation date; the stored one must win.
        let mut edited = metadata("First Post (edited)", "1999-01-01");
        edited.updated_date = NaiveDate::from_ymd_opt(2000, 1, 1);
        repository
            .update("first-post", &edited, "Edited body.", None)
            .await
            .unwrap();

        let post = repository
            .get_by_slug("first-post", None)
            .await
            .unwrap()
            .expect("post should exist");

        assert_eq!(post.title, "First Post (edited)");
        assert_eq!(post.date, m.date);
        assert_eq!(post.updated_date, Some(Utc::now().date_naive()));
        assert!(post.was_updated());
        assert_eq!(post.content, "Edited body.");
    }

    #[tokio::test]
    async fn same_day_update_suppresses_indicator() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let today = Utc::now().date_naive();
        let m = PostMetadata {
            date: today,
            ..metadata("Fresh Post", "2025-01-01")
        };
        repository.create("fresh-post", &m, "body", None).await.unwrap();
        repository.update("fresh-post", &m, "body v2", None).await.unwrap();

        let post = repository
            .get_by_slug("fresh-post", None)
            .await
            .unwrap()
            .expect("post should exist");

        // updated_date is set, but equals the creation date.
        assert_eq!(post.updated_date, Some(today));
        assert!(!post.was_updated());
    }

    #[tokio::test]
    async fn update_missing_post_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let result = repository
            .update("nope", &metadata("Nope", "2025-06-07"), "body", None)
            .await;
        assert!(matches!(result, Err(BlogError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn list_excludes_drafts_and_sorts_newest_first() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        repository
            .create("older", &metadata("Older", "2024-01-01"), "body", None)
            .await
            .unwrap();
        repository
            .create("newer", &metadata("Newer", "2025-01-01"), "body", None)
            .await
            .unwrap();

        let mut draft = metadata("Draft", "2025-02-01");
        draft.published = false;
        repository.create("draft", &draft, "body", None).await.unwrap();

        let posts = repository.list(None).await;
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);

        // Drafts stay reachable by slug for editing.
        let draft_post = repository.get_by_slug("draft", None).await.unwrap();
        assert!(draft_post.is_some());
        assert!(!draft_post.unwrap().published);
    }

    #[tokio::test]
    async fn list_missing_partition_is_empty() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        assert!(repository.list(Some("pt")).await.is_empty());
    }

    #[tokio::test]
    async fn list_skips_unparseable_files() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        repository
            .create("good", &metadata("Good", "2025-01-01"), "body", None)
            .await
            .unwrap();
        fs::write(dir.path().join("broken.md"), "no front matter here").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a post").unwrap();

        let posts = repository.list(None).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
    }

    #[tokio::test]
    async fn get_by_slug_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let post = repository.get_by_slug("missing", None).await.unwrap();
        assert!(post.is_none());
    }

    #[tokio::test]
    async fn language_partitions_are_independent() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        repository
            .create("hello", &metadata("Hello", "2025-01-01"), "english", None)
            .await
            .unwrap();
        repository
            .create("hello", &metadata("Olá", "2025-01-02"), "português", Some("pt"))
            .await
            .unwrap();

        let default_posts = repository.list(None).await;
        assert_eq!(default_posts.len(), 1);
        assert_eq!(default_posts[0].title, "Hello");

        let pt_posts = repository.list(Some("pt")).await;
        assert_eq!(pt_posts.len(), 1);
        assert_eq!(pt_posts[0].title, "Olá");
        assert!(dir.path().join("pt/hello.md").exists());
    }

    #[tokio::test]
    async fn overwrite_policy_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        repository
            .create("post", &metadata("First", "2025-01-01"), "one", None)
            .await
            .unwrap();
        let slug = repository
            .create("post", &metadata("Second", "2025-01-02"), "two", None)
            .await
            .unwrap();
        assert_eq!(slug, "post");

        let post = repository.get_by_slug("post", None).await.unwrap().unwrap();
        assert_eq!(post.title, "Second");
    }

    #[tokio::test]
    async fn reject_policy_refuses_existing_slug() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Reject);

        repository
            .create("post", &metadata("First", "2025-01-01"), "one", None)
            .await
            .unwrap();
        let result = repository
            .create("post", &metadata("Second", "2025-01-02"), "two", None)
            .await;
        assert!(matches!(result, Err(BlogError::SlugTaken(_))));
    }

    #[tokio::test]
    async fn suffix_policy_allocates_free_slug() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Suffix);

        let first = repository
            .create("post", &metadata("First", "2025-01-01"), "one", None)
            .await
            .unwrap();
        let second = repository
            .create("post", &metadata("Second", "2025-01-02"), "two", None)
            .await
            .unwrap();
        let third = repository
            .create("post", &metadata("Third", "2025-01-03"), "three", None)
            .await
            .unwrap();

        assert_eq!(first, "post");
        assert_eq!(second, "post-2");
        assert_eq!(third, "post-3");
    }

    #[tokio::test]
    async fn multibyte_content_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let repository = test_repository(&dir, SlugPolicy::Overwrite);

        let mut m = metadata("Um Título Acentuado", "2025-06-07");
        m.excerpt = "Resumo com acentuação".to_string();
        let body = "Corpo do texto com 日本語 e emoji 🎉.";

        repository.create("acentuado", &m, body, None).await.unwrap();
        let post = repository
            .get_by_slug("acentuado", None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(post.title, "Um Título Acentuado");
        assert_eq!(post.content, body);
    }
}
