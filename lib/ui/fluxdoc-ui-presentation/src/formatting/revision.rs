const HASH_DISPLAY_LEN: usize = 12;
const MAX_PLAIN_LEN: usize = 40;

/// Shortens a source revision for display.
///
/// `main@sha1:<hash>` keeps everything up to the first `:` plus twelve hash
/// characters. Revisions without a `:` are cut at forty characters.
pub fn truncate_revision(revision: &str) -> String {
    if revision.is_empty() {
        return "<none>".to_string();
    }
    if let Some(idx) = revision.find(':') {
        let (prefix, hash) = revision.split_at(idx + 1);
        let hash: String = hash.chars().take(HASH_DISPLAY_LEN).collect();
        return format!("{prefix}{hash}");
    }
    if revision.chars().count() > MAX_PLAIN_LEN {
        let head: String = revision.chars().take(MAX_PLAIN_LEN).collect();
        return format!("{head}...");
    }
    revision.to_string()
}

pub fn value_or_none(value: &str) -> &str {
    if value.is_empty() { "<none>" } else { value }
}
