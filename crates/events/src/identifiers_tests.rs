use super::*;

#[test]
fn test_string_id_rejects_empty_value() {
    assert!(BranchName::new("").is_none());
    assert_eq!(BranchName::new("main").unwrap().as_str(), "main");
}

#[test]
fn test_commit_sha_short_truncates_to_seven_characters() {
    let sha = CommitSha::new("abcdef1234567").unwrap();
    assert_eq!(sha.short(), "abcdef1");
}

#[test]
fn test_commit_sha_short_keeps_short_values_whole() {
    let sha = CommitSha::new("abc").unwrap();
    assert_eq!(sha.short(), "abc");

    let exact = CommitSha::new("abcdef1").unwrap();
    assert_eq!(exact.short(), "abcdef1");
}

#[test]
fn test_request_id_from_commit_sha_uses_short_form() {
    let sha = CommitSha::new("0123456789abcdef").unwrap();
    assert_eq!(RequestId::from(&sha).as_str(), "0123456");
}

#[test]
fn test_request_id_from_pull_request_number_is_stringified() {
    assert_eq!(RequestId::from(PullRequestId::new(42)).as_str(), "42");
}

#[test]
fn test_identifiers_serialize_as_plain_values() {
    let branch = BranchName::new("main").unwrap();
    assert_eq!(serde_json::to_string(&branch).unwrap(), "\"main\"");
    assert_eq!(serde_json::to_string(&PullRequestId::new(7)).unwrap(), "7");
}
