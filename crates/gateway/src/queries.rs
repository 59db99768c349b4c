//! GraphQL documents sent by the domain operations.
//!
//! Each constant is sent as-is; only variables change between calls. Changing
//! a document changes the response shape its operation decodes, so edit the
//! two together.

/// Repositories of the file matches for a search query.
///
/// Variables: `query: String!`.
pub const SEARCH_QUERY: &str = r#"query Search($query: String!) {
    search(query: $query) {
        results {
            results {
                ... on FileMatch {
                    repository {
                        name
                    }
                }
            }
        }
    }
}"#;

/// Commit OID that a revision resolves to in a repository.
///
/// Variables: `repoName: String!`, `rev: String!`.
pub const RESOLVE_REV_QUERY: &str = r#"query ResolveRev($repoName: String!, $rev: String!) {
    repository(name: $repoName) {
        commit(rev: $rev) {
            oid
        }
    }
}"#;

/// Name of the repository a clone URL belongs to.
///
/// Variables: `cloneURL: String!`.
pub const RESOLVE_REPOSITORY_QUERY: &str = r#"query ResolveRepository($cloneURL: String!) {
    repository(cloneURL: $cloneURL) {
        name
    }
}"#;

/// Every extension in the registry with its raw manifest.
pub const EXTENSIONS_QUERY: &str = r#"query Extensions {
    extensionRegistry {
        extensions {
            nodes {
                id
                manifest {
                    raw
                }
            }
        }
    }
}"#;
