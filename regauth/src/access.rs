use crate::error::AuthError;
use crate::signer::Signer;
use crate::token::verify_token;
use time::OffsetDateTime;
use tracing::{debug, warn};

//--------------------------------------------------------------------------------------------------
// Registry path grammar
//--------------------------------------------------------------------------------------------------

pub const REGISTRY_ROOT: &str = "/v2/";

const API_VERSION_SEGMENT: &str = "v2";
const ACCOUNT_SEGMENT: usize = 2;
// Account at 2, at least one repository segment at 3, so the operation starts at 4 or later
const FIRST_OPERATION_SEGMENT: usize = 4;
const OPERATIONS: [&str; 2] = ["blobs", "manifests"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryPath<'a> {
    /// `/v2/`, the API version check every client starts with
    Root,
    /// `/v2/<account>/<repository...>/blobs...` or `/v2/<account>/<repository...>/manifests...`
    Resource { account: &'a str },
}

impl<'a> RegistryPath<'a> {
    pub fn parse(path: &'a str) -> Option<Self> {
        if path == REGISTRY_ROOT {
            return Some(RegistryPath::Root);
        }

        // Nothing here is percent-decoded, so an encoded dot segment would pass the checks below
        // and only resolve further along the proxy chain
        if path.contains('%') {
            return None;
        }

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() <= FIRST_OPERATION_SEGMENT
            || !segments[0].is_empty()
            || segments[1] != API_VERSION_SEGMENT
        {
            return None;
        }

        let operation_at = segments
            .iter()
            .enumerate()
            .skip(FIRST_OPERATION_SEGMENT)
            .find(|(_, segment)| OPERATIONS.iter().any(|op| segment.starts_with(op)))
            .map(|(i, _)| i)?;

        // Account and repository name must be real segments. Dot segments are refused outright,
        // since a proxy normalising them would route the request to a different account.
        let name_is_valid = segments[ACCOUNT_SEGMENT..operation_at]
            .iter()
            .all(|segment| !segment.is_empty() && *segment != "." && *segment != "..");
        let rest_is_valid = segments[operation_at..]
            .iter()
            .all(|segment| *segment != "." && *segment != "..");

        if name_is_valid && rest_is_valid {
            Some(RegistryPath::Resource {
                account: segments[ACCOUNT_SEGMENT],
            })
        } else {
            None
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Access decision
//--------------------------------------------------------------------------------------------------

/// One request to be gated: the Basic auth username and password, plus what is being accessed
#[derive(Clone, Copy)]
pub struct AccessRequest<'a> {
    pub username: &'a str,
    pub token: &'a str,
    pub path: &'a str,
    pub method: &'a str,
}

// The token is a credential and must not end up in logs
impl std::fmt::Debug for AccessRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessRequest")
            .field("username", &self.username)
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AuthError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<AuthError> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

impl From<Result<(), AuthError>> for Decision {
    fn from(result: Result<(), AuthError>) -> Self {
        match result {
            Ok(()) => Decision::Allow,
            Err(reason) => Decision::Deny(reason),
        }
    }
}

const READ_METHOD: &str = "GET";

/// Decides whether `request` may go ahead. Nothing is remembered between calls: the decision is
/// derived from the token's own claims, `now`, and the requested path and method.
pub fn authorize(request: &AccessRequest<'_>, signer: &Signer, now: OffsetDateTime) -> Decision {
    let decision = Decision::from(check_access(request, signer, now));

    match decision {
        Decision::Allow => debug!(
            "{} {} allowed for {}",
            request.method, request.path, request.username
        ),
        Decision::Deny(reason) => warn!(
            "{} {} denied for {}: {}",
            request.method,
            request.path,
            request.username,
            reason.code()
        ),
    }

    decision
}

fn check_access(
    request: &AccessRequest<'_>,
    signer: &Signer,
    now: OffsetDateTime,
) -> Result<(), AuthError> {
    let claims = verify_token(request.token, signer, now)?;
    let is_token_owner = claims.username().as_str() == request.username;

    let account = match RegistryPath::parse(request.path) {
        Some(RegistryPath::Root) if request.method == READ_METHOD && is_token_owner => {
            return Ok(());
        }
        Some(RegistryPath::Resource { account }) => account,
        Some(RegistryPath::Root) | None => return Err(AuthError::InvalidPath),
    };

    if account != claims.account().as_str() || !is_token_owner {
        return Err(AuthError::Unauthorized);
    }

    if request.method != READ_METHOD && !claims.access().allows_write() {
        return Err(AuthError::InsufficientAccess);
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce::RandomNonce;
    use crate::token::{issue_token, IssueRequest};
    use crate::types::SharedSecret;
    use time::macros::datetime;
    use time::Duration;

    const NOW: OffsetDateTime = datetime!(2024-06-01 08:00:00 UTC);
    const BLOB: &str = "/v2/acct/repo/blobs/sha256:abc";

    fn signer() -> Signer {
        Signer::new(&SharedSecret::new("secret").unwrap()).unwrap()
    }

    fn token(username: &str, account: &str, access: &str) -> String {
        let request = IssueRequest {
            username,
            account,
            access,
            expires_at: NOW + Duration::days(1),
        };
        issue_token(&request, &signer(), &RandomNonce, NOW)
            .unwrap()
            .into_string()
    }

    fn decide(username: &str, token: &str, path: &str, method: &str) -> Decision {
        let request = AccessRequest {
            username,
            token,
            path,
            method,
        };
        authorize(&request, &signer(), NOW)
    }

    #[test]
    fn parses_registry_paths() {
        assert_eq!(RegistryPath::parse("/v2/"), Some(RegistryPath::Root));
        for path in [
            BLOB,
            "/v2/acct/repo/manifests/latest",
            "/v2/acct/org/team/repo/manifests/v1.2",
            "/v2/acct/repo/blobs/uploads/",
            "/v2/acct/abc/blobs:slkdfj",
        ] {
            assert_eq!(
                RegistryPath::parse(path),
                Some(RegistryPath::Resource { account: "acct" }),
                "{path}"
            );
        }
    }

    #[test]
    fn rejects_paths_outside_the_grammar() {
        for path in [
            "",
            "/",
            "/v2",
            "v2/acct/repo/blobs/x",
            "/v1/acct/repo/blobs/x",
            "/v2/acct/repo",
            "/v2/acct/blobs/x",
            "/v2/acct/repo/tags/list",
            "/v2//repo/blobs/x",
            "/v2/acct//blobs/x",
            "/v2/acct/../other/repo/blobs/x",
            "/v2/acct/repo/blobs/../../../other/repo/blobs/x",
            "/v2/_catalog",
            "/v2/mine/%2e%2e/victim/repo/blobs/x",
            "/v2/acct/repo/blobs/%2E%2E/%2e%2e/%2e%2e/victim/repo/blobs/x",
            "/v2/acct/re%70o/manifests/latest",
        ] {
            assert_eq!(RegistryPath::parse(path), None, "{path}");
        }
    }

    #[test]
    fn read_token_can_pull_but_not_push() {
        let t = token("u", "acct", "read");
        assert_eq!(decide("u", &t, BLOB, "GET"), Decision::Allow);
        assert_eq!(
            decide("u", &t, BLOB, "PUT"),
            Decision::Deny(AuthError::InsufficientAccess)
        );
        assert_eq!(
            decide("u", &t, "/v2/acct/repo/manifests/latest", "HEAD"),
            Decision::Deny(AuthError::InsufficientAccess)
        );
    }

    #[test]
    fn read_write_token_can_push() {
        let t = token("u", "acct", "read_write");
        for method in ["GET", "PUT", "POST", "PATCH", "DELETE"] {
            assert_eq!(decide("u", &t, BLOB, method), Decision::Allow, "{method}");
        }
    }

    #[test]
    fn token_is_bound_to_account_and_user() {
        let t = token("u", "a", "read_write");
        assert_eq!(
            decide("u", &t, "/v2/b/repo/blobs/sha256:abc", "GET"),
            Decision::Deny(AuthError::Unauthorized)
        );
        assert_eq!(
            decide("someone-else", &t, "/v2/a/repo/blobs/sha256:abc", "GET"),
            Decision::Deny(AuthError::Unauthorized)
        );
    }

    #[test]
    fn root_ping_needs_only_identity() {
        for access in ["read", "read_write"] {
            let t = token("u", "whatever", access);
            assert_eq!(decide("u", &t, "/v2/", "GET"), Decision::Allow);
            assert_eq!(
                decide("other", &t, "/v2/", "GET"),
                Decision::Deny(AuthError::InvalidPath)
            );
            assert_eq!(
                decide("u", &t, "/v2/", "POST"),
                Decision::Deny(AuthError::InvalidPath)
            );
        }
    }

    #[test]
    fn token_failures_are_the_deny_reason() {
        assert_eq!(
            decide("u", "garbage", "/v2/", "GET"),
            Decision::Deny(AuthError::MalformedToken)
        );

        let foreign = Signer::new(&SharedSecret::new("other").unwrap()).unwrap();
        let request = IssueRequest {
            username: "u",
            account: "acct",
            access: "read",
            expires_at: NOW + Duration::hours(1),
        };
        let t = issue_token(&request, &foreign, &RandomNonce, NOW).unwrap();
        assert_eq!(
            decide("u", t.as_str(), BLOB, "GET"),
            Decision::Deny(AuthError::InvalidSignature)
        );

        let t = token("u", "acct", "read");
        let later = AccessRequest {
            username: "u",
            token: &t,
            path: BLOB,
            method: "GET",
        };
        assert_eq!(
            authorize(&later, &signer(), NOW + Duration::days(2)),
            Decision::Deny(AuthError::TokenExpired)
        );
    }

    #[test]
    fn invalid_path_is_reported_after_token_checks() {
        let t = token("u", "acct", "read");
        assert_eq!(
            decide("u", &t, "/v2/acct/repo/tags/list", "GET"),
            Decision::Deny(AuthError::InvalidPath)
        );
        assert_eq!(
            decide("u", &t, "/v2/acct/%2e%2e/victim/repo/blobs/x", "GET"),
            Decision::Deny(AuthError::InvalidPath)
        );
    }

    #[test]
    fn decision_accessors() {
        assert!(Decision::Allow.is_allowed());
        assert_eq!(Decision::Allow.reason(), None);
        let deny = Decision::Deny(AuthError::Unauthorized);
        assert!(!deny.is_allowed());
        assert_eq!(deny.reason(), Some(AuthError::Unauthorized));
    }
}

//--------------------------------------------------------------------------------------------------
