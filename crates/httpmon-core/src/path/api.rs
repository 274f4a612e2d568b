//! Collapse the sidecar's own parameterized API paths.
//!
//! Keys, secret names and actor ids are folded away so that calls like
//! `/v1.0/state/store/user-42` do not mint a series per key.

use std::borrow::Cow;

/// Placeholder substituted for actor ids.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Version prefixes the sidecar serves its API under.
const API_VERSIONS: &[&str] = &["v1.0", "v1.0-alpha1", "v1.0-beta1"];

/// Fold variable segments out of known API shapes; other paths pass through.
///
/// - `/v1.0/{state|secrets|configuration}/{name}/...` → `/v1.0/state/{name}`
/// - `/v1.0/actors/{type}/{id}/{op}/...` → `/v1.0/actors/{type}/{id}/{op}`
/// - `/actors/{type}/{id}/...` (app callbacks) → id replaced, rest kept
///
/// Only the listed version prefixes are API paths; `/api/state/...` is an app
/// route and passes through. Applying it twice yields the same label.
pub fn collapse_api_path(path: &str) -> Cow<'_, str> {
    let body = path.strip_prefix('/').unwrap_or(path);
    let mut parts: Vec<&str> = body.splitn(6, '/').collect();
    if parts.len() < 3 {
        return Cow::Borrowed(path);
    }

    if parts[0] == "actors" {
        parts[2] = ID_PLACEHOLDER;
        return Cow::Owned(format!("/{}", parts.join("/")));
    }

    if !API_VERSIONS.contains(&parts[0]) {
        return Cow::Borrowed(path);
    }

    match parts[1] {
        "state" | "secrets" | "configuration" => Cow::Owned(format!("/{}", parts[..3].join("/"))),
        "actors" if parts.len() >= 5 => {
            parts[3] = ID_PLACEHOLDER;
            Cow::Owned(format!("/{}", parts[..5].join("/")))
        }
        _ => Cow::Borrowed(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_and_secrets_drop_keys() {
        assert_eq!(collapse_api_path("/v1.0/state/statestore/key1"), "/v1.0/state/statestore");
        assert_eq!(collapse_api_path("/v1.0/secrets/vault/name"), "/v1.0/secrets/vault");
        assert_eq!(
            collapse_api_path("/v1.0/configuration/cfg/sub/a"),
            "/v1.0/configuration/cfg"
        );
    }

    #[test]
    fn actor_ids_are_replaced() {
        assert_eq!(
            collapse_api_path("/v1.0/actors/DemoActor/1/timer/name"),
            "/v1.0/actors/DemoActor/{id}/timer"
        );
        assert_eq!(
            collapse_api_path("/actors/DemoActor/1/method/method1"),
            "/actors/DemoActor/{id}/method/method1"
        );
    }

    #[test]
    fn short_actor_path_unchanged() {
        assert_eq!(collapse_api_path("/v1.0/actors/DemoActor/1"), "/v1.0/actors/DemoActor/1");
    }

    #[test]
    fn other_paths_unchanged() {
        for p in ["/orders/7", "/v1.0/healthz/outbound", "/", "", "/v1.0/metadata"] {
            assert!(matches!(collapse_api_path(p), Cow::Borrowed(b) if b == p));
        }
    }

    #[test]
    fn app_paths_with_api_words_unchanged() {
        for p in [
            "/api/state/us/ca",
            "/shop/actors/x/y/z/w",
            "/v2/secrets/vault/name",
            "/tenant/configuration/cfg/a",
        ] {
            assert!(matches!(collapse_api_path(p), Cow::Borrowed(b) if b == p), "{p}");
        }
    }

    #[test]
    fn prerelease_versions_collapse() {
        assert_eq!(
            collapse_api_path("/v1.0-alpha1/configuration/cfg/key"),
            "/v1.0-alpha1/configuration/cfg"
        );
        assert_eq!(collapse_api_path("/v1.0-beta1/state/store/k"), "/v1.0-beta1/state/store");
    }

    #[test]
    fn idempotent() {
        for p in [
            "/v1.0/state/statestore/key1",
            "/v1.0/actors/DemoActor/1/timer/name",
            "/actors/DemoActor/1/method/m",
        ] {
            let once = collapse_api_path(p).into_owned();
            assert_eq!(collapse_api_path(&once), once);
        }
    }
}
